//! Initial database migration.
//!
//! Creates all tables for accounts, journal, gamification, alerts, and
//! options-flow analysis.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: IDENTITY & SETTINGS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PREFERENCES_SQL).await?;

        // ============================================================
        // PART 2: TRADING ACCOUNTS & JOURNAL
        // ============================================================
        db.execute_unprepared(TRADING_ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;

        // ============================================================
        // PART 3: GAMIFICATION
        // ============================================================
        db.execute_unprepared(CHALLENGE_PROGRESS_SQL).await?;
        db.execute_unprepared(TROPHY_DEFINITIONS_SQL).await?;
        db.execute_unprepared(USER_TROPHIES_SQL).await?;

        // ============================================================
        // PART 4: ALERTS
        // ============================================================
        db.execute_unprepared(ALERT_RULES_SQL).await?;
        db.execute_unprepared(ALERT_EVENTS_SQL).await?;

        // ============================================================
        // PART 5: OPTIONS FLOW
        // ============================================================
        db.execute_unprepared(FLOW_UPLOADS_SQL).await?;
        db.execute_unprepared(FLOW_ANALYSES_SQL).await?;
        db.execute_unprepared(FLOW_FEEDBACK_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    display_name VARCHAR(255) NOT NULL,
    plan VARCHAR(20) NOT NULL DEFAULT 'base',
    option_flow_addon BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email);
";

const PREFERENCES_SQL: &str = r"
CREATE TABLE preferences (
    user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    theme VARCHAR(20) NOT NULL DEFAULT 'dark',
    locale VARCHAR(10) NOT NULL DEFAULT 'en',
    active_account_id UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRADING_ACCOUNTS_SQL: &str = r"
CREATE TABLE trading_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    broker VARCHAR(255) NOT NULL,
    is_default BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_trading_accounts_user ON trading_accounts(user_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    account_id UUID REFERENCES trading_accounts(id) ON DELETE SET NULL,
    entry_date DATE NOT NULL,
    pnl NUMERIC(19, 4) NOT NULL,
    instrument VARCHAR(50),
    direction VARCHAR(10),
    entry_price NUMERIC(19, 4),
    exit_price NUMERIC(19, 4),
    size NUMERIC(19, 4),
    screenshots JSONB NOT NULL DEFAULT '[]',
    notes TEXT,
    emotion VARCHAR(50),
    tags JSONB NOT NULL DEFAULT '[]',
    respected_plan BOOLEAN,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, entry_date)
);

CREATE INDEX idx_journal_entries_user_date ON journal_entries(user_id, entry_date);
CREATE INDEX idx_journal_entries_account ON journal_entries(account_id) WHERE account_id IS NOT NULL;
";

const CHALLENGE_PROGRESS_SQL: &str = r"
CREATE TABLE challenge_progress (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    challenge_id VARCHAR(100) NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'active',
    xp_earned INTEGER NOT NULL DEFAULT 0,
    process_green_days INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, challenge_id),
    CONSTRAINT chk_challenge_status CHECK (status IN ('active', 'completed')),
    CONSTRAINT chk_xp_non_negative CHECK (xp_earned >= 0)
);

CREATE INDEX idx_challenge_progress_user ON challenge_progress(user_id);
";

const TROPHY_DEFINITIONS_SQL: &str = r"
CREATE TABLE trophy_definitions (
    id VARCHAR(100) PRIMARY KEY,
    tier VARCHAR(20) NOT NULL,
    xp INTEGER NOT NULL DEFAULT 0,
    rule_key VARCHAR(100) NOT NULL,
    rule_op VARCHAR(10) NOT NULL DEFAULT 'gte',
    rule_value BIGINT NOT NULL
);
";

const USER_TROPHIES_SQL: &str = r"
CREATE TABLE user_trophies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    trophy_id VARCHAR(100) NOT NULL REFERENCES trophy_definitions(id) ON DELETE CASCADE,
    earned_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, trophy_id)
);

CREATE INDEX idx_user_trophies_user ON user_trophies(user_id);
";

const ALERT_RULES_SQL: &str = r"
CREATE TABLE alert_rules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    condition JSONB NOT NULL DEFAULT '{}',
    channels JSONB NOT NULL DEFAULT '[]',
    severity VARCHAR(20) NOT NULL DEFAULT 'info',
    enabled BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_alert_rules_user ON alert_rules(user_id) WHERE enabled = true;
";

const ALERT_EVENTS_SQL: &str = r"
CREATE TABLE alert_events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    rule_id UUID REFERENCES alert_rules(id) ON DELETE SET NULL,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    message TEXT NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'active',
    severity VARCHAR(20) NOT NULL DEFAULT 'info',
    channels JSONB NOT NULL DEFAULT '[]',
    delivered BOOLEAN NOT NULL DEFAULT false,
    snoozed_until TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_alert_status CHECK (status IN ('active', 'dismissed', 'snoozed'))
);

CREATE INDEX idx_alert_events_undelivered ON alert_events(user_id, created_at DESC)
    WHERE status = 'active' AND delivered = false;
CREATE INDEX idx_alert_events_snoozed ON alert_events(user_id, snoozed_until)
    WHERE status = 'snoozed';
";

const FLOW_UPLOADS_SQL: &str = r"
CREATE TABLE flow_uploads (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    upload_type VARCHAR(10) NOT NULL,
    filename VARCHAR(255) NOT NULL,
    storage_key VARCHAR(500) NOT NULL,
    content_type VARCHAR(100) NOT NULL,
    provider VARCHAR(100),
    symbol VARCHAR(20),
    parsed_table JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_upload_type CHECK (upload_type IN ('flow', 'chart'))
);

CREATE INDEX idx_flow_uploads_user ON flow_uploads(user_id, created_at DESC);
";

const FLOW_ANALYSES_SQL: &str = r"
CREATE TABLE flow_analyses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    symbol VARCHAR(20) NOT NULL,
    analysis_date DATE NOT NULL,
    flow_upload_id UUID NOT NULL REFERENCES flow_uploads(id) ON DELETE CASCADE,
    chart_upload_id UUID REFERENCES flow_uploads(id) ON DELETE SET NULL,
    result JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_flow_analyses_user ON flow_analyses(user_id, created_at DESC);
";

const FLOW_FEEDBACK_SQL: &str = r"
CREATE TABLE flow_feedback (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    analysis_id UUID NOT NULL REFERENCES flow_analyses(id) ON DELETE CASCADE,
    correct BOOLEAN,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_flow_feedback_analysis ON flow_feedback(analysis_id);
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TABLE IF EXISTS flow_feedback CASCADE;
DROP TABLE IF EXISTS flow_analyses CASCADE;
DROP TABLE IF EXISTS flow_uploads CASCADE;
DROP TABLE IF EXISTS alert_events CASCADE;
DROP TABLE IF EXISTS alert_rules CASCADE;
DROP TABLE IF EXISTS user_trophies CASCADE;
DROP TABLE IF EXISTS trophy_definitions CASCADE;
DROP TABLE IF EXISTS challenge_progress CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS trading_accounts CASCADE;
DROP TABLE IF EXISTS preferences CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
