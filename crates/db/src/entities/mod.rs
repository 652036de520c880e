//! `SeaORM` entity definitions.

pub mod alert_events;
pub mod alert_rules;
pub mod challenge_progress;
pub mod flow_analyses;
pub mod flow_feedback;
pub mod flow_uploads;
pub mod journal_entries;
pub mod preferences;
pub mod trading_accounts;
pub mod trophy_definitions;
pub mod user_trophies;
pub mod users;
