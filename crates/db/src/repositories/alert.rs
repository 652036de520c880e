//! Alert rule and event repository.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{alert_events, alert_rules};

/// Fields for a new alert rule.
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    /// Rule display name.
    pub name: String,
    /// Trigger condition, stored opaquely.
    pub condition: serde_json::Value,
    /// Delivery channels, e.g. `["inapp", "popup"]`.
    pub channels: serde_json::Value,
    /// info | warning | critical.
    pub severity: String,
}

/// Fields for a new alert event.
#[derive(Debug, Clone)]
pub struct CreateEventInput {
    /// Originating rule, if any.
    pub rule_id: Option<Uuid>,
    /// Human-readable alert text.
    pub message: String,
    /// info | warning | critical.
    pub severity: String,
    /// Channels the event should be delivered on.
    pub channels: serde_json::Value,
}

/// Repository for alert rules and their fired events.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    /// Creates a new alert repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an alert rule, enabled by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_rule(
        &self,
        user_id: Uuid,
        input: CreateRuleInput,
    ) -> Result<alert_rules::Model, DbErr> {
        let rule = alert_rules::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name),
            condition: Set(input.condition),
            channels: Set(input.channels),
            severity: Set(input.severity),
            enabled: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        rule.insert(&self.db).await
    }

    /// A user's alert rules, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_rules(&self, user_id: Uuid) -> Result<Vec<alert_rules::Model>, DbErr> {
        alert_rules::Entity::find()
            .filter(alert_rules::Column::UserId.eq(user_id))
            .order_by_desc(alert_rules::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// A rule owned by the user, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_rule(
        &self,
        user_id: Uuid,
        rule_id: Uuid,
    ) -> Result<Option<alert_rules::Model>, DbErr> {
        alert_rules::Entity::find_by_id(rule_id)
            .filter(alert_rules::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Enables or disables a rule the user owns. Returns the updated rule,
    /// or `None` when the rule is missing or foreign.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn set_rule_enabled(
        &self,
        user_id: Uuid,
        rule_id: Uuid,
        enabled: bool,
    ) -> Result<Option<alert_rules::Model>, DbErr> {
        let rule = alert_rules::Entity::find_by_id(rule_id)
            .filter(alert_rules::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        let Some(rule) = rule else {
            return Ok(None);
        };
        let mut active = rule.into_active_model();
        active.enabled = Set(enabled);
        Ok(Some(active.update(&self.db).await?))
    }

    /// Records a fired alert event in the active, undelivered state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_event(
        &self,
        user_id: Uuid,
        input: CreateEventInput,
    ) -> Result<alert_events::Model, DbErr> {
        let event = alert_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            rule_id: Set(input.rule_id),
            user_id: Set(user_id),
            message: Set(input.message),
            status: Set("active".to_string()),
            severity: Set(input.severity),
            channels: Set(input.channels),
            delivered: Set(false),
            snoozed_until: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };
        event.insert(&self.db).await
    }

    /// Events awaiting delivery: active undelivered events plus snoozed
    /// events whose snooze has lapsed. Lapsed events are flipped back to
    /// active so a later poll does not depend on the clock again.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn poll_undelivered(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<alert_events::Model>, DbErr> {
        let now_tz: DateTime<FixedOffset> = now.into();

        let lapsed = alert_events::Entity::find()
            .filter(alert_events::Column::UserId.eq(user_id))
            .filter(alert_events::Column::Status.eq("snoozed"))
            .filter(alert_events::Column::SnoozedUntil.lte(now_tz))
            .all(&self.db)
            .await?;
        for event in lapsed {
            let mut active = event.into_active_model();
            active.status = Set("active".to_string());
            active.delivered = Set(false);
            active.snoozed_until = Set(None);
            active.update(&self.db).await?;
        }

        alert_events::Entity::find()
            .filter(alert_events::Column::UserId.eq(user_id))
            .filter(
                Condition::all()
                    .add(alert_events::Column::Status.eq("active"))
                    .add(alert_events::Column::Delivered.eq(false)),
            )
            .order_by_desc(alert_events::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Marks a batch of events delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn mark_delivered(&self, user_id: Uuid, event_ids: &[Uuid]) -> Result<(), DbErr> {
        if event_ids.is_empty() {
            return Ok(());
        }
        alert_events::Entity::update_many()
            .col_expr(alert_events::Column::Delivered, sea_orm::sea_query::Expr::value(true))
            .filter(alert_events::Column::UserId.eq(user_id))
            .filter(alert_events::Column::Id.is_in(event_ids.iter().copied()))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Dismisses an event. Returns whether a row the user owns was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn dismiss(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, DbErr> {
        let event = alert_events::Entity::find_by_id(event_id)
            .filter(alert_events::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        let Some(event) = event else {
            return Ok(false);
        };
        let mut active = event.into_active_model();
        active.status = Set("dismissed".to_string());
        active.snoozed_until = Set(None);
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Snoozes an event until the given instant. Returns whether a row the
    /// user owns was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn snooze(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        until: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let event = alert_events::Entity::find_by_id(event_id)
            .filter(alert_events::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        let Some(event) = event else {
            return Ok(false);
        };
        let mut active = event.into_active_model();
        active.status = Set("snoozed".to_string());
        active.snoozed_until = Set(Some(until.into()));
        active.update(&self.db).await?;
        Ok(true)
    }
}
