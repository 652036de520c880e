//! Database seeder for Tradelog development and testing.
//!
//! Seeds the trophy-definition catalog and a development user. All writes
//! are idempotent upserts so the seeder can run on every deploy.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use tradelog_db::TrophyRepository;
use tradelog_db::entities::{trophy_definitions, users};

/// Development user ID (consistent for all seeds)
const DEV_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Static trophy catalog: (id, tier, xp, rule key, rule op, rule value).
const TROPHY_CATALOG: &[(&str, &str, i32, &str, &str, i64)] = &[
    ("first-entry", "bronze", 100, "journal_entries", "gte", 1),
    ("journal-10", "bronze", 250, "journal_entries", "gte", 10),
    ("journal-50", "silver", 500, "journal_entries", "gte", 50),
    ("green-10", "silver", 500, "green_days", "gte", 10),
    ("streak-7", "silver", 500, "login_streak", "gte", 7),
    ("streak-30", "gold", 1000, "login_streak", "gte", 30),
    ("plan-discipline-20", "gold", 1000, "plan_respected_days", "gte", 20),
    ("challenge-finisher", "gold", 0, "challenges_completed", "gte", 5),
    ("elite-grind", "elite", 0, "total_xp", "gte", 7000),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tradelog_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding trophy catalog...");
    seed_trophy_catalog(&db).await;

    println!("Seeding development user...");
    seed_dev_user(&db).await;

    println!("Seeding complete!");
}

fn dev_user_id() -> Uuid {
    Uuid::parse_str(DEV_USER_ID).unwrap()
}

/// Upserts the static trophy catalog.
async fn seed_trophy_catalog(db: &DatabaseConnection) {
    let defs: Vec<trophy_definitions::ActiveModel> = TROPHY_CATALOG
        .iter()
        .map(
            |(id, tier, xp, rule_key, rule_op, rule_value)| trophy_definitions::ActiveModel {
                id: Set((*id).to_string()),
                tier: Set((*tier).to_string()),
                xp: Set(*xp),
                rule_key: Set((*rule_key).to_string()),
                rule_op: Set((*rule_op).to_string()),
                rule_value: Set(*rule_value),
            },
        )
        .collect();

    let repo = TrophyRepository::new(db.clone());
    match repo.upsert_definitions(defs).await {
        Ok(()) => println!("  Upserted {} trophy definitions", TROPHY_CATALOG.len()),
        Err(e) => eprintln!("Failed to seed trophy catalog: {e}"),
    }
}

/// Seeds a development user on the pro plan.
async fn seed_dev_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(dev_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Development user already exists, skipping...");
        return;
    }

    let user = users::ActiveModel {
        id: Set(dev_user_id()),
        email: Set("dev@tradelog.local".to_string()),
        password_hash: Set("$argon2id$v=19$m=65536,t=3,p=4$dev_hash".to_string()),
        display_name: Set("Dev User".to_string()),
        plan: Set("pro".to_string()),
        option_flow_addon: Set(false),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = user.insert(db).await {
        eprintln!("Failed to insert development user: {e}");
    } else {
        println!("  Created development user: dev@tradelog.local");
    }
}
