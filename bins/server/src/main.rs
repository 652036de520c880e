//! Tradelog API Server
//!
//! Main entry point for the Tradelog backend service.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradelog_api::{AppState, billing::BillingClient, create_router, vision::VisionClient};
use tradelog_core::storage::{StorageConfig, StorageProvider, StorageService};
use tradelog_db::connect;
use tradelog_shared::{AppConfig, JwtConfig, JwtService};

/// S3 settings from the environment when present, local fs otherwise.
fn storage_provider(storage_root: &str) -> StorageProvider {
    let s3 = (
        env::var("TRADELOG_S3_ENDPOINT"),
        env::var("TRADELOG_S3_BUCKET"),
        env::var("TRADELOG_S3_ACCESS_KEY_ID"),
        env::var("TRADELOG_S3_SECRET_ACCESS_KEY"),
    );
    if let (Ok(endpoint), Ok(bucket), Ok(access_key_id), Ok(secret_access_key)) = s3 {
        StorageProvider::S3 {
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
            region: env::var("TRADELOG_S3_REGION").unwrap_or_else(|_| "auto".to_string()),
        }
    } else {
        StorageProvider::local_fs(storage_root)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradelog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create storage service for flow uploads
    let storage_config = StorageConfig {
        provider: storage_provider(&config.flow.storage_root),
    };
    let storage = match StorageService::from_config(&storage_config) {
        Ok(service) => {
            info!(provider = storage_config.provider.name(), "Upload storage configured");
            Some(Arc::new(service))
        }
        Err(e) => {
            warn!(error = %e, "Upload storage unavailable, flow ingestion disabled");
            None
        }
    };

    // Create billing client
    let billing = BillingClient::from_config(&config.billing);

    // Create vision client for screenshot extraction
    let vision = VisionClient::from_config(&config.vision).map(Arc::new);
    if vision.is_none() {
        warn!("Vision extraction disabled, image flow uploads will not be parsed");
    }

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        billing: Arc::new(billing),
        vision,
        max_upload_bytes: config.flow.max_upload_bytes(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
