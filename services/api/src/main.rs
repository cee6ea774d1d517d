use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use api::{
    AppState,
    config::AppConfig,
    create_router,
    jwt::{JwtConfig, JwtService},
    providers::{GroqClient, HttpClassifier, InferenceConfig, LlmConfig},
};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting {} v{}", config.app_name, config.app_version);

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let addr = config.bind_addr()?;

    // Initialize storage
    let db_config = DatabaseConfig::from_env()?;
    let mut state = if db_config.is_in_memory() {
        warn!("Using in-memory storage, data is lost on restart");
        AppState::in_memory(config, jwt_service)
    } else {
        info!("Connecting to database at {}", db_config.masked_url());
        let pool = init_pool(&db_config).await?;

        if health_check(&pool).await? {
            info!("Database connection successful");
        } else {
            anyhow::bail!("Failed to connect to database");
        }

        run_migrations(&pool).await?;
        AppState::postgres(config, jwt_service, pool)
    };

    // Optional downstream providers
    match LlmConfig::from_env() {
        Some(llm_config) => {
            let client = GroqClient::new(llm_config).context("Failed to build LLM client")?;
            state = state.with_chat_provider(Arc::new(client));
        }
        None => warn!("GROQ_API_KEY not set, chat and summarization are disabled"),
    }

    match InferenceConfig::from_env()? {
        Some(inference_config) => {
            let classifier =
                HttpClassifier::new(inference_config).context("Failed to build inference client")?;
            state = state.with_classifier(Arc::new(classifier));
        }
        None => warn!("INFERENCE_URL not set, image prediction is disabled"),
    }

    // Start the web server
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
