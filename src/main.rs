//! Model Foundry - Main Entry Point

use std::sync::Arc;

use model_foundry_backend::{
    api::{self, AppState},
    config::Config,
    db,
    error::{AppError, Result},
    models::artifact::ArtifactKind,
    services::{
        auth_service::IdentityService, catalog_service::ArtifactCatalog,
        garden_service::GardenService, project_service::ProjectService,
    },
    store::{document::DocumentArtifactStore, postgres::PgArtifactStore, ArtifactStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting Model Foundry backend");

    // Select the artifact catalog backend
    let artifacts: Arc<dyn ArtifactStore> = match config.catalog_backend.as_str() {
        "postgres" => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Config("DATABASE_URL required for the postgres backend".into())
            })?;
            let pool = db::create_pool(database_url, config.database_max_connections).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations complete");

            Arc::new(PgArtifactStore::new(pool))
        }
        "document" => Arc::new(DocumentArtifactStore::open(&config.data_dir).await?),
        other => {
            return Err(AppError::Config(format!(
                "unknown catalog backend '{}'",
                other
            )))
        }
    };

    let identity = Arc::new(IdentityService::open(&config.data_dir, &config.jwt_secret).await?);
    let garden = Arc::new(GardenService::open(&config.data_dir).await?);
    let projects = Arc::new(ProjectService::open(&config.data_dir, artifacts.clone()).await?);

    let state = AppState {
        config: config.clone(),
        models: Arc::new(ArtifactCatalog::new(
            ArtifactKind::Model,
            artifacts.clone(),
            identity.clone(),
        )),
        agents: Arc::new(ArtifactCatalog::new(
            ArtifactKind::Agent,
            artifacts,
            identity.clone(),
        )),
        identity,
        garden,
        projects,
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Listening on {}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
