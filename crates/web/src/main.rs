use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use importer::{FootballDataClient, FootballDataImporter, FootballDataSpec};
use storage::Database;
use storage::services::ReconciliationService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::leaderboard::handlers::get_leaderboard,
        features::participants::handlers::list_participants,
        features::participants::handlers::get_history,
        features::participants::handlers::get_prediction,
        features::participants::handlers::get_scores,
        features::standings::handlers::get_standings,
        features::reconcile::handlers::trigger_reconcile,
        features::reconcile::handlers::get_reconcile_state,
    ),
    components(
        schemas(
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::history::HistorySeriesResponse,
            storage::dto::history::HistoryPointResponse,
            storage::dto::standings::StandingsResponse,
            storage::dto::reconcile::ReconcileStateResponse,
            storage::models::Participant,
            storage::models::Prediction,
            storage::models::PredictedPosition,
            storage::models::TeamStanding,
            storage::models::NewHistoryPoint,
            storage::services::LeaderboardEntry,
            storage::services::ParticipantScore,
            storage::services::PredictionScoreLine,
            storage::services::ScoreWarning,
            storage::services::ReconcileReport,
            storage::services::ReconcileStatus,
            storage::services::ReconcileState,
        )
    ),
    tags(
        (name = "leaderboard", description = "Contest leaderboard"),
        (name = "participants", description = "Participants, score history and live breakdowns"),
        (name = "standings", description = "Live league table"),
        (name = "admin", description = "Protected reconciliation endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(state: AppState, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .nest("/leaderboard", features::leaderboard::routes::routes())
        .nest("/participants", features::participants::routes::routes())
        .nest("/standings", features::standings::routes::routes())
        .nest("/admin", features::reconcile::routes::routes(api_keys));

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting league predictor API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    if config.football_data_token.is_none() {
        tracing::warn!("FOOTBALL_DATA_TOKEN is not set; requests will be rate limited");
    }
    let client = FootballDataClient::new(
        config.football_data_base_url.clone(),
        config.football_data_token.clone(),
    )
    .context("Failed to build football-data.org client")?;
    let provider = FootballDataImporter::new(client, FootballDataSpec::new(config.competition));
    tracing::info!(
        "Standings provider: football-data.org ({})",
        config.competition.name()
    );

    let reconciler = ReconciliationService::new(
        Arc::new(provider),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
    );

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; admin endpoints will reject every request");
    }

    let state = AppState {
        db,
        reconciler: Arc::new(reconciler),
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app(state, api_keys)).await?;

    Ok(())
}
