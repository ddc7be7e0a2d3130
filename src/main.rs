use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use contributions_gateway::config::AppConfig;
use contributions_gateway::repo::gateway_config_repo::GatewayConfigRepo;
use contributions_gateway::repo::gateway_log_repo::GatewayLogRepo;
use contributions_gateway::repo::transactions_repo::TransactionsRepo;
use contributions_gateway::service::config_resolver::GatewayConfigResolver;
use contributions_gateway::service::contribution_service::ContributionService;
use contributions_gateway::AppState;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway_config_repo = GatewayConfigRepo { pool: pool.clone() };
    let gateway_log_repo = GatewayLogRepo { pool: pool.clone() };
    let transactions_repo = TransactionsRepo { pool: pool.clone() };
    let config_resolver = GatewayConfigResolver::new(
        gateway_config_repo.clone(),
        std::time::Duration::from_secs(300),
    );

    let contribution_service = ContributionService {
        pool: pool.clone(),
        transactions_repo: transactions_repo.clone(),
        log_repo: gateway_log_repo.clone(),
        config_resolver: config_resolver.clone(),
        http_client: reqwest::Client::new(),
        gateway_timeout_ms: cfg.gateway_timeout_ms,
        boleto_expiration_days: cfg.boleto_expiration_days,
    };

    let state = AppState {
        contribution_service,
        transactions_repo,
        gateway_config_repo,
        gateway_log_repo,
        config_resolver,
    };

    let admin_key = cfg.internal_api_key.clone();
    let admin_routes = Router::new()
        .route(
            "/settings/gateway/:company_id",
            get(contributions_gateway::http::handlers::gateway_settings::get_settings)
                .put(contributions_gateway::http::handlers::gateway_settings::update_settings),
        )
        .route(
            "/contributions/:transaction_id/logs",
            get(contributions_gateway::http::handlers::gateway_logs::list_contribution_logs),
        )
        .layer(from_fn_with_state(
            admin_key,
            contributions_gateway::http::middleware::admin_auth::require_admin_api_key,
        ));

    let app = Router::new()
        .route("/health", get(contributions_gateway::http::handlers::ops::health))
        .route(
            "/contributions",
            post(contributions_gateway::http::handlers::contributions::create_contribution),
        )
        .route(
            "/contributions/:transaction_id",
            get(contributions_gateway::http::handlers::contributions::get_contribution),
        )
        .route(
            "/contributions/:transaction_id/cancel",
            post(contributions_gateway::http::handlers::contributions::cancel_contribution),
        )
        .route(
            "/contributions/:transaction_id/sync",
            post(contributions_gateway::http::handlers::contributions::sync_contribution),
        )
        .route(
            "/notifications/cielo",
            post(contributions_gateway::http::handlers::notifications::provider_callback),
        )
        .route("/ops/readiness", get(contributions_gateway::http::handlers::ops::readiness))
        .route("/ops/liveness", get(contributions_gateway::http::handlers::ops::liveness))
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
