use anyhow::Result;
use contributions_gateway::config::AppConfig;
use contributions_gateway::repo::gateway_config_repo::GatewayConfigRepo;
use contributions_gateway::repo::gateway_log_repo::GatewayLogRepo;
use contributions_gateway::repo::transactions_repo::TransactionsRepo;
use contributions_gateway::service::config_resolver::GatewayConfigResolver;
use contributions_gateway::service::contribution_service::ContributionService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

/// Polls PIX and boleto charges the provider has not reported back on,
/// feeding each through the same status-update path as the webhook.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let gateway_config_repo = GatewayConfigRepo { pool: pool.clone() };
    let config_resolver = GatewayConfigResolver::new(
        gateway_config_repo,
        std::time::Duration::from_secs(300),
    );

    let service = ContributionService {
        pool: pool.clone(),
        transactions_repo: TransactionsRepo { pool: pool.clone() },
        log_repo: GatewayLogRepo { pool: pool.clone() },
        config_resolver,
        http_client: reqwest::Client::new(),
        gateway_timeout_ms: cfg.gateway_timeout_ms,
        boleto_expiration_days: cfg.boleto_expiration_days,
    };

    loop {
        match service
            .run_pending_sync(cfg.pending_sync_grace_secs, cfg.pending_sync_batch)
            .await
        {
            Ok(0) => {}
            Ok(updated) => tracing::info!("pending sync resolved {updated} transactions"),
            Err(e) => tracing::error!("pending sync pass failed: {e}"),
        }

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    }
}
