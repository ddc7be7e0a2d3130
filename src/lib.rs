pub mod config;
pub mod domain {
    pub mod card;
    pub mod contribution;
    pub mod status;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod contributions;
        pub mod gateway_logs;
        pub mod gateway_settings;
        pub mod notifications;
        pub mod ops;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
}
pub mod repo {
    pub mod gateway_config_repo;
    pub mod gateway_log_repo;
    pub mod transactions_repo;
}
pub mod service {
    pub mod config_resolver;
    pub mod contribution_service;
    pub mod gateway_logger;
}

#[derive(Clone)]
pub struct AppState {
    pub contribution_service: service::contribution_service::ContributionService,
    pub transactions_repo: repo::transactions_repo::TransactionsRepo,
    pub gateway_config_repo: repo::gateway_config_repo::GatewayConfigRepo,
    pub gateway_log_repo: repo::gateway_log_repo::GatewayLogRepo,
    pub config_resolver: service::config_resolver::GatewayConfigResolver,
}
