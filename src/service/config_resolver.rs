use crate::gateways::GatewayError;
use crate::repo::gateway_config_repo::{GatewayConfigRepo, GatewayConfigRow};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }

    pub fn parse(s: &str) -> Environment {
        if s.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedGateway {
    pub company_id: Uuid,
    pub gateway_name: String,
    pub environment: Environment,
    pub merchant_id: String,
    pub merchant_key: String,
}

/// Picks the credential pair matching the configured environment. Production
/// credentials are never substituted when the development pair is missing;
/// that is a configuration error the admin has to fix.
pub fn select_credentials(row: &GatewayConfigRow) -> Result<ResolvedGateway, GatewayError> {
    if !row.is_active {
        return Err(GatewayError::Disabled);
    }

    let environment = Environment::parse(&row.environment);
    let (merchant_id, merchant_key) = match environment {
        Environment::Production => (row.prod_merchant_id.clone(), row.prod_merchant_key.clone()),
        Environment::Development => (row.dev_merchant_id.clone(), row.dev_merchant_key.clone()),
    };

    match (merchant_id, merchant_key) {
        (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => Ok(ResolvedGateway {
            company_id: row.company_id,
            gateway_name: row.gateway_name.clone(),
            environment,
            merchant_id: id,
            merchant_key: key,
        }),
        _ => Err(GatewayError::MissingCredentials(environment.as_str())),
    }
}

/// Per-tenant credential resolution with a TTL cache and explicit
/// invalidation. The settings handler calls `invalidate` on every write, so
/// an admin edit takes effect on the next payment without waiting out the
/// TTL or restarting the process.
#[derive(Clone)]
pub struct GatewayConfigResolver {
    pub config_repo: GatewayConfigRepo,
    inner: Arc<RwLock<HashMap<Uuid, (Instant, ResolvedGateway)>>>,
    ttl: Duration,
}

impl GatewayConfigResolver {
    pub fn new(config_repo: GatewayConfigRepo, ttl: Duration) -> Self {
        Self {
            config_repo,
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn resolve(&self, company_id: Uuid) -> Result<ResolvedGateway, GatewayError> {
        {
            let read = self.inner.read().await;
            if let Some((loaded_at, resolved)) = read.get(&company_id) {
                if loaded_at.elapsed() <= self.ttl {
                    return Ok(resolved.clone());
                }
            }
        }

        let row = self
            .config_repo
            .find_for_company(company_id)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?
            .ok_or(GatewayError::NotConfigured)?;

        let resolved = select_credentials(&row)?;

        let mut write = self.inner.write().await;
        write.insert(company_id, (Instant::now(), resolved.clone()));
        Ok(resolved)
    }

    pub async fn invalidate(&self, company_id: Uuid) {
        let mut write = self.inner.write().await;
        write.remove(&company_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> GatewayConfigRow {
        GatewayConfigRow {
            company_id: Uuid::new_v4(),
            gateway_name: "cielo".to_string(),
            is_active: true,
            environment: "development".to_string(),
            prod_merchant_id: Some("prod-id".to_string()),
            prod_merchant_key: Some("prod-key".to_string()),
            dev_merchant_id: Some("dev-id".to_string()),
            dev_merchant_key: Some("dev-key".to_string()),
            certificate: None,
            certificate_key: None,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn disabled_gateway_fails_resolution() {
        let mut r = row();
        r.is_active = false;
        assert!(matches!(select_credentials(&r), Err(GatewayError::Disabled)));
    }

    #[test]
    fn development_environment_picks_the_development_pair() {
        let resolved = select_credentials(&row()).unwrap();
        assert_eq!(resolved.environment, Environment::Development);
        assert_eq!(resolved.merchant_id, "dev-id");
        assert_eq!(resolved.merchant_key, "dev-key");
    }

    #[test]
    fn production_environment_picks_the_production_pair() {
        let mut r = row();
        r.environment = "production".to_string();
        let resolved = select_credentials(&r).unwrap();
        assert_eq!(resolved.merchant_id, "prod-id");
    }

    #[test]
    fn missing_development_pair_is_an_error_even_with_production_set() {
        let mut r = row();
        r.dev_merchant_id = None;
        r.dev_merchant_key = None;
        assert!(matches!(
            select_credentials(&r),
            Err(GatewayError::MissingCredentials("development"))
        ));
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let mut r = row();
        r.dev_merchant_key = Some(String::new());
        assert!(matches!(
            select_credentials(&r),
            Err(GatewayError::MissingCredentials(_))
        ));
    }
}
