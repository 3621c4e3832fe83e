//! Process configuration read from the environment.

use std::net::SocketAddr;

use egov_auth::PrincipalId;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORTAL_BIND_ADDR is not a socket address: {0}")]
    InvalidBindAddr(String),

    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,

    #[error("PORTAL_ADMIN_SUBJECTS contains an invalid principal id: {0}")]
    InvalidAdminSubject(String),
}

/// Which record backend sits behind the guarded store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreBackend,
    /// Principals provisioned with the admin role at startup.
    pub admin_subjects: Vec<PrincipalId>,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("PORTAL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .unwrap_or_else(|| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let store = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let admin_subjects = lookup("PORTAL_ADMIN_SUBJECTS")
            .map(|raw| parse_subjects(&raw))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            admin_subjects,
        })
    }

    /// In-memory configuration on an ephemeral port (tests, local runs).
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            store: StoreBackend::InMemory,
            admin_subjects: Vec::new(),
        }
    }

    pub fn with_admin(mut self, subject: PrincipalId) -> Self {
        self.admin_subjects.push(subject);
        self
    }
}

fn parse_subjects(raw: &str) -> Result<Vec<PrincipalId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<PrincipalId>()
                .map_err(|_| ConfigError::InvalidAdminSubject(s.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory_dev_setup() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.store, StoreBackend::InMemory);
        assert!(config.admin_subjects.is_empty());
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        let err =
            PortalConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabaseUrl);

        let config = PortalConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/portal"),
        ]))
        .unwrap();
        assert!(matches!(config.store, StoreBackend::Postgres { .. }));
    }

    #[test]
    fn unparseable_persistence_flag_means_in_memory() {
        let config =
            PortalConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "yes")])).unwrap();
        assert_eq!(config.store, StoreBackend::InMemory);
    }

    #[test]
    fn admin_subjects_are_comma_separated() {
        let a = PrincipalId::new();
        let b = PrincipalId::new();
        let raw = format!("{a}, {b},");
        let config =
            PortalConfig::from_lookup(lookup(&[("PORTAL_ADMIN_SUBJECTS", raw.as_str())])).unwrap();
        assert_eq!(config.admin_subjects, vec![a, b]);

        let err =
            PortalConfig::from_lookup(lookup(&[("PORTAL_ADMIN_SUBJECTS", "root")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidAdminSubject("root".to_string()));
    }

    #[test]
    fn rejects_bad_bind_address() {
        let err =
            PortalConfig::from_lookup(lookup(&[("PORTAL_BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr(_)));
    }
}
