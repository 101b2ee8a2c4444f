use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProbeConfig {
    pub server: ServerConfig,
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_seconds: u64,
}

/// Which dependency checks the deployment enables. A class with no
/// target configured is simply not registered; generic checks coexist
/// with named instances and are deduplicated at aggregation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    pub database: DatabaseChecksConfig,
    pub cache: CacheChecksConfig,
    pub broker: BrokerCheckConfig,
    pub disk: DiskCheckConfig,
    pub check_timeout_ms: u64,
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseChecksConfig {
    pub generic_target: Option<String>,
    pub instances: Vec<NamedTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheChecksConfig {
    pub generic_target: Option<String>,
    pub instances: Vec<NamedTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrokerCheckConfig {
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskCheckConfig {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedTarget {
    pub name: String,
    pub target: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            shutdown_timeout_seconds: 10,
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            database: DatabaseChecksConfig::default(),
            cache: CacheChecksConfig::default(),
            broker: BrokerCheckConfig::default(),
            disk: DiskCheckConfig::default(),
            check_timeout_ms: 5000,
            deadline_ms: None,
        }
    }
}

impl Default for DiskCheckConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from("./")],
        }
    }
}

impl ProbeConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&ProbeConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let probe_config: ProbeConfig = config.try_deserialize()?;

        probe_config.validate()?;

        Ok(probe_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.checks.check_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Check timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(deadline_ms) = self.checks.deadline_ms {
            if deadline_ms == 0 {
                return Err(ConfigError::Message(
                    "Aggregation deadline must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(target) = &self.checks.database.generic_target {
            if target.is_empty() {
                return Err(ConfigError::Message(
                    "Generic database target cannot be empty".to_string(),
                ));
            }
        }

        if let Some(target) = &self.checks.cache.generic_target {
            if target.is_empty() {
                return Err(ConfigError::Message(
                    "Generic cache target cannot be empty".to_string(),
                ));
            }
        }

        if let Some(target) = &self.checks.broker.target {
            if target.is_empty() {
                return Err(ConfigError::Message(
                    "Broker target cannot be empty".to_string(),
                ));
            }
        }

        validate_instances("database", &self.checks.database.instances)?;
        validate_instances("cache", &self.checks.cache.instances)?;

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn validate_instances(class: &str, instances: &[NamedTarget]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for instance in instances {
        if instance.name.is_empty() {
            return Err(ConfigError::Message(format!(
                "{} instance name cannot be empty",
                class
            )));
        }

        if instance.target.is_empty() {
            return Err(ConfigError::Message(format!(
                "{} instance '{}' has an empty target",
                class, instance.name
            )));
        }

        if !seen.insert(instance.name.as_str()) {
            return Err(ConfigError::Message(format!(
                "{} instance '{}' is configured twice",
                class, instance.name
            )));
        }
    }

    Ok(())
}
