pub mod settings;

pub use settings::{
    BrokerCheckConfig, CacheChecksConfig, ChecksConfig, DatabaseChecksConfig, DiskCheckConfig,
    NamedTarget, ProbeConfig, ServerConfig,
};
