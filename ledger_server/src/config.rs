use std::{env, fmt::Display, str::FromStr, time::Duration};

use accrual_tools::AccrualConfig;
use ledger_common::helpers::parse_numeric;
use ledger_engine::{
    reconciliation::{DEFAULT_POLL_INTERVAL, DEFAULT_WORKER_COUNT},
    ReconciliationConfig,
};
use log::*;

use crate::cli::Arguments;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URI: &str = "sqlite://data/ledger.db";
const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Where and how to reach the accrual authority. An empty base URL disables reconciliation.
    pub accrual: AccrualConfig,
    pub reconciliation: ReconciliationConfig,
    /// How long the reconciliation pipeline gets to wind down on shutdown before its tasks are aborted.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URI.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            accrual: AccrualConfig::default().with_request_timeout(DEFAULT_ACCRUAL_TIMEOUT),
            reconciliation: ReconciliationConfig::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to its value, if set. Invalid values are
    /// logged and replaced with their defaults.
    pub fn from_source<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let (host, port) = match lookup("RUN_ADDRESS") {
            Some(addr) => parse_run_address(&addr).unwrap_or_else(|| {
                error!(
                    "🪛️ {addr} is not a valid value for RUN_ADDRESS. Using the default, {DEFAULT_HOST}:{DEFAULT_PORT}, \
                     instead."
                );
                (DEFAULT_HOST.to_string(), DEFAULT_PORT)
            }),
            None => (DEFAULT_HOST.to_string(), DEFAULT_PORT),
        };
        let database_url = lookup("DATABASE_URI").unwrap_or_else(|| {
            info!("🪛️ DATABASE_URI is not set. Using the default, {DEFAULT_DATABASE_URI}.");
            DEFAULT_DATABASE_URI.to_string()
        });
        let base_url = lookup("ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|| {
            error!("🪛️ ACCRUAL_SYSTEM_ADDRESS is not set. Please set it to the base URL of the accrual authority.");
            String::default()
        });
        let timeout = numeric_setting(&lookup, "LEDGER_ACCRUAL_TIMEOUT_SECS", DEFAULT_ACCRUAL_TIMEOUT.as_secs());
        let accrual = AccrualConfig::new(base_url).with_request_timeout(Duration::from_secs(timeout));
        let worker_count = match numeric_setting(&lookup, "LEDGER_WORKER_COUNT", DEFAULT_WORKER_COUNT) {
            0 => {
                warn!("🪛️ LEDGER_WORKER_COUNT must be at least 1. Using the default, {DEFAULT_WORKER_COUNT}, instead.");
                DEFAULT_WORKER_COUNT
            },
            n => n,
        };
        #[allow(clippy::cast_possible_truncation)]
        let poll_interval =
            numeric_setting(&lookup, "LEDGER_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL.as_millis() as u64);
        let reconciliation = ReconciliationConfig::new(worker_count, Duration::from_millis(poll_interval));
        let reconciliation = match numeric_setting(&lookup, "LEDGER_QUEUE_CAPACITY", reconciliation.channel_capacity) {
            0 => {
                warn!(
                    "🪛️ LEDGER_QUEUE_CAPACITY must be at least 1. Using the default, {}, instead.",
                    reconciliation.channel_capacity
                );
                reconciliation
            },
            n => reconciliation.with_channel_capacity(n),
        };
        let grace = numeric_setting(&lookup, "LEDGER_SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE.as_secs());
        let db_max_connections = numeric_setting(&lookup, "LEDGER_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            accrual,
            reconciliation,
            shutdown_grace: Duration::from_secs(grace),
        }
    }

    /// Applies command-line flags, which take precedence over the environment.
    pub fn with_overrides(mut self, args: &Arguments) -> Self {
        if let Some(addr) = &args.run_address {
            match parse_run_address(addr) {
                Some((host, port)) => {
                    self.host = host;
                    self.port = port;
                },
                None => error!("🪛️ Ignoring invalid address given with -a: {addr}"),
            }
        }
        if let Some(uri) = &args.database_uri {
            self.database_url = uri.clone();
        }
        if let Some(url) = &args.accrual_address {
            let timeout = self.accrual.request_timeout;
            self.accrual = AccrualConfig::new(url.as_str()).with_request_timeout(timeout);
        }
        self
    }
}

/// Splits `host:port`. The host may be empty, in which case all interfaces are used.
pub fn parse_run_address(addr: &str) -> Option<(String, u16)> {
    let (host, port) = addr.trim().rsplit_once(':')?;
    let port = port.parse::<u16>().ok()?;
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Some((host.to_string(), port))
}

fn numeric_setting<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => parse_numeric(Some(raw.clone())).unwrap_or_else(|| {
            warn!("🪛️ {raw} is not a valid value for {name}. Using the default, {default}, instead.");
            default
        }),
    }
}
