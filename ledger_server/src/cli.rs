use std::{env, env::VarError};

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Keeps the loyalty points ledger in step with the accrual authority")]
pub struct Arguments {
    /// The address to serve on, e.g. localhost:8080. Overrides RUN_ADDRESS.
    #[arg(short = 'a', long = "address")]
    pub run_address: Option<String>,
    /// The ledger database, e.g. sqlite://data/ledger.db. Overrides DATABASE_URI.
    #[arg(short = 'd', long = "database")]
    pub database_uri: Option<String>,
    /// The base URL of the accrual authority. Overrides ACCRUAL_SYSTEM_ADDRESS.
    #[arg(short = 'r', long = "accrual")]
    pub accrual_address: Option<String>,
    /// Print the configuration environment variables and exit.
    #[arg(long)]
    pub print_env: bool,
}

pub fn handle_command_line_args() -> Arguments {
    Arguments::parse()
}

pub fn display_envs() {
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "RUN_ADDRESS",
        "DATABASE_URI",
        "ACCRUAL_SYSTEM_ADDRESS",
        "LEDGER_WORKER_COUNT",
        "LEDGER_POLL_INTERVAL_MS",
        "LEDGER_QUEUE_CAPACITY",
        "LEDGER_ACCRUAL_TIMEOUT_SECS",
        "LEDGER_SHUTDOWN_GRACE_SECS",
        "LEDGER_DB_MAX_CONNECTIONS",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
