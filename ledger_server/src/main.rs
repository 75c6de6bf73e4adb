use dotenvy::dotenv;
use ledger_server::{
    cli::{display_envs, handle_command_line_args},
    config::ServerConfig,
    server::run_server,
};
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = handle_command_line_args();
    if args.print_env {
        display_envs();
        return;
    }
    let config = ServerConfig::from_env_or_default().with_overrides(&args);

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
