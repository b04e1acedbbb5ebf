use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use todo_dashboard::{app::run_server, config::Config};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    if let Err(e) = run_server(config).await {
        error!("run server error: {e}");
        std::process::exit(1);
    };
}
