use std::time::Duration;

use clap::Parser;

use crate::client::DEFAULT_BASE_URL;

#[derive(Parser, Debug, Clone)]
#[command(name = "todo_dashboard", version, about = "Todo dashboard backed by a public REST API")]
pub struct Config {
    /// Address the dashboard listens on.
    #[arg(long, env = "TODO_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Base URL of the users/todos API.
    #[arg(long, env = "TODO_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Where the session and favorites are kept.
    #[arg(
        long,
        env = "TODO_DATABASE_URL",
        default_value = "sqlite:./todo-dashboard.db?mode=rwc"
    )]
    pub database_url: String,

    #[arg(long, env = "TODO_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
