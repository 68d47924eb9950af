//! Environment-sourced configuration.
//!
//! Collected once at startup; a missing required variable aborts the process
//! with a descriptive error before the dispatcher starts.

use anyhow::{Context, Result};
use std::env;

const DEFAULT_HEALTH_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct Config {
    /// Bot API token. Required.
    pub bot_token: String,
    /// Operator contact handle, stored without the leading `@`. Required.
    pub admin_username: String,
    /// Port for the liveness endpoint; hosting platforms set `PORT`.
    pub health_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable is not set")?;
        let admin_username = env::var("ADMIN_USERNAME")
            .context("ADMIN_USERNAME environment variable is not set")?;
        let health_port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("PORT must be a number, got '{port}'"))?,
            Err(_) => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            bot_token,
            admin_username: normalize_handle(&admin_username),
            health_port,
        })
    }

    /// The admin as a Telegram recipient, e.g. `@shop_admin`.
    pub fn admin_recipient(&self) -> String {
        format!("@{}", self.admin_username)
    }
}

/// Accept handles configured with or without the leading `@`.
fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_string()
}
