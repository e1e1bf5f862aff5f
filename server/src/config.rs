use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Hosted payment page. Some payment links accept an `amount` query
/// parameter, some ignore it; we append it either way as a convenience.
pub const DEFAULT_PAYMENT_LINK: &str = "https://flutterwave.com/donate/jjejspsyo9eh";

pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub payment_link: String,
    pub projects_seed: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379"),
            payment_link: try_load("PAYMENT_LINK", DEFAULT_PAYMENT_LINK),
            projects_seed: try_load("PROJECTS_SEED", "projects.json"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
