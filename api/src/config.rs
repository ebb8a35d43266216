use std::env;
use std::str::FromStr;
use tracing::{info, warn};

/// Runtime settings for one service process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Port of the plain-text banner listener; disabled when unset.
    pub info_port: Option<u16>,
    /// Start with the fixture records instead of an empty collection.
    pub seed_data: bool,
}

impl ServiceConfig {
    /// Reads `PORT`, `INFO_PORT` and `SEED_DATA`, after loading a `.env` file if one exists.
    pub fn from_env(default_port: u16) -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(default_port, |key| env::var(key).ok())
    }

    pub fn from_lookup(default_port: u16, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(port_str) => match u16::from_str(port_str.trim()) {
                Ok(port_num) => {
                    info!("Using port {} from environment variable PORT.", port_num);
                    port_num
                }
                Err(_) => {
                    warn!(
                        "Invalid PORT value '{}' in environment variable. Using default port {}.",
                        port_str, default_port
                    );
                    default_port
                }
            },
            None => {
                info!(
                    "PORT environment variable not set. Using default port {}.",
                    default_port
                );
                default_port
            }
        };

        let info_port = lookup("INFO_PORT").and_then(|raw| match u16::from_str(raw.trim()) {
            Ok(port_num) => Some(port_num),
            Err(_) => {
                warn!("Invalid INFO_PORT value '{}'. Banner listener disabled.", raw);
                None
            }
        });

        let seed_data = match lookup("SEED_DATA") {
            None => true,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    warn!("Invalid SEED_DATA value '{}'. Seeding fixtures.", raw);
                    true
                }
            },
        };

        Self {
            port,
            info_port,
            seed_data,
        }
    }
}
