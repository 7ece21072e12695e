use std::env;

/// Runtime configuration, read once at startup. Everything has a default
/// so a bare `cargo run` serves on 0.0.0.0:5000.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Seed account for the administrative role. Both values must be set
    /// for the bootstrap to run.
    pub admin_email: Option<String>,
    pub admin_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5000);

        Self {
            host,
            port,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_token: env::var("ADMIN_TOKEN").ok(),
        }
    }
}
