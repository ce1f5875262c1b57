//! Environment-driven configuration. All secrets are plain environment
//! variables; a `.env` file is honoured in development.

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub asset_dir: String,
    pub asset_public_base: String,
    pub stock_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("CLAYHAUS_BIND_ADDR", "127.0.0.1:3000"),
            database_url: env_or("CLAYHAUS_DB_PATH", "sqlite:clayhaus.db"),
            asset_dir: env_or("CLAYHAUS_ASSET_DIR", "uploads"),
            asset_public_base: env_or("CLAYHAUS_ASSET_BASE", "/assets/uploads"),
            stock_dir: env_or("CLAYHAUS_STOCK_DIR", "static/stock"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
