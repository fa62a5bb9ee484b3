use std::path::PathBuf;

use chrono::Duration;
use utils::assets::{attachments_dir, db_path};

const DEFAULT_TOKEN_EXPIRY_MINUTES: i64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_expiry: Duration,
    /// Root of the attachment blob store.
    pub doc_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(8000);

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}?mode=rwc", db_path().to_string_lossy())
        });

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using an insecure development secret");
                "insecure-dev-secret".to_string()
            }
        };

        let token_expiry = std::env::var("TOKEN_EXPIRY_MINUTES")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|minutes| *minutes > 0)
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_EXPIRY_MINUTES));

        let doc_path = std::env::var("DOC_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| attachments_dir());

        Self {
            host,
            port,
            database_url,
            jwt_secret,
            token_expiry,
            doc_path,
        }
    }
}
