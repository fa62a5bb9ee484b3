use db::{DBService, DatabaseError};
use services::services::{
    attachment::{AttachmentService, AttachmentStore},
    auth::AuthService,
};
use utils_jwt::TokenSigner;

pub mod config;
pub mod error;
pub mod http;
pub mod routes;

pub use config::Config;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct Deployment {
    config: Config,
    db: DBService,
    auth: AuthService,
    attachments: AttachmentService,
}

impl Deployment {
    pub async fn new(config: Config) -> Result<Self, DatabaseError> {
        let db = DBService::connect(&config.database_url).await?;
        let signer = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_expiry);
        let auth = AuthService::new(signer);
        let attachments = AttachmentService::new(AttachmentStore::new(&config.doc_path));
        Ok(Self {
            config,
            db,
            auth,
            attachments,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn attachments(&self) -> &AttachmentService {
        &self.attachments
    }
}
