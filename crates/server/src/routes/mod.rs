use serde::Deserialize;

pub mod attachments;
pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod releases;
pub mod requirements;
pub mod roles;
pub mod tasks;
pub mod team_members;
pub mod users;

fn default_limit() -> u64 {
    100
}

/// `?skip=&limit=` on every list endpoint.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}
