pub mod attachment;
pub mod auth;
pub mod password;
