pub mod attachment;
pub mod comment;
pub mod project;
pub mod release;
pub mod requirement;
pub mod role;
pub mod task;
pub mod team_member;
pub mod user;
