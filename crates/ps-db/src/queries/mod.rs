//! Database query modules.

pub mod action_history;
pub mod auth;
pub mod comments;
pub mod images;
pub mod users;
