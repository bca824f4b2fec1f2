//! HTTP middleware: request IDs, authentication, rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
