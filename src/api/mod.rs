//! RugScope HTTP API
//! Thin REST surface over the token analyzer

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use routes::create_router;
pub use types::*;
