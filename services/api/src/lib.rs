//! Authenticated text summarization API
//!
//! Users register and log in for a bearer token, then chat with and
//! summarize text through an LLM provider, classify images through an
//! inference endpoint, and upload documents.

pub mod assistant;
pub mod config;
pub mod error;
pub mod extract;
pub mod files;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod providers;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
