//! Thin axum HTTP adapter exposing the Intake Pipeline, Invoice Draft
//! Generator, and Support Router as three JSON endpoints
//! (`spec.md` §6, `SPEC_FULL.md` §6).

pub mod http;
pub mod providers;
pub mod state;

pub use http::create_router;
pub use state::{AppState, EndpointConfig};
