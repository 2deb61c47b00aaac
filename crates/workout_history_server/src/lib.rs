//! HTTP front end for the workout history pipeline.
//!
//! Handlers are thin: each one parses query parameters, calls the
//! synchronous [`workout_history::WorkoutService`] and maps library errors
//! through [`error::ApiError`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
