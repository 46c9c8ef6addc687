//! HTTP API handlers for moodtunes-resolver

pub mod health;
pub mod moods;
pub mod resolve;

pub use health::health_routes;
pub use moods::mood_routes;
pub use resolve::resolve_routes;
