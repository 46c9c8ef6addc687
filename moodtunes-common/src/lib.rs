//! # MoodTunes Common Library
//!
//! Shared code for the MoodTunes crates including:
//! - Error and result types
//! - Bootstrap TOML configuration and config file resolution
//! - Clock-style duration formatting and ISO-8601 duration parsing

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
