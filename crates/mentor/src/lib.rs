//! Mentor - student progress dashboard for the Smart Learning API
//!
//! The library is split the way the binary uses it:
//!
//! - [`client`]: typed HTTP access behind the [`client::DashboardApi`] trait
//! - [`views`]: per-screen state machines driven by async fetches
//! - [`render`]: pure text rendering of view state
//! - [`commands`]: the CLI handlers that wire the three together

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod unicode;
pub mod views;

pub use client::{ApiClient, DashboardApi};
pub use config::{DashboardConfig, SectionFailurePolicy};
pub use error::{ConfigError, FetchError, LoginError};
pub use models::StudentIdentity;
