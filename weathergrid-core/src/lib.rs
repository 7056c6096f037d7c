//! Core library for the `weathergrid` widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The geocoding and forecast HTTP clients
//! - The debouncer and the forecast view state machine
//!
//! It is used by `weathergrid-tui`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod view;

pub use client::geocoding::GeocodingClient;
pub use client::openmeteo::ForecastClient;
pub use config::Config;
pub use debounce::Debouncer;
pub use error::{ClientError, WidgetError};
pub use model::{Coordinates, DailySeries, ForecastDay, ForecastPayload, Location};
pub use view::{ForecastView, ViewEffect, ViewMsg, ViewState};
