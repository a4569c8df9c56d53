//! GeoMarker - Geofenced marker visibility for location-based AR
//!
//! This library decides which location-anchored markers should be shown to a
//! user, given the device position, each marker's geofence radius and a global
//! render-distance window. Rendering and platform geolocation are supplied by
//! the host through the collaborator traits in [`engine`] and [`source`].
//!
//! # Modules
//!
//! - [`coord`] - Coordinates and haversine distance
//! - [`marker`] - Marker definitions and per-kind attributes
//! - [`config`] - Marker and settings file loading
//! - [`location`] - Device location and position errors
//! - [`logging`] - Logger installation
//! - [`engine`] - The visibility engine and its collaborators
//! - [`source`] - Position sources and subscriptions
//! - [`service`] - The event loop driving the engine

pub mod config;
pub mod coord;
pub mod engine;
pub mod location;
pub mod logging;
pub mod marker;
pub mod service;
pub mod source;

pub use config::{ConfigError, ConfigFile, VisibilitySettings};
pub use coord::{distance, Coordinate};
pub use engine::{EngineStatus, MarkerRenderer, StatusReporter, VisibilityEngine};
pub use location::{DeviceLocation, PositionError, PositionFix};
pub use marker::MarkerDefinition;
pub use service::{GeofenceService, ServiceError, ServiceSummary};
pub use source::{PositionSource, Subscription};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
