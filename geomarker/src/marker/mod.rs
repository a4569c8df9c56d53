//! Marker definitions.
//!
//! Markers are loaded once from configuration and never mutated. The
//! visibility engine reads only the id, position and geofence radius of each
//! marker. The presentation variant in [`MarkerKind`] belongs to the renderer.
//!
//! # Example
//!
//! ```
//! use geomarker::coord::Coordinate;
//! use geomarker::marker::{MarkerDefinition, MarkerType};
//!
//! let marker = MarkerDefinition::new("fountain", Coordinate::new(52.2846, 5.5187))
//!     .with_geofence_radius(30.0);
//!
//! assert_eq!(marker.kind.marker_type(), MarkerType::Text);
//! ```

mod model;

pub use model::{
    Animation, AudioMarker, HtmlMarker, ImageMarker, MarkerDefinition, MarkerError, MarkerKind,
    MarkerType, ModelMarker, SpatialAudio, TextMarker, Vec3, VideoMarker,
    DEFAULT_GEOFENCE_RADIUS_M,
};
