//! Core data types for marker definitions.
//!
//! A marker is a geo-anchored piece of content. The visibility engine only
//! looks at the id, position and geofence radius; everything in
//! [`MarkerKind`] is presentation data passed through to the renderer.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::coord::Coordinate;

/// Default geofence radius in meters when a marker does not specify one.
pub const DEFAULT_GEOFENCE_RADIUS_M: f64 = 50.0;

/// A static, externally supplied marker definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDefinition {
    /// Unique identifier across the marker set.
    pub id: String,
    /// Anchor position. May be invalid if the source data was malformed.
    pub position: Coordinate,
    /// Marker-specific inclusion radius in meters (> 0).
    pub geofence_radius_m: f64,
    /// Height above ground in meters, for the renderer.
    pub elevation_m: f64,
    /// Presentation variant.
    pub kind: MarkerKind,
}

impl MarkerDefinition {
    /// Create a text marker with default radius and no text.
    pub fn new(id: impl Into<String>, position: Coordinate) -> Self {
        Self {
            id: id.into(),
            position,
            geofence_radius_m: DEFAULT_GEOFENCE_RADIUS_M,
            elevation_m: 0.0,
            kind: MarkerKind::Text(TextMarker::default()),
        }
    }

    /// Set the geofence radius.
    pub fn with_geofence_radius(mut self, radius_m: f64) -> Self {
        self.geofence_radius_m = radius_m;
        self
    }

    /// Set the elevation.
    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Set the presentation variant.
    pub fn with_kind(mut self, kind: MarkerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parse a marker from a JSON object in the configuration format.
    ///
    /// Coordinates that are missing or not numbers become NaN so the
    /// engine skips the marker at evaluation time. A missing or invalid
    /// `geofenceRadius` falls back to [`DEFAULT_GEOFENCE_RADIUS_M`].
    /// A missing `type` means text; an unknown type logs a warning and
    /// is treated as text. A presentation field of the wrong shape is
    /// dropped with a warning and takes its default.
    pub fn from_json(value: &Value) -> Result<Self, MarkerError> {
        let object = value.as_object().ok_or(MarkerError::NotAnObject)?;

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or(MarkerError::MissingId)?
            .to_string();

        let number = |key: &str| object.get(key).and_then(Value::as_f64);

        let position = Coordinate::new(
            number("latitude").unwrap_or(f64::NAN),
            number("longitude").unwrap_or(f64::NAN),
        );

        let geofence_radius_m = match number("geofenceRadius") {
            Some(radius) if radius.is_finite() && radius > 0.0 => radius,
            Some(radius) => {
                tracing::warn!(
                    marker = %id,
                    radius = radius,
                    default = DEFAULT_GEOFENCE_RADIUS_M,
                    "Invalid geofence radius, using default"
                );
                DEFAULT_GEOFENCE_RADIUS_M
            }
            None => DEFAULT_GEOFENCE_RADIUS_M,
        };

        let elevation_m = number("elevation").unwrap_or(0.0);

        let type_name = object.get("type").and_then(Value::as_str).unwrap_or("text");
        let marker_type = MarkerType::from_name(type_name).unwrap_or_else(|| {
            tracing::warn!(
                marker = %id,
                marker_type = type_name,
                "Unknown marker type, defaulting to text"
            );
            MarkerType::Text
        });

        let kind = MarkerKind::from_json(&id, marker_type, object);

        Ok(Self {
            id,
            position,
            geofence_radius_m,
            elevation_m,
            kind,
        })
    }
}

/// Errors raised while parsing a marker definition.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// The marker entry is not a JSON object.
    #[error("marker entry is not an object")]
    NotAnObject,

    /// The marker has no string `id`.
    #[error("marker has no string id")]
    MissingId,
}

/// Marker type names as they appear in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerType {
    Text,
    Image,
    Model,
    Video,
    Audio,
    Html,
}

impl MarkerType {
    /// Resolve a configuration type name, including aliases.
    ///
    /// Matching is case-insensitive: `gltf`/`model`, `audio`/`sound`
    /// and `html`/`panel` are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" => Some(MarkerType::Text),
            "image" => Some(MarkerType::Image),
            "gltf" | "model" => Some(MarkerType::Model),
            "video" => Some(MarkerType::Video),
            "audio" | "sound" => Some(MarkerType::Audio),
            "html" | "panel" => Some(MarkerType::Html),
            _ => None,
        }
    }

    /// Canonical type name.
    pub fn name(&self) -> &'static str {
        match self {
            MarkerType::Text => "text",
            MarkerType::Image => "image",
            MarkerType::Model => "gltf",
            MarkerType::Video => "video",
            MarkerType::Audio => "audio",
            MarkerType::Html => "html",
        }
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Presentation variant of a marker, consumed only by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    Text(TextMarker),
    Image(ImageMarker),
    Model(ModelMarker),
    Video(VideoMarker),
    Audio(AudioMarker),
    Html(HtmlMarker),
}

impl MarkerKind {
    /// The type tag of this variant.
    pub fn marker_type(&self) -> MarkerType {
        match self {
            MarkerKind::Text(_) => MarkerType::Text,
            MarkerKind::Image(_) => MarkerType::Image,
            MarkerKind::Model(_) => MarkerType::Model,
            MarkerKind::Video(_) => MarkerType::Video,
            MarkerKind::Audio(_) => MarkerType::Audio,
            MarkerKind::Html(_) => MarkerType::Html,
        }
    }

    fn from_json(id: &str, marker_type: MarkerType, object: &Map<String, Value>) -> Self {
        match marker_type {
            MarkerType::Text => MarkerKind::Text(lenient_fields(id, object)),
            MarkerType::Image => MarkerKind::Image(lenient_fields(id, object)),
            MarkerType::Model => MarkerKind::Model(lenient_fields(id, object)),
            MarkerType::Video => MarkerKind::Video(lenient_fields(id, object)),
            MarkerType::Audio => MarkerKind::Audio(lenient_fields(id, object)),
            MarkerType::Html => MarkerKind::Html(lenient_fields(id, object)),
        }
    }
}

/// Deserialize presentation fields, dropping the ones that do not fit.
///
/// Every variant struct is `#[serde(default)]`, so a single field can be
/// checked on its own and unknown keys are ignored.
fn lenient_fields<T>(id: &str, object: &Map<String, Value>) -> T
where
    T: DeserializeOwned + Default,
{
    if let Ok(kind) = T::deserialize(&Value::Object(object.clone())) {
        return kind;
    }

    let mut kept = Map::new();
    for (key, field) in object {
        let single = Value::Object(Map::from_iter([(key.clone(), field.clone())]));
        match T::deserialize(&single) {
            Ok(_) => {
                kept.insert(key.clone(), field.clone());
            }
            Err(e) => {
                tracing::warn!(
                    marker = %id,
                    field = %key,
                    error = %e,
                    "Invalid marker field, using default"
                );
            }
        }
    }

    T::deserialize(&Value::Object(kept)).unwrap_or_default()
}

/// Three-component vector for scale and rotation (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };
}

/// Floating text label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextMarker {
    pub text: String,
    pub color: String,
    pub width: f64,
    pub font_size: f64,
    pub face_user: bool,
    /// Yaw in degrees, used when not facing the user.
    pub direction: f64,
}

impl Default for TextMarker {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: "#FFFFFF".to_string(),
            width: 10.0,
            font_size: 3.0,
            face_user: false,
            direction: 0.0,
        }
    }
}

/// Flat image billboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageMarker {
    pub src: String,
    pub width: f64,
    height: Option<f64>,
    pub opacity: f64,
    pub face_user: bool,
    pub rotation: Option<Vec3>,
}

impl ImageMarker {
    /// Height in meters; square when unset.
    pub fn height(&self) -> f64 {
        self.height.unwrap_or(self.width)
    }
}

impl Default for ImageMarker {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 5.0,
            height: None,
            opacity: 1.0,
            face_user: false,
            rotation: None,
        }
    }
}

/// Animation selection for a 3D model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Animation {
    #[default]
    None,
    /// Play every clip the model provides.
    Auto,
    /// Play a named clip.
    Clip(String),
}

impl From<Option<String>> for Animation {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            None | Some("") | Some("none") => Animation::None,
            Some("auto") => Animation::Auto,
            Some(clip) => Animation::Clip(clip.to_string()),
        }
    }
}

/// glTF model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelMarker {
    pub src: String,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub animation: Animation,
    pub interactive: bool,
}

impl Default for ModelMarker {
    fn default() -> Self {
        Self {
            src: String::new(),
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            animation: Animation::None,
            interactive: false,
        }
    }
}

/// Video plane.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoMarker {
    pub src: String,
    pub width: f64,
    pub height: f64,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub volume: f64,
    pub face_user: bool,
}

impl Default for VideoMarker {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 8.0,
            height: 4.5,
            autoplay: false,
            looping: false,
            volume: 0.5,
            face_user: false,
        }
    }
}

/// Positional audio falloff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialAudio {
    pub ref_distance: f64,
    pub max_distance: f64,
}

/// Audio source, optionally with a visual indicator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioMarker {
    pub src: String,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub volume: f64,
    pub spatial_sound: bool,
    pub ref_distance: f64,
    pub max_distance: f64,
    pub visual_indicator: bool,
}

impl AudioMarker {
    /// Falloff parameters when spatial sound is enabled.
    pub fn spatial(&self) -> Option<SpatialAudio> {
        self.spatial_sound.then_some(SpatialAudio {
            ref_distance: self.ref_distance,
            max_distance: self.max_distance,
        })
    }
}

impl Default for AudioMarker {
    fn default() -> Self {
        Self {
            src: String::new(),
            autoplay: true,
            looping: true,
            volume: 1.0,
            spatial_sound: false,
            ref_distance: 1.0,
            max_distance: 20.0,
            visual_indicator: false,
        }
    }
}

/// Text panel built from HTML content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlMarker {
    pub content: String,
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    pub padding: f64,
    pub face_user: bool,
}

impl HtmlMarker {
    /// Content with tags removed and whitespace collapsed.
    pub fn plain_text(&self) -> String {
        static TAGS: OnceLock<Regex> = OnceLock::new();
        static SPACES: OnceLock<Regex> = OnceLock::new();

        let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
        let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid space pattern"));

        let stripped = tags.replace_all(&self.content, " ");
        spaces.replace_all(&stripped, " ").trim().to_string()
    }

    /// Width available for text inside the padding.
    pub fn text_width(&self) -> f64 {
        self.width - self.padding * 2.0
    }
}

impl Default for HtmlMarker {
    fn default() -> Self {
        Self {
            content: String::new(),
            width: 6.0,
            height: 4.0,
            background_color: "rgba(0, 0, 0, 0.8)".to_string(),
            padding: 0.2,
            face_user: false,
        }
    }
}
