use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Ordered (lat, lng) pairs. Opaque to this service; no geometric
/// validation is performed.
pub type Ring = Vec<(f64, f64)>;

/// Defaults applied by Create for omitted fields.
pub mod defaults {
    pub const NAME: &str = "Unnamed Polygon";
    pub const HEIGHT: f64 = 300.0;
    pub const FILL_COLOR: &str = "#ff0000";
    pub const FILL_OPACITY: f64 = 0.5;
    pub const STROKE_COLOR: &str = "#0000ff";
    pub const STROKE_OPACITY: f64 = 1.0;
    pub const STROKE_WIDTH: i32 = 3;
}

/// A stored polygon row. `owner_key` identifies the controlling identity
/// and is never serialized in API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Polygon {
    pub id: i32,
    #[serde(skip_serializing)]
    pub owner_key: Option<String>,
    pub name: String,
    pub coordinates: Json<Ring>,
    pub height: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_width: i32,
}

/// Partial polygon fields as supplied by the client. Every field is
/// optional; an omitted (or null) field means "keep the stored value" on
/// update and "use the documented default" on create. Owner fields are not
/// accepted here at all, so client-supplied ownership is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolygonPatch {
    pub name: Option<String>,
    pub coordinates: Option<Ring>,
    pub height: Option<f64>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_width: Option<i32>,
}

/// A fully-defaulted polygon ready for insertion; the store assigns the id.
#[derive(Debug, Clone)]
pub struct PolygonDraft {
    pub owner_key: Option<String>,
    pub name: String,
    pub coordinates: Ring,
    pub height: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_width: i32,
}

impl PolygonPatch {
    /// Fills omitted fields with the documented defaults and stamps the
    /// owner key resolved for the request.
    pub fn into_draft(self, owner_key: Option<&str>) -> PolygonDraft {
        PolygonDraft {
            owner_key: owner_key.map(str::to_string),
            name: self.name.unwrap_or_else(|| defaults::NAME.to_string()),
            coordinates: self.coordinates.unwrap_or_default(),
            height: self.height.unwrap_or(defaults::HEIGHT),
            fill_color: self
                .fill_color
                .unwrap_or_else(|| defaults::FILL_COLOR.to_string()),
            fill_opacity: self.fill_opacity.unwrap_or(defaults::FILL_OPACITY),
            stroke_color: self
                .stroke_color
                .unwrap_or_else(|| defaults::STROKE_COLOR.to_string()),
            stroke_opacity: self.stroke_opacity.unwrap_or(defaults::STROKE_OPACITY),
            stroke_width: self.stroke_width.unwrap_or(defaults::STROKE_WIDTH),
        }
    }

    /// Partial merge: each supplied field overwrites the stored value, each
    /// omitted field is left unchanged. Never touches id or owner_key.
    pub fn apply(&self, polygon: &mut Polygon) {
        if let Some(name) = &self.name {
            polygon.name = name.clone();
        }
        if let Some(coordinates) = &self.coordinates {
            polygon.coordinates = Json(coordinates.clone());
        }
        if let Some(height) = self.height {
            polygon.height = height;
        }
        if let Some(fill_color) = &self.fill_color {
            polygon.fill_color = fill_color.clone();
        }
        if let Some(fill_opacity) = self.fill_opacity {
            polygon.fill_opacity = fill_opacity;
        }
        if let Some(stroke_color) = &self.stroke_color {
            polygon.stroke_color = stroke_color.clone();
        }
        if let Some(stroke_opacity) = self.stroke_opacity {
            polygon.stroke_opacity = stroke_opacity;
        }
        if let Some(stroke_width) = self.stroke_width {
            polygon.stroke_width = stroke_width;
        }
    }
}

impl PolygonDraft {
    pub fn into_polygon(self, id: i32) -> Polygon {
        Polygon {
            id,
            owner_key: self.owner_key,
            name: self.name,
            coordinates: Json(self.coordinates),
            height: self.height,
            fill_color: self.fill_color,
            fill_opacity: self.fill_opacity,
            stroke_color: self.stroke_color,
            stroke_opacity: self.stroke_opacity,
            stroke_width: self.stroke_width,
        }
    }
}
