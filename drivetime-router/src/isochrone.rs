use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A GeoJSON position: `[longitude, latitude]`, optionally followed by elevation.
pub type Position = Vec<f64>;

/// Polygon geometry as returned by the routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Number of vertices across every ring.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Polygon(rings) => rings.iter().map(Vec::len).sum(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
        }
    }
}

/// Exact-match cache key for an isochrone query.
///
/// Coordinates are compared bit-for-bit, so two keys are equal only when the
/// caller passed identical values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IsochroneKey {
    pub longitude: f64,
    pub latitude: f64,
    pub seconds: u32,
}

impl IsochroneKey {
    pub fn new(longitude: f64, latitude: f64, seconds: u32) -> Self {
        Self {
            longitude,
            latitude,
            seconds,
        }
    }

    fn bits(&self) -> (u64, u64, u32) {
        (self.longitude.to_bits(), self.latitude.to_bits(), self.seconds)
    }
}

impl PartialEq for IsochroneKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for IsochroneKey {}

impl Hash for IsochroneKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isochrone {
    pub key: IsochroneKey,
    pub geometry: Geometry,
}

impl Isochrone {
    pub fn new(key: IsochroneKey, geometry: Geometry) -> Self {
        Self { key, geometry }
    }
}
