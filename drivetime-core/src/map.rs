// Map composition: one polygon and one marker per visible location

use crate::colors::{ColorAssignment, TAB20};
use crate::state::AppState;
use drivetime_router::{Isochrone, IsochroneRetriever, IsochroneSource, RetrievalError};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const PROJECT_COLOR: &str = "#ff0000";
pub const PROJECT_FILL_OPACITY: f64 = 0.3;
pub const COMPANY_FILL_OPACITY: f64 = 0.2;
pub const OUTLINE_WEIGHT: u8 = 2;
pub const DEFAULT_ZOOM: u8 = 10;

/// Called before each retrieval with (position, total, label).
pub type ComposeProgress<'a> = &'a (dyn Fn(usize, usize, &str) + Send + Sync);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Project,
    Company,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Star,
    Info,
}

impl MarkerIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            MarkerIcon::Star => "★",
            MarkerIcon::Info => "i",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonStyle {
    pub color: String,
    pub fill_color: String,
    pub weight: u8,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
    pub icon: MarkerIcon,
    /// Marker body color.
    pub color: String,
    /// Glyph color.
    pub icon_color: String,
}

/// A single overlay: the isochrone polygon and the point it was drawn around.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub kind: LayerKind,
    /// Shown in the layer control when present.
    pub name: Option<String>,
    pub isochrone: Arc<Isochrone>,
    pub style: PolygonStyle,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    /// (latitude, longitude)
    pub center: (f64, f64),
    pub zoom: u8,
    pub duration_minutes: u32,
    /// Draw order: later layers sit on top.
    pub layers: Vec<MapLayer>,
}

impl MapDocument {
    pub fn new(center: (f64, f64), duration_minutes: u32) -> Self {
        Self {
            center,
            zoom: DEFAULT_ZOOM,
            duration_minutes,
            layers: Vec::new(),
        }
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers.iter().filter(|l| l.kind == kind).count()
    }
}

/// Mean position of all companies, then of all projects, else the origin.
pub fn map_center(state: &AppState) -> (f64, f64) {
    fn mean(points: &[(f64, f64)]) -> Option<(f64, f64)> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lat, lon) = points
            .iter()
            .fold((0.0, 0.0), |(a, b), (lat, lon)| (a + lat, b + lon));
        Some((lat / n, lon / n))
    }

    let companies: Vec<_> = state
        .companies()
        .iter()
        .map(|c| (c.latitude, c.longitude))
        .collect();
    let projects: Vec<_> = state
        .projects()
        .iter()
        .map(|p| (p.latitude, p.longitude))
        .collect();

    mean(&companies)
        .or_else(|| mean(&projects))
        .unwrap_or((0.0, 0.0))
}

/// Retrieves an isochrone for every visible project, then every visible
/// company, and stacks them in that order. The first failure aborts the pass.
pub async fn compose_map<S: IsochroneSource>(
    state: &AppState,
    colors: &ColorAssignment,
    retriever: &mut IsochroneRetriever<S>,
    progress: Option<ComposeProgress<'_>>,
) -> Result<MapDocument, RetrievalError> {
    let minutes = state.duration_minutes();
    let seconds = state.duration_seconds();
    let mut map = MapDocument::new(map_center(state), minutes);

    let projects: Vec<_> = state.visible_projects().collect();
    let companies: Vec<_> = state.visible_companies().collect();
    let total = projects.len() + companies.len();
    let mut position = 0;

    for site in projects {
        position += 1;
        if let Some(report) = progress {
            report(position, total, &site.name);
        }

        let isochrone = retriever
            .retrieve(site.longitude, site.latitude, seconds)
            .await?;

        map.layers.push(MapLayer {
            kind: LayerKind::Project,
            name: Some(format!("{} ({}-min radius)", site.name, minutes)),
            isochrone,
            style: PolygonStyle {
                color: PROJECT_COLOR.to_string(),
                fill_color: PROJECT_COLOR.to_string(),
                weight: OUTLINE_WEIGHT,
                fill_opacity: PROJECT_FILL_OPACITY,
            },
            marker: Marker {
                latitude: site.latitude,
                longitude: site.longitude,
                popup: site.name.clone(),
                icon: MarkerIcon::Star,
                color: "red".to_string(),
                icon_color: "white".to_string(),
            },
        });
    }

    for company in companies {
        position += 1;
        if let Some(report) = progress {
            report(position, total, &company.location);
        }

        let isochrone = retriever
            .retrieve(company.longitude, company.latitude, seconds)
            .await?;
        let color = colors.get(&company.group).unwrap_or(TAB20[0]).to_string();

        map.layers.push(MapLayer {
            kind: LayerKind::Company,
            name: None,
            isochrone,
            style: PolygonStyle {
                color: color.clone(),
                fill_color: color.clone(),
                weight: OUTLINE_WEIGHT,
                fill_opacity: COMPANY_FILL_OPACITY,
            },
            marker: Marker {
                latitude: company.latitude,
                longitude: company.longitude,
                popup: company.location.clone(),
                icon: MarkerIcon::Info,
                color: "black".to_string(),
                icon_color: color,
            },
        });
    }

    debug!("Composed map with {} layers", map.layers.len());
    Ok(map)
}
