use serde::{Deserialize, Serialize};

/// One row of the "Companies" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Identifier of this site ("Company Location").
    pub location: String,
    /// Owning company ("Company Name"); drives the legend color.
    pub group: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the "Projects" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSite {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub visible: bool,
}

impl ProjectSite {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            visible: true,
        }
    }
}

/// Everything read from one input file, in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub companies: Vec<CompanyRecord>,
    pub projects: Vec<ProjectSite>,
}
