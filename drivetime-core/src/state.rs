use crate::error::{ConfigError, StateError};
use crate::model::{CompanyRecord, Dataset, ProjectSite};
use crate::settings::validate_minutes;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Per-session application state: loaded records, visibility toggles and the
/// selected drive time. Every render pass reads all of it.
#[derive(Debug, Clone)]
pub struct AppState {
    companies: Vec<CompanyRecord>,
    projects: Vec<ProjectSite>,
    company_visibility: HashMap<String, bool>,
    duration_minutes: u32,
}

impl AppState {
    pub fn from_dataset(dataset: Dataset, duration_minutes: u32) -> Result<Self, ConfigError> {
        let mut state = Self {
            companies: Vec::new(),
            projects: Vec::new(),
            company_visibility: HashMap::new(),
            duration_minutes: validate_minutes(duration_minutes)?,
        };
        state.reload(dataset);
        Ok(state)
    }

    /// Takes in a newly loaded file. Company records are replaced; known
    /// identifiers keep their visibility and new ones start visible. Projects
    /// are never dropped, and a repeated project name updates the earlier entry.
    pub fn reload(&mut self, dataset: Dataset) {
        for company in &dataset.companies {
            self.company_visibility
                .entry(company.location.clone())
                .or_insert(true);
        }
        self.companies = dataset.companies;

        for site in dataset.projects {
            match self.projects.iter_mut().find(|p| p.name == site.name) {
                Some(existing) => {
                    if existing.latitude != site.latitude || existing.longitude != site.longitude {
                        warn!("Project '{}' moved to ({}, {})", site.name, site.latitude, site.longitude);
                    }
                    existing.latitude = site.latitude;
                    existing.longitude = site.longitude;
                }
                None => self.projects.push(site),
            }
        }

        debug!(
            "State holds {} companies and {} projects",
            self.companies.len(),
            self.projects.len()
        );
    }

    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    pub fn projects(&self) -> &[ProjectSite] {
        &self.projects
    }

    pub fn visible_projects(&self) -> impl Iterator<Item = &ProjectSite> {
        self.projects.iter().filter(|p| p.visible)
    }

    pub fn visible_companies(&self) -> impl Iterator<Item = &CompanyRecord> {
        self.companies
            .iter()
            .filter(|c| self.is_company_visible(&c.location))
    }

    pub fn is_company_visible(&self, location: &str) -> bool {
        self.company_visibility.get(location).copied().unwrap_or(false)
    }

    pub fn is_project_visible(&self, name: &str) -> Option<bool> {
        self.projects.iter().find(|p| p.name == name).map(|p| p.visible)
    }

    /// Flips a project's visibility and returns the new value.
    pub fn toggle_project(&mut self, name: &str) -> Result<bool, StateError> {
        let site = self.project_mut(name)?;
        site.visible = !site.visible;
        Ok(site.visible)
    }

    pub fn set_project_visible(&mut self, name: &str, visible: bool) -> Result<(), StateError> {
        self.project_mut(name)?.visible = visible;
        Ok(())
    }

    /// Flips a company location's visibility and returns the new value.
    pub fn toggle_company(&mut self, location: &str) -> Result<bool, StateError> {
        let flag = self.company_mut(location)?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn set_company_visible(&mut self, location: &str, visible: bool) -> Result<(), StateError> {
        *self.company_mut(location)? = visible;
        Ok(())
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes * 60
    }

    pub fn set_duration_minutes(&mut self, minutes: u32) -> Result<(), ConfigError> {
        self.duration_minutes = validate_minutes(minutes)?;
        Ok(())
    }

    fn project_mut(&mut self, name: &str) -> Result<&mut ProjectSite, StateError> {
        self.projects
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| StateError::UnknownProject(name.to_string()))
    }

    fn company_mut(&mut self, location: &str) -> Result<&mut bool, StateError> {
        self.company_visibility
            .get_mut(location)
            .ok_or_else(|| StateError::UnknownCompany(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset {
            companies: vec![
                CompanyRecord {
                    location: "Acme HQ".to_string(),
                    group: "Acme".to_string(),
                    latitude: 40.1,
                    longitude: -74.1,
                },
                CompanyRecord {
                    location: "Globex Depot".to_string(),
                    group: "Globex".to_string(),
                    latitude: 40.2,
                    longitude: -74.2,
                },
            ],
            projects: vec![
                ProjectSite::new("Bridge", 40.0, -74.0),
                ProjectSite::new("Tunnel", 40.3, -74.3),
            ],
        }
    }

    #[test]
    fn test_everything_starts_visible() {
        let state = AppState::from_dataset(dataset(), 10).unwrap();
        assert_eq!(state.visible_projects().count(), 2);
        assert_eq!(state.visible_companies().count(), 2);
        assert_eq!(state.duration_seconds(), 600);
    }

    #[test]
    fn test_toggle_project() {
        let mut state = AppState::from_dataset(dataset(), 10).unwrap();

        assert_eq!(state.toggle_project("Bridge"), Ok(false));
        let names: Vec<_> = state.visible_projects().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Tunnel"]);

        assert_eq!(state.toggle_project("Bridge"), Ok(true));
        assert_eq!(state.visible_projects().count(), 2);
    }

    #[test]
    fn test_unknown_identifiers_are_rejected() {
        let mut state = AppState::from_dataset(dataset(), 10).unwrap();
        assert_eq!(
            state.toggle_project("Dam"),
            Err(StateError::UnknownProject("Dam".to_string()))
        );
        assert_eq!(
            state.set_company_visible("Initech", false),
            Err(StateError::UnknownCompany("Initech".to_string()))
        );
    }

    #[test]
    fn test_hide_company() {
        let mut state = AppState::from_dataset(dataset(), 10).unwrap();
        state.set_company_visible("Acme HQ", false).unwrap();

        let visible: Vec<_> = state.visible_companies().map(|c| c.location.as_str()).collect();
        assert_eq!(visible, vec!["Globex Depot"]);
    }

    #[test]
    fn test_reload_keeps_flags_and_adds_new_entries() {
        let mut state = AppState::from_dataset(dataset(), 10).unwrap();
        state.set_project_visible("Tunnel", false).unwrap();
        state.set_company_visible("Globex Depot", false).unwrap();

        let mut next = dataset();
        next.projects = vec![ProjectSite::new("Dam", 41.0, -75.0)];
        next.companies.push(CompanyRecord {
            location: "Initech Lab".to_string(),
            group: "Initech".to_string(),
            latitude: 40.5,
            longitude: -74.5,
        });
        state.reload(next);

        assert_eq!(state.projects().len(), 3);
        assert_eq!(state.is_project_visible("Tunnel"), Some(false));
        assert_eq!(state.is_project_visible("Dam"), Some(true));
        assert!(!state.is_company_visible("Globex Depot"));
        assert!(state.is_company_visible("Initech Lab"));
    }

    #[test]
    fn test_duration_bounds() {
        assert!(AppState::from_dataset(dataset(), 0).is_err());
        let mut state = AppState::from_dataset(dataset(), 300).unwrap();
        assert!(state.set_duration_minutes(301).is_err());
        assert_eq!(state.duration_minutes(), 300);
        state.set_duration_minutes(15).unwrap();
        assert_eq!(state.duration_seconds(), 900);
    }
}
