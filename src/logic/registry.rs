use crate::error::{Result, SwellCheckError};
use crate::models::BeachProfile;
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../config/beaches.yaml");

/// Read-only catalog of beach profiles keyed by location id.
#[derive(Debug, Clone)]
pub struct BeachRegistry {
    beaches: BTreeMap<u32, BeachProfile>,
}

impl BeachRegistry {
    /// Catalog shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Load from `path`, or the built-in catalog when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let yaml = std::fs::read_to_string(p).map_err(|e| {
                    SwellCheckError::Config(format!("Failed to read beach catalog {:?}: {}", p, e))
                })?;
                Self::from_yaml(&yaml)
            }
            None => Self::builtin(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let profiles: Vec<BeachProfile> = serde_yaml::from_str(yaml)?;
        Self::from_profiles(profiles)
    }

    pub fn from_profiles(profiles: Vec<BeachProfile>) -> Result<Self> {
        let mut beaches = BTreeMap::new();
        for profile in profiles {
            let report = profile.coverage();
            if !report.is_clean() {
                tracing::warn!(
                    beach = profile.id,
                    gaps = report.gaps.len(),
                    overlaps = report.overlaps.len(),
                    "Onshore range of {} disagrees with offshore/cross-shore ranges",
                    profile.name
                );
            }

            let id = profile.id;
            if beaches.insert(id, profile).is_some() {
                return Err(SwellCheckError::InvalidData(format!(
                    "duplicate beach id {} in catalog",
                    id
                )));
            }
        }

        tracing::debug!("Loaded {} beach profiles", beaches.len());
        Ok(Self { beaches })
    }

    pub fn get(&self, id: u32) -> Option<&BeachProfile> {
        self.beaches.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeachProfile> {
        self.beaches.values()
    }

    pub fn len(&self) -> usize {
        self.beaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beaches.is_empty()
    }
}
