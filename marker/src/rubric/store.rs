//! # Rubric Store
//!
//! An immutable, in-memory mapping from essay prompt title to [`Rubric`].
//!
//! The store is built once at startup, either from the rubrics bundled with the crate
//! ([`RubricStore::builtin`]) or from a JSON file ([`RubricStore::from_path`]). Every
//! definition is validated while loading, so a bad rubric stops the process before any
//! request is served. There are no update or delete operations; rubric changes ship
//! with a redeploy.

use super::Rubric;
use super::definition::RubricDefinition;
use crate::error::{MarkerError, RubricError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use util::config;

const BUILTIN_RUBRICS: &str = include_str!("../../assets/rubrics.json");

/// Read-only rubric lookup table. Titles keep their declaration order.
#[derive(Debug, Clone, Default)]
pub struct RubricStore {
    rubrics: Vec<Rubric>,
    index: HashMap<String, usize>,
}

impl RubricStore {
    /// Builds a store from already-constructed rubrics, validating each one.
    pub fn new(rubrics: Vec<Rubric>) -> Result<Self, RubricError> {
        let mut index = HashMap::with_capacity(rubrics.len());
        for (i, rubric) in rubrics.iter().enumerate() {
            rubric.validate()?;
            if index.insert(rubric.title.clone(), i).is_some() {
                return Err(RubricError::config(&rubric.title, "duplicate rubric title"));
            }
        }
        Ok(Self { rubrics, index })
    }

    /// The rubrics bundled with the crate.
    pub fn builtin() -> Result<Self, RubricError> {
        Self::from_json(BUILTIN_RUBRICS)
    }

    /// Parses a JSON array of rubric definitions.
    pub fn from_json(raw: &str) -> Result<Self, RubricError> {
        let defs: Vec<RubricDefinition> = serde_json::from_str(raw)
            .map_err(|e| RubricError::config("<rubric file>", format!("invalid JSON: {e}")))?;
        let rubrics = defs
            .into_iter()
            .map(Rubric::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rubrics)
    }

    pub fn from_path(path: &Path) -> Result<Self, MarkerError> {
        debug!("Loading rubrics from {}", path.display());
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_json(&raw)?)
    }

    /// Loads the configured rubric file (`RUBRIC_PATH`), or the bundled rubrics when unset.
    pub fn load() -> Result<Self, MarkerError> {
        let store = match config::rubric_path() {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::builtin()?,
        };
        info!("Loaded {} rubric(s)", store.len());
        Ok(store)
    }

    /// Resolves a rubric by title.
    pub fn lookup(&self, title: &str) -> Result<&Rubric, RubricError> {
        self.get(title)
            .ok_or_else(|| RubricError::NotFound(title.to_string()))
    }

    pub fn get(&self, title: &str) -> Option<&Rubric> {
        self.index.get(title).map(|&i| &self.rubrics[i])
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.rubrics.iter().map(|r| r.title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rubric> {
        self.rubrics.iter()
    }

    pub fn len(&self) -> usize {
        self.rubrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rubrics.is_empty()
    }
}
