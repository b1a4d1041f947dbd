use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::catalog::standard_definitions;
use super::{AssessmentType, Category, Taxonomy, TaxonomyDefinition};
use crate::assessment::error::ConfigurationError;

/// Read-only lookup of validated taxonomies keyed by assessment type.
///
/// There is no way to mutate a registry once built, so scoring a given
/// (assessment type, response set) pair is reproducible for the registry's lifetime.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyRegistry {
    taxonomies: BTreeMap<AssessmentType, Arc<Taxonomy>>,
}

impl TaxonomyRegistry {
    /// Registry holding the built-in catalogue.
    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::from_definitions(standard_definitions())
    }

    pub fn from_definitions<I>(definitions: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = TaxonomyDefinition>,
    {
        let mut taxonomies = BTreeMap::new();
        for definition in definitions {
            let taxonomy = Taxonomy::new(definition)?;
            let key = taxonomy.assessment_type().clone();
            if taxonomies.contains_key(&key) {
                return Err(ConfigurationError::DuplicateAssessmentType(key));
            }
            taxonomies.insert(key, Arc::new(taxonomy));
        }

        Ok(Self { taxonomies })
    }

    /// Built-in catalogue, with definitions from `path` (a JSON array) replacing or extending it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let Some(path) = path else {
            return Self::standard();
        };

        let raw = std::fs::read_to_string(path).map_err(|source| {
            ConfigurationError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let overrides: Vec<TaxonomyDefinition> =
            serde_json::from_str(&raw).map_err(|source| ConfigurationError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let mut merged: BTreeMap<AssessmentType, TaxonomyDefinition> = standard_definitions()
            .into_iter()
            .map(|definition| (definition.assessment_type.clone(), definition))
            .collect();
        let mut seen = Vec::with_capacity(overrides.len());
        for definition in overrides {
            if seen.contains(&definition.assessment_type) {
                return Err(ConfigurationError::DuplicateAssessmentType(
                    definition.assessment_type,
                ));
            }
            seen.push(definition.assessment_type.clone());
            merged.insert(definition.assessment_type.clone(), definition);
        }

        let registry = Self::from_definitions(merged.into_values())?;
        info!(
            path = %path.display(),
            loaded = seen.len(),
            total = registry.len(),
            "merged taxonomy definitions"
        );
        Ok(registry)
    }

    pub fn get(&self, assessment_type: &str) -> Result<Arc<Taxonomy>, ConfigurationError> {
        let key = AssessmentType(assessment_type.trim().to_string());
        self.taxonomies
            .get(&key)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownAssessmentType(assessment_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.taxonomies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxonomies.is_empty()
    }

    pub fn assessment_types(&self) -> impl Iterator<Item = &AssessmentType> {
        self.taxonomies.keys()
    }

    pub fn catalogue(&self) -> Vec<TaxonomySummary> {
        self.taxonomies
            .values()
            .map(|taxonomy| TaxonomySummary {
                assessment_type: taxonomy.assessment_type().clone(),
                title: taxonomy.title().to_string(),
                categories: taxonomy.categories().to_vec(),
                question_count: taxonomy.question_count(),
            })
            .collect()
    }
}

/// Public listing entry for an assessment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomySummary {
    pub assessment_type: AssessmentType,
    pub title: String,
    pub categories: Vec<Category>,
    pub question_count: usize,
}
