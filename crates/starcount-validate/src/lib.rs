use anyhow::Result;
use starcount_model::{Dataset, STARS_UNKNOWN};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("entry {0} has an empty name")]
    EmptyName(usize),

    #[error("entry '{name}' has non-canonical URL '{url}'")]
    NonCanonicalUrl { name: String, url: String },

    #[error("entry '{name}' has invalid star count {stars}")]
    InvalidStars { name: String, stars: i64 },

    #[error("duplicate entry name: {0}")]
    DuplicateName(String),
}

/// Load an enriched dataset file and check it.
///
/// Fails if the file cannot be read or decoded, or if any check fails.
pub fn validate(file_path: &str, prefix: &str) -> Result<()> {
    let contents = std::fs::read_to_string(file_path)?;
    let dataset = Dataset::from_json(&contents)?;

    let errors = validate_dataset(&dataset, prefix);
    if !errors.is_empty() {
        anyhow::bail!("{} validation errors in {file_path}", errors.len());
    }

    tracing::info!(entries = dataset.len(), "Dataset is valid");
    Ok(())
}

/// Check an enriched dataset: every URL under `prefix`, every star count
/// a non-negative number or the sentinel, names present and unique.
pub fn validate_dataset(dataset: &Dataset, prefix: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_names = HashSet::new();

    for (index, entry) in dataset.results.iter().enumerate() {
        if entry.name.is_empty() {
            errors.push(ValidationError::EmptyName(index));
        } else if !seen_names.insert(entry.name.as_str()) {
            errors.push(ValidationError::DuplicateName(entry.name.clone()));
        }

        if !entry.url.starts_with(prefix) {
            errors.push(ValidationError::NonCanonicalUrl {
                name: entry.name.clone(),
                url: entry.url.clone(),
            });
        }

        if entry.stars < STARS_UNKNOWN {
            errors.push(ValidationError::InvalidStars {
                name: entry.name.clone(),
                stars: entry.stars,
            });
        }
    }

    let unknown = dataset.results.iter().filter(|e| !e.has_known_stars()).count();
    tracing::info!(
        entries = dataset.len(),
        unknown,
        total = dataset.total,
        "Star coverage"
    );

    for e in &errors {
        tracing::warn!("{e}");
    }

    errors
}
