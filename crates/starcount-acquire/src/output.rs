use crate::error::PipelineError;
use starcount_model::Dataset;
use std::fs;
use std::path::Path;

/// Read and decode the input dataset.
pub fn read_dataset(path: &Path) -> Result<Dataset, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|source| PipelineError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_json(&contents).map_err(|source| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = dataset.len(), total = dataset.total, "Loaded dataset");
    Ok(dataset)
}

/// Encode the dataset as indented JSON and overwrite `path` with it.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<(), PipelineError> {
    let json = dataset.to_json_pretty().map_err(PipelineError::Encode)?;
    fs::write(path, &json).map_err(|source| PipelineError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = dataset.len(), bytes = json.len(), "Wrote dataset");
    Ok(())
}
