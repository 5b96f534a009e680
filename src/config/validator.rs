//! Configuration validation

use super::*;
use crate::error::ReportError;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> std::result::Result<(), ReportError> {
    if config.regions == 0 {
        return Err(ReportError::InvalidArgument(
            "number of regions must be at least 1".to_string(),
        ));
    }
    if config.regions > i32::MAX as u32 {
        return Err(ReportError::InvalidArgument(format!(
            "number of regions too large: {}",
            config.regions
        )));
    }

    validate_worker(&config.worker)?;
    validate_collection(&config.collection)?;

    Ok(())
}

/// Validate worker configuration
pub fn validate_worker(worker: &WorkerConfig) -> std::result::Result<(), ReportError> {
    if worker.program.as_os_str().is_empty() {
        return Err(ReportError::InvalidArgument(
            "worker program must not be empty".to_string(),
        ));
    }
    if worker.data_file.as_os_str().is_empty() {
        return Err(ReportError::InvalidArgument(
            "data file must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate collection configuration
pub fn validate_collection(collection: &CollectionConfig) -> std::result::Result<(), ReportError> {
    if collection.timeout_ms == Some(0) {
        return Err(ReportError::InvalidArgument(
            "timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
