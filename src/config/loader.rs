//! Configuration loader for YAML files
//!
//! This module handles loading and validating resolver configuration from
//! YAML files. Any field left out of the file keeps its built-in default.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AppError, Result};

use super::types::ResolverConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Validates the configuration rules
///
/// # Returns
/// * `Ok(ResolverConfig)` - Successfully loaded and validated configuration
/// * `Err(AppError)` - File not found, parse error, or validation failure
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use endpoint_resolver::config::load_config;
///
/// let config = load_config(Path::new("resolver.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<ResolverConfig> {
    // Check file exists
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Open file
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    // Parse YAML
    let config: ResolverConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    // Validate configuration rules
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        domains = config.domain_app_ids.len(),
        "Resolver configuration loaded"
    );

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml_content: &str) -> Result<ResolverConfig> {
    let config: ResolverConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================
