use crate::utils::error::{Result, VerifyError};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// A directory path that is non-empty and not already taken by a regular file.
pub fn validate_dir_path(field_name: &str, path: &Path) -> Result<()> {
    let as_str = path.to_string_lossy();

    if as_str.is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: as_str.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if as_str.contains('\0') {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: as_str.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    if path.exists() && !path.is_dir() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: as_str.to_string(),
            reason: "Path exists but is not a directory".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
