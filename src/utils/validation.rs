use crate::utils::error::{Result, TriageError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TriageError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| TriageError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TriageError::InvalidConfigValueError {
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
    // NaN 的比較永遠為 false，取反後才會被擋下
    if !(value >= min && value <= max) {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if validate_range("latitude", latitude, -90.0, 90.0).is_err()
        || validate_range("longitude", longitude, -180.0, 180.0).is_err()
    {
        return Err(TriageError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("chat.local.base_url", "https://example.com").is_ok());
        assert!(validate_url("chat.local.base_url", "http://localhost:11434").is_ok());
        assert!(validate_url("chat.local.base_url", "").is_err());
        assert!(validate_url("chat.local.base_url", "invalid-url").is_err());
        assert!(validate_url("chat.local.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("search.max_doctors", 5, 1).is_ok());
        assert!(validate_positive_number("search.max_doctors", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("chat.temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range("chat.temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_range("chat.temperature", f64::NAN, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_validate_coordinate() {
        assert!(validate_coordinate(17.4, 78.4).is_ok());
        assert!(validate_coordinate(-90.0, 180.0).is_ok());
        assert!(matches!(
            validate_coordinate(91.0, 0.0),
            Err(TriageError::InvalidCoordinate { .. })
        ));
        assert!(validate_coordinate(0.0, -180.5).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("key".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("api_key", &present).unwrap(), "key");
        assert!(matches!(
            validate_required_field("api_key", &missing),
            Err(TriageError::MissingConfigError { .. })
        ));
    }
}
