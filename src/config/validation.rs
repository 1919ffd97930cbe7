use super::models::Config;
use axum::http::HeaderValue;
use thiserror::Error;

/// Smallest password able to hold one character of each required class
const PASSWORD_CLASSES: usize = 4;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("max_payload_bytes must be positive")]
    ZeroPayloadLimit,

    #[error("CORS origin '{origin}' is not a valid header value")]
    InvalidCorsOrigin { origin: String },

    #[error("password_min_chars ({min}) exceeds password_max_chars ({max})")]
    InvertedPasswordBounds { min: usize, max: usize },

    #[error("password_max_chars ({max}) cannot fit one character of each required class")]
    PasswordTooShort { max: usize },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_cors(config)?;
    validate_limits(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.api.max_payload_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroPayloadLimit);
    }
    Ok(())
}

fn validate_cors(config: &Config) -> Result<(), ValidationError> {
    for origin in &config.cors.allowed_origins {
        if HeaderValue::from_str(origin).is_err() {
            return Err(ValidationError::InvalidCorsOrigin {
                origin: origin.clone(),
            });
        }
    }
    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    let limits = &config.validation;

    if limits.password_min_chars > limits.password_max_chars {
        return Err(ValidationError::InvertedPasswordBounds {
            min: limits.password_min_chars,
            max: limits.password_max_chars,
        });
    }

    if limits.password_max_chars < PASSWORD_CLASSES {
        return Err(ValidationError::PasswordTooShort {
            max: limits.password_max_chars,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_payload_limit() {
        let mut config = Config::default();
        config.server.api.max_payload_bytes = ByteSize(0);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroPayloadLimit)
        ));
    }

    #[test]
    fn test_invalid_cors_origin() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["http://ok.example".into(), "bad\norigin".into()];
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidCorsOrigin { .. })
        ));
    }

    #[test]
    fn test_password_bounds() {
        let mut config = Config::default();
        config.validation.password_min_chars = 30;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvertedPasswordBounds { min: 30, max: 20 })
        ));

        config.validation.password_min_chars = 1;
        config.validation.password_max_chars = 3;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::PasswordTooShort { max: 3 })
        ));
    }
}
