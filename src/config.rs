//! API endpoint and credential configuration.

use crate::error::{Result, ScreenforgeError};

/// Base URL of the ModelScope inference API.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn/v1";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "MODELSCOPE_API_TOKEN";

/// Placeholder value shipped in example env files; treated as unconfigured.
pub const PLACEHOLDER_TOKEN: &str = "your_modelscope_api_token_here";

/// Resolves the API token from an explicit value or the environment.
///
/// Runs before any network call so a missing credential surfaces as a
/// configuration problem, not a confusing 401.
pub(crate) fn resolve_token(explicit: Option<String>) -> Result<String> {
    resolve_token_from(explicit, std::env::var(TOKEN_ENV).ok())
}

fn resolve_token_from(explicit: Option<String>, env: Option<String>) -> Result<String> {
    match explicit.or(env) {
        Some(token) if token == PLACEHOLDER_TOKEN => Err(ScreenforgeError::Config(
            "token is still the placeholder value".into(),
        )),
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ScreenforgeError::Config("no token provided".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_wins() {
        let token = resolve_token_from(Some("ms-abc".into()), Some("ms-env".into())).unwrap();
        assert_eq!(token, "ms-abc");
    }

    #[test]
    fn test_env_fallback() {
        let token = resolve_token_from(None, Some("ms-env".into())).unwrap();
        assert_eq!(token, "ms-env");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = resolve_token_from(None, None).unwrap_err();
        assert!(matches!(err, ScreenforgeError::Config(_)));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = resolve_token_from(Some(PLACEHOLDER_TOKEN.into()), None).unwrap_err();
        assert!(matches!(err, ScreenforgeError::Config(_)));

        let err = resolve_token_from(None, Some(PLACEHOLDER_TOKEN.into())).unwrap_err();
        assert!(matches!(err, ScreenforgeError::Config(_)));
    }

    #[test]
    fn test_blank_token_rejected() {
        let err = resolve_token_from(Some("   ".into()), None).unwrap_err();
        assert!(matches!(err, ScreenforgeError::Config(_)));
    }
}
