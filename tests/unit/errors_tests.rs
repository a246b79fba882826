/*!
 * Tests for error types
 */

use rpytl::errors::{AppError, DocumentError, ProviderError};

#[test]
fn test_provider_error_display_shouldNameKind() {
    assert_eq!(
        ProviderError::RateLimited("Google".to_string()).to_string(),
        "Rate limit exceeded: Google"
    );
    assert_eq!(
        ProviderError::Failed("timeout".to_string()).to_string(),
        "Translation failed: timeout"
    );
    assert!(ProviderError::Configuration("trans missing".to_string())
        .to_string()
        .starts_with("Configuration error"));
}

#[test]
fn test_provider_error_is_rate_limited_shouldOnlyMatchRateLimit() {
    assert!(ProviderError::RateLimited(String::new()).is_rate_limited());
    assert!(!ProviderError::Failed(String::new()).is_rate_limited());
}

#[test]
fn test_app_error_from_conversions_shouldWrapSources() {
    let provider: AppError = ProviderError::Failed("x".to_string()).into();
    assert!(matches!(provider, AppError::Provider(_)));

    let document: AppError = DocumentError::NotFound("a.rpy".to_string()).into();
    assert_eq!(document.to_string(), "Document error: Input file not found: a.rpy");

    let io: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert!(matches!(io, AppError::File(_)));

    let other: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(other, AppError::Unknown(_)));
}
