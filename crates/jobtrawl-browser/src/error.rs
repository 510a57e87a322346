use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script failed: {0}")]
    ScriptError(String),
}

impl BrowserError {
    /// Whether retrying the same operation could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NavigationError(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("net::ERR_CONNECTION_RESET".to_string());
        assert_eq!(
            err.to_string(),
            "navigation failed: net::ERR_CONNECTION_RESET"
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(BrowserError::Timeout(".ipt-search".to_string()).is_transient());
        assert!(BrowserError::NavigationError("net::ERR_TIMED_OUT".to_string()).is_transient());
        assert!(!BrowserError::ScriptError("undefined".to_string()).is_transient());
        assert!(!BrowserError::ChromiumError("target crashed".to_string()).is_transient());
    }
}
