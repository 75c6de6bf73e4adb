use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// The base URL of the accrual authority, e.g. `http://localhost:8081`
    pub base_url: String,
    /// Upper bound on a single authority query, including reading the body.
    pub request_timeout: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self { base_url: String::default(), request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }
}

impl AccrualConfig {
    /// Trailing slashes are dropped, and `http://` is assumed if no scheme is given.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let base_url = if base_url.is_empty() || base_url.contains("://") {
            base_url
        } else {
            format!("http://{base_url}")
        };
        Self { base_url, ..Default::default() }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = AccrualConfig::new(" http://localhost:8081// ");
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn scheme_defaults_to_http() {
        assert_eq!(AccrualConfig::new("localhost:8081").base_url, "http://localhost:8081");
        assert_eq!(AccrualConfig::new("https://accrual.example").base_url, "https://accrual.example");
        assert_eq!(AccrualConfig::new("").base_url, "");
    }
}
