use crate::mapping::DEFAULT_TYPE_KEY;
use crate::query::ScanConsistency;
use std::time::Duration;

/// Client configuration
///
/// Built once at startup and handed to [`DocumentClient`](crate::DocumentClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Cluster host
    pub host: String,

    /// Cluster port
    pub port: u16,

    /// Bucket queries run against
    pub bucket: String,

    /// Scan consistency for queries that don't set one
    pub default_consistency: ScanConsistency,

    /// Query timeout
    pub query_timeout: Option<Duration>,

    /// Attribute recording the entity type of each document
    pub type_key: String,
}

impl ClientConfig {
    pub fn new(bucket: &str) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11210,
            bucket: bucket.to_string(),
            default_consistency: ScanConsistency::NotBounded,
            query_timeout: None,
            type_key: DEFAULT_TYPE_KEY.to_string(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn default_consistency(mut self, consistency: ScanConsistency) -> Self {
        self.default_consistency = consistency;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn type_key(mut self, key: &str) -> Self {
        self.type_key = key.to_string();
        self
    }

    /// Parse from connection string
    ///
    /// Format: `couchodm://host[:port]/bucket[?consistency=request_plus&query_timeout_ms=500]`
    ///
    /// ```ignore
    /// let config = ClientConfig::from_url("couchodm://db.local/travel?consistency=request_plus")?;
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix("couchodm://")
            .ok_or_else(|| "URL must start with 'couchodm://'".to_string())?;

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };

        let (host_port, bucket) = location
            .split_once('/')
            .ok_or_else(|| "Invalid host/bucket format".to_string())?;

        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => (host, port.parse().map_err(|_| "Invalid port".to_string())?),
            None => (host_port, 11210),
        };

        let mut config = Self::new(bucket).host(host).port(port);

        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid option '{}'", pair))?;
            match key {
                "consistency" => config.default_consistency = value.parse()?,
                "query_timeout_ms" => {
                    let millis: u64 = value
                        .parse()
                        .map_err(|_| format!("Invalid query_timeout_ms '{}'", value))?;
                    config.query_timeout = Some(Duration::from_millis(millis));
                }
                "type_key" => config.type_key = value.to_string(),
                other => return Err(format!("Unknown option '{}'", other)),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Convert to connection string
    pub fn to_url(&self) -> String {
        let mut url = format!(
            "couchodm://{}:{}/{}?consistency={}",
            self.host, self.port, self.bucket, self.default_consistency
        );
        if let Some(timeout) = self.query_timeout {
            url.push_str(&format!("&query_timeout_ms={}", timeout.as_millis()));
        }
        if self.type_key != DEFAULT_TYPE_KEY {
            url.push_str(&format!("&type_key={}", self.type_key));
        }
        url
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("Bucket cannot be empty".to_string());
        }

        if self.host.is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if self.type_key.is_empty() {
            return Err("type_key cannot be empty".to_string());
        }

        if self.query_timeout == Some(Duration::ZERO) {
            return Err("query_timeout must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.bucket, "default");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.default_consistency, ScanConsistency::NotBounded);
        assert_eq!(config.type_key, "_class");
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new("travel")
            .host("example.com")
            .port(8091)
            .default_consistency(ScanConsistency::RequestPlus)
            .query_timeout(Duration::from_secs(2));

        assert_eq!(config.host, "example.com");
        assert_eq!(config.port, 8091);
        assert_eq!(config.default_consistency, ScanConsistency::RequestPlus);
        assert_eq!(config.query_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_from_url() {
        let config = ClientConfig::from_url(
            "couchodm://db.example.com:8091/travel?consistency=request_plus&query_timeout_ms=250",
        )
        .unwrap();

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.port, 8091);
        assert_eq!(config.bucket, "travel");
        assert_eq!(config.default_consistency, ScanConsistency::RequestPlus);
        assert_eq!(config.query_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_from_url_defaults() {
        let config = ClientConfig::from_url("couchodm://localhost/beers").unwrap();
        assert_eq!(config.port, 11210);
        assert_eq!(config.default_consistency, ScanConsistency::NotBounded);
    }

    #[test]
    fn test_invalid_url() {
        assert!(ClientConfig::from_url("invalid://url").is_err());
        assert!(ClientConfig::from_url("couchodm://nobucket").is_err());
        assert!(ClientConfig::from_url("couchodm://h/b?consistency=eventual").is_err());
        assert!(ClientConfig::from_url("couchodm://h/b?retries=3").is_err());
        assert!(ClientConfig::from_url("couchodm://h/").is_err());
    }

    #[test]
    fn test_url_round_trip() {
        let config = ClientConfig::new("travel")
            .default_consistency(ScanConsistency::RequestPlus)
            .query_timeout(Duration::from_millis(100));
        let parsed = ClientConfig::from_url(&config.to_url()).unwrap();
        assert_eq!(parsed.bucket, "travel");
        assert_eq!(parsed.default_consistency, ScanConsistency::RequestPlus);
        assert_eq!(parsed.query_timeout, Some(Duration::from_millis(100)));
        assert_eq!(parsed.type_key, DEFAULT_TYPE_KEY);
        assert!(!config.to_url().contains("type_key"));

        let custom = ClientConfig::new("b").type_key("type");
        let parsed = ClientConfig::from_url(&custom.to_url()).unwrap();
        assert_eq!(parsed.type_key, "type");
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new("b").validate().is_ok());
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("b").type_key("").validate().is_err());
        assert!(ClientConfig::new("b")
            .query_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
