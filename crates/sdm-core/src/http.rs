//! Shared curl settings for the probe and section fetchers.

use std::time::Duration;

/// Read-only request settings. Built once per run and shared (via `Arc`) by
/// every section fetcher; each request still gets its own curl handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub timeout: Duration,
}

impl HttpOptions {
    /// Configure a handle for `url`: redirects, User-Agent and timeouts.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Abort stalled transfers on throughput rather than on wall-clock alone.
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        Ok(())
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        crate::config::SdmConfig::default().http_options()
    }
}
