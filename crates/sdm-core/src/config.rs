use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::HttpOptions;

/// Product-identifying `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Silly Download Manager v001";

/// Global configuration loaded from `~/.config/sdm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdmConfig {
    /// Default number of sections (and parallel connections) per download.
    pub sections: usize,
    /// `User-Agent` header value for HEAD and ranged GET requests.
    pub user_agent: String,
    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a request whose throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard wall-clock limit per request, in seconds.
    pub request_timeout_secs: u64,
    /// Require `206` with a matching `Content-Range` and an exact byte count per section.
    #[serde(default = "default_true")]
    pub verify_ranges: bool,
    /// Delete section artifacts after a successful merge.
    #[serde(default = "default_true")]
    pub cleanup_sections: bool,
    /// Directory for section artifacts; defaults to next to the target file.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SdmConfig {
    fn default() -> Self {
        Self {
            sections: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            request_timeout_secs: 3600,
            verify_ranges: true,
            cleanup_sections: true,
            work_dir: None,
        }
    }
}

impl SdmConfig {
    /// HTTP settings shared read-only by the probe and every section fetcher.
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
