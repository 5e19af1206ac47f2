use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL_CANDIDATES: [&str; 2] =
    ["gemini-3-pro-image-preview", "gemini-2.5-flash-image"];
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after every failed plan attempt.
    pub plan_pause: Duration,
    /// Pause after every unit, whatever its outcome.
    pub unit_pause: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub model_candidates: Vec<String>,
    pub default_jpeg_quality: u8,
    pub catalog_path: Option<String>,
    pub gemini: GeminiConfig,
    pub pacing: PacingConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let base_url = env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        GeminiConfig {
            api_key,
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            plan_pause: Duration::from_millis(120),
            unit_pause: Duration::from_millis(150),
        }
    }
}

impl PacingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let millis = |key: &str| env::var(key).ok().and_then(|s| s.parse::<u64>().ok());

        PacingConfig {
            plan_pause: millis("PLAN_PAUSE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.plan_pause),
            unit_pause: millis("UNIT_PAUSE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.unit_pause),
        }
    }

    pub fn none() -> Self {
        PacingConfig {
            plan_pause: Duration::ZERO,
            unit_pause: Duration::ZERO,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: 25 * 1024 * 1024,
            model_candidates: DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            default_jpeg_quality: DEFAULT_JPEG_QUALITY,
            catalog_path: None,
            gemini: GeminiConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let max_upload_bytes = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|mb| mb.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);
        let model_candidates = env::var("MODEL_CANDIDATES")
            .ok()
            .map(|raw| parse_candidates(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.model_candidates);
        let default_jpeg_quality = env::var("DEFAULT_JPEG_QUALITY")
            .ok()
            .and_then(|q| q.parse::<i64>().ok())
            .map(|q| q.clamp(1, 100) as u8)
            .unwrap_or(defaults.default_jpeg_quality);
        let catalog_path = env::var("PROMPT_CATALOG_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty());

        Config {
            host,
            port,
            max_upload_bytes,
            model_candidates,
            default_jpeg_quality,
            catalog_path,
            gemini: GeminiConfig::from_env(),
            pacing: PacingConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_model_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_list_parsing_drops_blanks() {
        assert_eq!(
            parse_candidates(" a ,, b,"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(parse_candidates(" , ").is_empty());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_jpeg_quality, 85);
        assert_eq!(config.model_candidates[0], "gemini-3-pro-image-preview");
        assert_eq!(config.pacing.plan_pause, Duration::from_millis(120));
        assert_eq!(config.pacing.unit_pause, Duration::from_millis(150));
        assert!(config.gemini.api_key.is_none());
    }
}
