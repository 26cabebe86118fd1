use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BACKEND_URL_ENV: &str = "FOLLOWIQ_BACKEND_URL";
const ANON_KEY_ENV: &str = "FOLLOWIQ_ANON_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (session file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Hosted backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. "https://xyz.example.co"
    #[serde(default)]
    pub url: Option<String>,
    /// Public (anon) API key sent as `apikey`
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Where the OAuth provider sends the browser back to
    #[serde(default = "default_oauth_redirect")]
    pub oauth_redirect_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            request_timeout_secs: default_timeout(),
            oauth_redirect_url: default_oauth_redirect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Accounts allowed to read and triage contact submissions
    #[serde(default)]
    pub emails: Vec<String>,
}

impl AdminConfig {
    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

/// Named easing curves shared by every animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the end value
    None,
    Linear,
    /// 1 - (1-t)^3
    #[default]
    Cubic,
    /// 1 - (1-t)^5
    Quintic,
    /// 1 - 2^(-10t)
    EaseOut,
    /// Symmetric cubic in-out
    EaseInOut,
    /// cubic-bezier(0.22, 1, 0.36, 1)
    Smooth,
    /// cubic-bezier(0.25, 0.1, 0.25, 1)
    Anticipate,
}

/// Animation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Disable all transitions (reduced motion)
    #[serde(default)]
    pub reduced_motion: bool,
    /// Default easing curve
    #[serde(default)]
    pub easing: EasingType,
    /// Default reveal duration in milliseconds
    #[serde(default = "default_reveal_duration")]
    pub reveal_duration_ms: u64,
    /// Default reveal travel distance in pixels
    #[serde(default = "default_reveal_distance")]
    pub reveal_distance_px: f64,
    /// Frames per second for driven animations
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Base stagger step between siblings in milliseconds
    #[serde(default = "default_stagger_step")]
    pub stagger_step_ms: u64,
    /// Geometric decay applied to stagger steps (1.0 = linear)
    #[serde(default = "default_stagger_decay")]
    pub stagger_decay: f64,
    /// Spring preset for scroll smoothing: gentle, snappy, smooth, bouncy
    #[serde(default = "default_spring_preset")]
    pub spring_preset: String,
    /// Statistic counter duration in milliseconds
    #[serde(default = "default_counter_duration")]
    pub counter_duration_ms: u64,
    /// Delay between typed characters in milliseconds
    #[serde(default = "default_typewriter_tick")]
    pub typewriter_tick_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            easing: EasingType::default(),
            reveal_duration_ms: default_reveal_duration(),
            reveal_distance_px: default_reveal_distance(),
            fps: default_fps(),
            stagger_step_ms: default_stagger_step(),
            stagger_decay: default_stagger_decay(),
            spring_preset: default_spring_preset(),
            counter_duration_ms: default_counter_duration(),
            typewriter_tick_ms: default_typewriter_tick(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("followiq")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_oauth_redirect() -> String {
    "http://localhost:5173/account".to_string()
}

fn default_reveal_duration() -> u64 {
    600
}

fn default_reveal_distance() -> f64 {
    40.0
}

fn default_fps() -> u32 {
    60
}

fn default_stagger_step() -> u64 {
    100
}

fn default_stagger_decay() -> f64 {
    0.85
}

fn default_spring_preset() -> String {
    "smooth".to_string()
}

fn default_counter_duration() -> u64 {
    2000
}

fn default_typewriter_tick() -> u64 {
    30
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults, then apply env overrides
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.url = Some(url);
            }
        }
        if let Ok(key) = std::env::var(ANON_KEY_ENV) {
            if !key.trim().is_empty() {
                self.backend.anon_key = Some(key);
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Always uses ~/.config/followiq/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("followiq")
            .join("config.toml")
    }

    /// Get the persisted session file path
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    /// State file of the `--offline` backend and its session
    pub fn offline_backend_path(&self) -> PathBuf {
        self.data_dir().join("offline.json")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.motion.easing, EasingType::Cubic);
        assert_eq!(config.motion.counter_duration_ms, 2000);
        assert!((config.motion.stagger_decay - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [backend]
            url = "https://demo.example.co"

            [motion]
            easing = "ease_in_out"
            fps = 30

            [admin]
            emails = ["Ops@FollowIQ.io"]
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url.as_deref(), Some("https://demo.example.co"));
        assert!(config.backend.anon_key.is_none());
        assert_eq!(config.motion.easing, EasingType::EaseInOut);
        assert_eq!(config.motion.fps, 30);
        assert_eq!(config.motion.reveal_duration_ms, 600);
        assert!(config.admin.is_admin("ops@followiq.io"));
        assert!(!config.admin.is_admin("someone@else.io"));
    }

    #[test]
    fn test_unknown_easing_is_rejected() {
        let err = AppConfig::from_toml("[motion]\neasing = \"wobbly\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_expand_tilde() {
        let plain = expand_tilde(std::path::Path::new("/var/lib/followiq"));
        assert_eq!(plain, PathBuf::from("/var/lib/followiq"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(std::path::Path::new("~/x")), home.join("x"));
        }
    }
}
