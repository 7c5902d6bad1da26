use crate::error::{Result, SwellCheckError};
use chrono::FixedOffset;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub willyweather: WillyWeatherConfig,
    pub supabase: SupabaseConfig,
    pub resend: ResendConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    /// Beach catalog override; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beaches: Option<PathBuf>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WillyWeatherConfig {
    pub api_key: String,
    #[serde(default = "default_willyweather_url")]
    pub base_url: String,
}

fn default_willyweather_url() -> String {
    "https://api.willyweather.com.au/v2".into()
}

impl std::fmt::Debug for WillyWeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WillyWeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ResendConfig {
    pub api_key: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_resend_endpoint")]
    pub endpoint: String,
}

fn default_from() -> String {
    "alerts@swellcheck.com".into()
}

fn default_resend_endpoint() -> String {
    "https://api.resend.com/emails".into()
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("from", &self.from)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Offset of the surf timezone from UTC; 600 is AEST
    pub utc_offset_minutes: i32,
    pub timezone_label: String,
    pub poll_interval_minutes: u64,
    pub forecast_days: u32,
    pub horizon_hours: u32,
    pub lookahead_minutes: u32,
    pub http_timeout_secs: u64,
    pub account_url: String,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 600,
            timezone_label: "AEST".into(),
            poll_interval_minutes: 30,
            forecast_days: 1,
            horizon_hours: 24,
            lookahead_minutes: 120,
            http_timeout_secs: 20,
            account_url: "https://www.swellcheck.co/account".into(),
        }
    }
}

impl AlarmConfig {
    pub fn timezone(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                SwellCheckError::Config(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes * 60)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SwellCheckError::Config(format!(
                "Config file not found at {:?}. Run `swellcheck init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SwellCheckError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::debug!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| SwellCheckError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        require("willyweather.api_key", &self.willyweather.api_key)?;
        require("supabase.url", &self.supabase.url)?;
        require("supabase.key", &self.supabase.key)?;
        require("resend.api_key", &self.resend.api_key)?;

        if self.alarm.poll_interval_minutes == 0 {
            return Err(SwellCheckError::Config(
                "alarm.poll_interval_minutes must be at least 1".into(),
            ));
        }

        if self.alarm.utc_offset_minutes.unsigned_abs() > 14 * 60 {
            return Err(SwellCheckError::Config(format!(
                "alarm.utc_offset_minutes {} is outside ±14h",
                self.alarm.utc_offset_minutes
            )));
        }

        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("swellcheck").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/swellcheck/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SwellCheckError::Config("Cannot determine config directory".into()))?
            .join("swellcheck");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<PathBuf> {
        println!();
        println!("Let's set up SwellCheck!");
        println!("Answers may reference environment variables as ${{VAR}}.");
        println!();

        println!("WillyWeather");
        let ww_key: String = Password::new()
            .with_prompt("  API key")
            .interact()
            .map_err(input_error)?;

        println!();
        println!("Supabase");
        let sb_url: String = Input::new()
            .with_prompt("  Project URL")
            .default("${SUPABASE_URL}".into())
            .interact_text()
            .map_err(input_error)?;
        let sb_key: String = Password::new()
            .with_prompt("  Service key")
            .interact()
            .map_err(input_error)?;

        println!();
        println!("Resend");
        let resend_key: String = Password::new()
            .with_prompt("  API key")
            .interact()
            .map_err(input_error)?;
        let from: String = Input::new()
            .with_prompt("  From address")
            .default(default_from())
            .interact_text()
            .map_err(input_error)?;

        println!();
        println!("Alarm");
        let utc_offset_minutes: i32 = Input::new()
            .with_prompt("  UTC offset in minutes")
            .default(600)
            .interact_text()
            .map_err(input_error)?;
        let timezone_label: String = Input::new()
            .with_prompt("  Timezone label")
            .default("AEST".into())
            .interact_text()
            .map_err(input_error)?;

        println!();

        let config = Config {
            willyweather: WillyWeatherConfig {
                api_key: ww_key,
                base_url: default_willyweather_url(),
            },
            supabase: SupabaseConfig {
                url: sb_url,
                key: sb_key,
            },
            resend: ResendConfig {
                api_key: resend_key,
                from,
                endpoint: default_resend_endpoint(),
            },
            alarm: AlarmConfig {
                utc_offset_minutes,
                timezone_label,
                ..AlarmConfig::default()
            },
            beaches: None,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| SwellCheckError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# SwellCheck Configuration\n# Generated by `swellcheck init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok(config_path)
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| SwellCheckError::Config(format!("Bad substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() || value.starts_with("${") {
        return Err(SwellCheckError::Config(format!("{} is not set", field)));
    }
    Ok(())
}

fn input_error(e: dialoguer::Error) -> SwellCheckError {
    SwellCheckError::Config(format!("Input error: {}", e))
}
