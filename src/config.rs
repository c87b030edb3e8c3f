use crate::{
    error::{GenieError, Result},
    logger::{LogLevel, LoggerConfig},
};
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_BEDROCK_TEXT_MODEL: &str = "amazon.titan-text-express-v1";
pub const DEFAULT_BEDROCK_IMAGE_MODEL: &str = "amazon.titan-image-generator-v1";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Gemini,
    Bedrock,
}

impl Backend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Backend::Gemini),
            "bedrock" | "aws" => Some(Backend::Bedrock),
            _ => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => write!(f, "gemini"),
            Backend::Bedrock => write!(f, "bedrock"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: DEFAULT_GEMINI_TEXT_MODEL.to_string(),
            image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        GeminiConfig {
            api_key: lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            text_model: lookup("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: lookup("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
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

    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
            text_model: DEFAULT_BEDROCK_TEXT_MODEL.to_string(),
            image_model: DEFAULT_BEDROCK_IMAGE_MODEL.to_string(),
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        BedrockConfig {
            region: lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")),
            access_key: lookup("AWS_ACCESS_KEY_ID"),
            secret_key: lookup("AWS_SECRET_ACCESS_KEY"),
            text_model: lookup("BEDROCK_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: lookup("BEDROCK_IMAGE_MODEL").unwrap_or(defaults.image_model),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn region_or_default(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub gemini: GeminiConfig,
    pub bedrock: BedrockConfig,
    pub output_dir: PathBuf,
    pub log_level: LogLevel,
    pub log_json: bool,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Gemini,
            gemini: GeminiConfig::default(),
            bedrock: BedrockConfig::default(),
            output_dir: PathBuf::from("."),
            log_level: LogLevel::Info,
            log_json: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("GENIE_BACKEND") {
            Some(value) => Backend::parse(&value).ok_or_else(|| {
                GenieError::Config(format!(
                    "Unknown backend '{}', expected 'gemini' or 'bedrock'",
                    value
                ))
            })?,
            None => Backend::Gemini,
        };

        let log_level = match lookup("GENIE_LOG_LEVEL") {
            Some(value) => LogLevel::parse(&value).ok_or_else(|| {
                GenieError::Config(format!("Unknown log level '{}'", value))
            })?,
            None => LogLevel::Info,
        };

        let log_json = lookup("GENIE_LOG_JSON").map_or(false, |val| val == "true" || val == "1");

        Ok(Config {
            backend,
            gemini: GeminiConfig::from_lookup(&lookup),
            bedrock: BedrockConfig::from_lookup(&lookup),
            output_dir: lookup("GENIE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_level,
            log_json,
            log_file: lookup("GENIE_LOG_FILE").filter(|path| !path.trim().is_empty()),
        })
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self.backend = Backend::Gemini;
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self.backend = Backend::Bedrock;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn logger_config(&self) -> LoggerConfig {
        let mut config = LoggerConfig::new()
            .with_level(self.log_level)
            .with_file_location(self.log_level <= LogLevel::Debug);
        if self.log_json {
            config = config.with_json_output(true).with_colors(false);
        }
        if let Some(path) = &self.log_file {
            config = config.with_file_output(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_gemini_with_standard_models() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, Backend::Gemini);
        assert_eq!(config.gemini.text_model, DEFAULT_GEMINI_TEXT_MODEL);
        assert_eq!(config.gemini.image_model, DEFAULT_GEMINI_IMAGE_MODEL);
        assert_eq!(config.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn api_key_falls_back_to_plain_variable() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "abc")])).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("abc"));

        let config = Config::from_lookup(lookup_from(&[
            ("API_KEY", "abc"),
            ("GEMINI_API_KEY", "xyz"),
        ]))
        .unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("xyz"));
    }

    #[test]
    fn reads_bedrock_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("GENIE_BACKEND", "Bedrock"),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("BEDROCK_IMAGE_MODEL", "amazon.titan-image-generator-v2:0"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Bedrock);
        assert_eq!(config.bedrock.region_or_default(), "eu-west-1");
        assert_eq!(config.bedrock.text_model, DEFAULT_BEDROCK_TEXT_MODEL);
        assert_eq!(config.bedrock.image_model, "amazon.titan-image-generator-v2:0");
    }

    #[test]
    fn rejects_unknown_backend_and_level() {
        let err = Config::from_lookup(lookup_from(&[("GENIE_BACKEND", "dalle")])).unwrap_err();
        assert!(matches!(err, GenieError::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("GENIE_LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(err, GenieError::Config(_)));
    }

    #[test]
    fn logger_config_follows_flags() {
        let config = Config::from_lookup(lookup_from(&[
            ("GENIE_LOG_LEVEL", "debug"),
            ("GENIE_LOG_JSON", "true"),
            ("GENIE_LOG_FILE", "genie.log"),
        ]))
        .unwrap();
        let logger = config.logger_config();
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert!(logger.show_file_location);
        assert!(logger.output_json);
        assert!(!logger.show_colors);
        assert!(logger.log_to_file);
        assert_eq!(logger.log_file_path, "genie.log");
    }

    #[test]
    fn info_logging_hides_source_locations() {
        let logger = Config::new().logger_config();
        assert_eq!(logger.min_level, LogLevel::Info);
        assert!(!logger.show_file_location);
        assert!(logger.show_colors);
    }

    #[test]
    fn builders_switch_backend() {
        let config = Config::new().with_bedrock(BedrockConfig::new().with_region("us-west-2"));
        assert_eq!(config.backend, Backend::Bedrock);
        assert_eq!(config.bedrock.region.as_deref(), Some("us-west-2"));

        let config = config.with_gemini(GeminiConfig::new().with_api_key("k"));
        assert_eq!(config.backend, Backend::Gemini);
    }
}
