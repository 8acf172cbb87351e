use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name of the output directory created next to the input file.
pub const OUTPUT_DIR_NAME: &str = "structured_candidate_data";

/// Environment variable holding the completion API key.
pub const API_KEY_VAR: &str = "OPEN_AI";

/// Fallback environment variable for the API key.
pub const API_KEY_FALLBACK_VAR: &str = "OPENAI_API_KEY";

/// Configuration for the cv-extract pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Path to the CV document (or a directory, which is reported as unsupported)
    pub input_path: PathBuf,

    /// Model identifier passed through to the completion API
    pub model: String,

    /// Output directory override; defaults to a `structured_candidate_data`
    /// directory next to the input file
    pub output_dir: Option<PathBuf>,

    /// Directory with prompt template overrides (`<category>.tera` files)
    pub template_dir: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible completion endpoint
    pub base_url: String,

    /// HTTP timeout per completion request
    pub timeout: Duration,

    /// API key for the completion endpoint.
    ///
    /// Absence is not an error here; it surfaces as an authentication
    /// failure from the remote call.
    pub api_key: Option<String>,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cv_extract::Config;
    ///
    /// let config = Config::builder()
    ///     .input_path("./alice.pdf")
    ///     .model("gpt-4o")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input path does not exist
    /// - The model identifier is empty
    /// - The endpoint URL or timeout is invalid
    /// - The template override directory does not exist
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Error::input(
                &self.input_path,
                "input path does not exist",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(Error::config("model identifier must not be empty"));
        }

        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url must not be empty"));
        }

        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than 0"));
        }

        if let Some(ref dir) = self.template_dir {
            if !dir.is_dir() {
                return Err(Error::config(format!(
                    "Template directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Returns the effective output directory.
    ///
    /// This is the `--out` override if given, otherwise
    /// `<parent-of-input>/structured_candidate_data`.
    #[must_use]
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.input_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(OUTPUT_DIR_NAME)
        })
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input_path: Option<PathBuf>,
    model: Option<String>,
    output_dir: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    api_key: Option<String>,
}

impl ConfigBuilder {
    /// Sets the input document path.
    #[must_use]
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Sets the model identifier (passed through uninterpreted).
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the output directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the directory with prompt template overrides.
    #[must_use]
    pub fn template_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(path.into());
        self
    }

    /// Sets the base URL of the completion endpoint.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the HTTP timeout per completion request, in seconds.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the API key explicitly, bypassing the environment lookup.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the configuration.
    ///
    /// When no API key was set explicitly, `OPEN_AI` is read from the
    /// environment, with `OPENAI_API_KEY` as a fallback. A missing key is
    /// not an error at this point.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let api_key = self.api_key.or_else(|| {
            std::env::var(API_KEY_VAR)
                .or_else(|_| std::env::var(API_KEY_FALLBACK_VAR))
                .ok()
        });

        let config = Config {
            input_path: self.input_path.unwrap_or_else(|| PathBuf::from(".")),
            model: self.model.unwrap_or_default(),
            output_dir: self.output_dir,
            template_dir: self.template_dir,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            api_key,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let config = Config::builder()
            .input_path(input.path())
            .model("gpt-4o")
            .build()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_missing_input_path() {
        let result = Config::builder()
            .input_path("/nonexistent/path/that/should/not/exist.pdf")
            .model("gpt-4o")
            .build();

        assert!(matches!(result, Err(ref e) if e.is_input()));
    }

    #[test]
    fn test_empty_model_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let result = Config::builder().input_path(input.path()).build();

        assert!(matches!(result, Err(ref e) if e.is_config()));
    }

    #[test]
    fn test_missing_template_dir_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let result = Config::builder()
            .input_path(input.path())
            .model("gpt-4o")
            .template_dir(temp.path().join("no_such_dir"))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_output_dir_default_is_sibling() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let config = Config::builder()
            .input_path(input.path())
            .model("gpt-4o")
            .build()
            .unwrap();

        assert_eq!(
            config.resolved_output_dir(),
            temp.path().join(OUTPUT_DIR_NAME)
        );
    }

    #[test]
    fn test_output_dir_override_wins() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let config = Config::builder()
            .input_path(input.path())
            .model("gpt-4o")
            .output_dir(temp.path().join("custom"))
            .build()
            .unwrap();

        assert_eq!(config.resolved_output_dir(), temp.path().join("custom"));
    }

    #[test]
    fn test_explicit_api_key_wins_over_env() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = temp.child("cv.pdf");
        input.touch().unwrap();

        let config = Config::builder()
            .input_path(input.path())
            .model("gpt-4o")
            .api_key("sk-test")
            .build()
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }
}
