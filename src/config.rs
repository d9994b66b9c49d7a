//! Runtime settings
//!
//! Settings are layered with `figment`: built-in defaults, then an optional
//! TOML file, then `QBOT_`-prefixed environment variables (nested keys use
//! `__`, e.g. `QBOT_TIMING__ANSWER_WINDOW=10000`). The merged result is
//! validated with `garde` before use.

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    bonus::{MAX_PART_WINDOW_MS, PART_WINDOW_MS},
    bot,
    tossup::{
        ANSWER_WINDOW_MS, CHUNK_SIZE, END_PROBE_MS, GRACE_PERIOD_MS, MAX_CHUNK_SIZE,
        MAX_REVEAL_DELAY_MS, MAX_WINDOW_MS, MIN_CHUNK_SIZE, MIN_REVEAL_DELAY_MS, REVEAL_DELAY_MS,
    },
};

/// Name of the settings file looked up in the working directory
pub const DEFAULT_FILE: &str = "qbot.toml";

/// Validation result type for duration validation
type ValidationResult = garde::Result;

/// Validates that a duration in milliseconds falls within `[MIN_MS, MAX_MS]`
fn validate_millis<const MIN_MS: u64, const MAX_MS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    let millis = u64::try_from(val.as_millis()).unwrap_or(u64::MAX);
    if (MIN_MS..=MAX_MS).contains(&millis) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_MS}ms,{MAX_MS}ms]",
        )))
    }
}

/// Validates that the API base is an http(s) URL with a host
fn validate_http_url(val: &str, _ctx: &()) -> ValidationResult {
    let parsed =
        url::Url::parse(val).map_err(|e| garde::Error::new(format!("not a URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(garde::Error::new(format!(
            "scheme '{}' not supported, must be http or https",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(garde::Error::new("URL must have a host"));
    }
    Ok(())
}

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum Error {
    /// A source could not be read or did not match the settings shape
    #[error("could not load settings: {0}")]
    Load(#[from] Box<figment::Error>),
    /// The merged settings are out of bounds
    #[error("invalid settings: {0}")]
    Invalid(#[from] garde::Report),
}

/// Timers and sizes used while playing questions
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    /// Words added per reveal step
    #[garde(range(min = MIN_CHUNK_SIZE, max = MAX_CHUNK_SIZE))]
    pub chunk_size: usize,
    /// Pause before each reveal step
    #[garde(custom(validate_millis::<MIN_REVEAL_DELAY_MS, MAX_REVEAL_DELAY_MS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub reveal_delay: Duration,
    /// How long a fully read tossup stays open for a buzz
    #[garde(custom(validate_millis::<0, MAX_WINDOW_MS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub grace_period: Duration,
    /// Time to answer after a buzz or a prompt
    #[garde(custom(validate_millis::<1, MAX_WINDOW_MS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub answer_window: Duration,
    /// Time to answer a single bonus part
    #[garde(custom(validate_millis::<1, MAX_PART_WINDOW_MS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub bonus_window: Duration,
    /// Time a `tk` session waits for an end command between tossups
    #[garde(custom(validate_millis::<0, MAX_WINDOW_MS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub end_probe: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            reveal_delay: Duration::from_millis(REVEAL_DELAY_MS),
            grace_period: Duration::from_millis(GRACE_PERIOD_MS),
            answer_window: Duration::from_millis(ANSWER_WINDOW_MS),
            bonus_window: Duration::from_millis(PART_WINDOW_MS),
            end_probe: Duration::from_millis(END_PROBE_MS),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Command prefix; `<prefix>end` interrupts any running play
    #[garde(length(chars, min = 1, max = bot::MAX_PREFIX_LENGTH))]
    pub prefix: String,
    /// Base URL of the question and answer-checking API
    #[garde(custom(validate_http_url))]
    pub api_base: String,
    /// Play timers
    #[garde(dive)]
    pub timing: Timing,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: bot::PREFIX.to_string(),
            api_base: bot::API_BASE.to_string(),
            timing: Timing::default(),
        }
    }
}

impl Settings {
    /// Builds the layered figment for `path`, or for [`DEFAULT_FILE`] when none is given
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_FILE));
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("QBOT_").split("__"))
    }

    /// Extracts and validates settings from a figment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] when a layer is malformed and
    /// [`Error::Invalid`] when a value is out of bounds.
    pub fn from_figment(figment: &Figment) -> Result<Self, Error> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from defaults, the settings file and the environment
    ///
    /// # Errors
    ///
    /// See [`Settings::from_figment`].
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        Self::from_figment(&Self::figment(path))
    }

    /// The end command as typed in chat, e.g. `>end`
    pub fn end_command(&self) -> String {
        format!("{}end", self.prefix)
    }

    /// Whether a chat message is the end command
    pub fn is_end_command(&self, content: &str) -> bool {
        content.trim_start().starts_with(&self.end_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_toml(toml: &str) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::string(toml))
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_default_timing_matches_constants() {
        let timing = Timing::default();
        assert_eq!(timing.chunk_size, 5);
        assert_eq!(timing.reveal_delay, Duration::from_millis(800));
        assert_eq!(timing.grace_period, Duration::from_secs(5));
        assert_eq!(timing.answer_window, Duration::from_secs(8));
        assert_eq!(timing.bonus_window, Duration::from_secs(60));
        assert_eq!(timing.end_probe, Duration::from_millis(3200));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let settings = Settings::from_figment(&with_toml(
            r#"
            prefix = "!"
            [timing]
            chunk_size = 3
            answer_window = 10000
            "#,
        ))
        .unwrap();

        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.timing.chunk_size, 3);
        assert_eq!(settings.timing.answer_window, Duration::from_secs(10));
        assert_eq!(settings.timing.reveal_delay, Duration::from_millis(800));
        assert_eq!(settings.api_base, bot::API_BASE);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let result = Settings::from_figment(&with_toml("[timing]\nchunk_size = 0"));
        assert!(matches!(result, Err(Error::Invalid(_))));
    }

    #[test]
    fn test_reveal_delay_too_long_is_rejected() {
        let mut settings = Settings::default();
        settings.timing.reveal_delay = Duration::from_millis(MAX_REVEAL_DELAY_MS + 1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let mut settings = Settings::default();
        settings.prefix = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_api_base_must_be_http_url_with_host() {
        let mut settings = Settings::default();
        for bad in ["https://", "ftp://qbreader.org/api", "qbreader.org/api", ""] {
            settings.api_base = bad.to_owned();
            assert!(settings.validate().is_err(), "{bad:?} should be rejected");
        }
        settings.api_base = "http://localhost:3000/api".to_owned();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_malformed_value_fails_to_load() {
        let result = Settings::from_figment(&with_toml("[timing]\nchunk_size = \"many\""));
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_end_command_detection() {
        let settings = Settings::default();
        assert_eq!(settings.end_command(), ">end");
        assert!(settings.is_end_command(">end"));
        assert!(settings.is_end_command(">end now"));
        assert!(!settings.is_end_command("end"));
        assert!(!settings.is_end_command("the end"));
    }
}
