//! Engine configuration.
//!
//! A [`FormConfig`] is built once at startup (defaults, environment, or
//! explicit setters) and handed to every component through a
//! [`FormContext`](crate::FormContext).

use std::time::Duration;

pub const LOG_DEBUG_MESSAGE_KEY: &str = "ST_FORM_LOG_DEBUG_MESSAGE";
pub const VALIDATION_PROPERTY_NAME_KEY: &str = "ST_FORM_VALIDATION_PROPERTY_NAME";
pub const VALIDATION_DEBOUNCE_TIME_IN_MS_KEY: &str = "ST_FORM_VALIDATION_DEBOUNCE_TIME_IN_MS";
pub const VALIDATION_EVENT_LISTENER_KEY: &str = "ST_FORM_VALIDATION_EVENT_LISTENER";

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Configuration shared by all fields and forms of one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Data key under which a bound element references its field validator.
    pub validation_property_name: String,

    /// Debounce applied when a field has no override.
    pub validation_debounce: Duration,

    /// Events on a field host that trigger validation.
    pub validation_event_listener: Vec<String>,

    /// Emit debug records for event-driven validation.
    pub log_debug_messages: bool,

    /// Identifier reported in `errors` for validators without a name.
    pub validator_name: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation_property_name: "VALIDATION".to_string(),
            validation_debounce: DEFAULT_DEBOUNCE,
            validation_event_listener: vec!["change".to_string(), "keyup".to_string()],
            log_debug_messages: false,
            validator_name: "VALIDATOR_NAME".to_string(),
        }
    }
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the `ST_FORM_*` process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Defaults overridden by `ST_FORM_*` key/value pairs.
    ///
    /// Unknown keys are ignored. A debounce that is missing, zero or does
    /// not start with digits keeps the default.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                LOG_DEBUG_MESSAGE_KEY => config.log_debug_messages = value == "true",
                VALIDATION_PROPERTY_NAME_KEY if !value.is_empty() => {
                    config.validation_property_name = value.to_string();
                }
                VALIDATION_DEBOUNCE_TIME_IN_MS_KEY => {
                    if let Some(ms) = leading_millis(value) {
                        config.validation_debounce = Duration::from_millis(ms);
                    }
                }
                VALIDATION_EVENT_LISTENER_KEY if !value.is_empty() => {
                    config.validation_event_listener =
                        value.split('|').map(str::to_string).collect();
                }
                _ => {}
            }
        }
        config
    }

    pub fn validation_property_name(mut self, name: impl Into<String>) -> Self {
        self.validation_property_name = name.into();
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.validation_debounce = debounce;
        self
    }

    pub fn event_listeners<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_event_listener = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn log_debug_messages(mut self, enabled: bool) -> Self {
        self.log_debug_messages = enabled;
        self
    }

    pub fn validator_name(mut self, name: impl Into<String>) -> Self {
        self.validator_name = name.into();
        self
    }
}

/// Leading decimal digits of `value`, ignoring zero.
fn leading_millis(value: &str) -> Option<u64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok().filter(|&ms| ms > 0)
}
