//! Configuration sources: explicit arguments, environment, interactive prompt.

use super::ConfigKey;
use crate::error::ConfigError;
use console::Term;
use std::collections::HashMap;
use std::io;

/// Trait for configuration sources
///
/// A source either knows a value for a key (`Some`), doesn't (`None`),
/// or fails outright.
pub trait ConfigSource {
    fn lookup(&self, key: ConfigKey) -> Result<Option<String>, ConfigError>;
}

/// Values supplied directly, e.g. from command-line arguments
#[derive(Debug, Clone, Default)]
pub struct ExplicitSource {
    values: HashMap<ConfigKey, String>,
}

impl ExplicitSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn set(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Set a value only when one was given
    pub fn set_opt(self, key: ConfigKey, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }
}

impl ConfigSource for ExplicitSource {
    fn lookup(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(&key).cloned())
    }
}

/// Reads `SOURCE_DIR`, `TARGET_DIR`, ... from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn lookup(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        Ok(std::env::var(key.env_var())
            .ok()
            .filter(|v| !v.trim().is_empty()))
    }
}

/// Asks on the terminal for anything the other sources didn't provide
pub struct PromptSource {
    term: Term,
}

impl PromptSource {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Prompt until an answer is usable.
    ///
    /// Keys with a default accept an empty answer as the default; required
    /// keys ask again until something non-empty is entered.
    fn ask<R, N>(key: ConfigKey, mut read_line: R, mut notice: N) -> Result<String, ConfigError>
    where
        R: FnMut(&str) -> io::Result<String>,
        N: FnMut(&str),
    {
        let env_var = key.env_var();
        let mut read = |prompt: &str| {
            read_line(prompt)
                .map(|line| line.trim().to_string())
                .map_err(|source| ConfigError::Prompt {
                    key: env_var,
                    source,
                })
        };

        if let Some(default) = key.default_value() {
            let answer = read(&format!("{} [Default: {}]: ", key.prompt(), default))?;
            return Ok(if answer.is_empty() {
                default.to_string()
            } else {
                answer
            });
        }

        let prompt = format!("{}: ", key.prompt());
        loop {
            let answer = read(&prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            notice("This field is required.");
        }
    }
}

impl Default for PromptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for PromptSource {
    fn lookup(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        let answer = Self::ask(
            key,
            |prompt| {
                self.term.write_str(prompt)?;
                self.term.read_line()
            },
            |message| {
                self.term.write_line(message).ok();
            },
        )?;
        Ok(Some(answer))
    }
}
