//! Volunteer identifier rules.
//!
//! Identifiers are opaque to the planner, but they end up as a column in a
//! delimited table, so the hosting application checks them once against a
//! configured pattern before anything is read or written.

use regex::Regex;

use crate::config::Config;
use crate::error::{Error, Result};

/// Compiled identifier pattern, built once at start-up and passed by
/// reference to whoever needs to check an identifier.
#[derive(Debug, Clone)]
pub struct VolunteerIdRule {
    pattern: Regex,
}

impl VolunteerIdRule {
    /// Compile the rule from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.volunteers.id_pattern)
    }

    /// Compile the rule from a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|_| Error::ConfigValidation {
            message: format!("invalid regex pattern: {pattern}"),
        })?;
        Ok(Self { pattern })
    }

    /// Accept an identifier, trimmed, if it matches the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVolunteerId`] otherwise.
    pub fn check<'a>(&self, id: &'a str) -> Result<&'a str> {
        let id = id.trim();
        if id.is_empty() || !self.pattern.is_match(id) {
            return Err(Error::InvalidVolunteerId { id: id.to_string() });
        }
        Ok(id)
    }
}
