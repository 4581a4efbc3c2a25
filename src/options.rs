// src/options.rs

//! Recipe options
//!
//! Options are boolean switches declared by the recipe, each with a default.
//! The option *domain* can shrink for a configuration: an option that makes
//! no sense on a platform is removed rather than rejected, and afterwards it
//! is simply not part of the set.

use crate::error::{Error, Result};
use crate::settings::split_assignment;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Declaration of a single boolean option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDef {
    pub name: &'static str,
    pub default: bool,
}

impl OptionDef {
    pub const fn new(name: &'static str, default: bool) -> Self {
        Self { name, default }
    }
}

/// Parse a boolean option value
///
/// Accepts `True/False`, `true/false`, `1/0`, `on/off`, `yes/no`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// The option values of one recipe evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    values: BTreeMap<String, bool>,
    removed: BTreeSet<String>,
}

impl OptionSet {
    /// Create an option set holding the declared defaults
    pub fn from_defs(defs: &[OptionDef]) -> Self {
        Self {
            values: defs
                .iter()
                .map(|def| (def.name.to_string(), def.default))
                .collect(),
            removed: BTreeSet::new(),
        }
    }

    /// Get an option value, `None` if the option is not in the set
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Get an option value that must exist
    pub fn require(&self, name: &str) -> Result<bool> {
        match self.values.get(name) {
            Some(value) => Ok(*value),
            None if self.removed.contains(name) => Err(Error::OptionNotDefined(name.to_string())),
            None => Err(Error::UnknownOption(name.to_string())),
        }
    }

    /// Check if an option is part of the set
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Check if an option was removed from the domain
    pub fn is_removed(&self, name: &str) -> bool {
        self.removed.contains(name)
    }

    /// Remove an option from the domain
    pub fn remove(&mut self, name: &str) -> Option<bool> {
        let previous = self.values.remove(name);
        if previous.is_some() {
            self.removed.insert(name.to_string());
        }
        previous
    }

    /// Set an option value
    ///
    /// Setting a removed option is ignored with a warning; setting an option
    /// the recipe never declared is an error.
    pub fn set(&mut self, name: &str, value: bool) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            Ok(())
        } else if self.removed.contains(name) {
            warn!(
                "Option '{}' is not available for this configuration, ignoring {}={}",
                name, name, value
            );
            Ok(())
        } else {
            Err(Error::UnknownOption(name.to_string()))
        }
    }

    /// Apply a `name=value` assignment
    pub fn apply(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) = split_assignment(assignment).ok_or_else(|| Error::InvalidOptionValue {
            name: assignment.to_string(),
            value: String::new(),
        })?;

        // Accept the `package:option` form used on package-manager command lines
        let name = name.rsplit_once(':').map_or(name, |(_, opt)| opt);

        let value = parse_bool(raw).ok_or_else(|| Error::InvalidOptionValue {
            name: name.to_string(),
            value: raw.to_string(),
        })?;

        self.set(name, value)
    }

    /// Apply a list of `name=value` assignments in order
    pub fn apply_all<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<()> {
        for assignment in assignments {
            self.apply(assignment.as_ref())?;
        }
        Ok(())
    }

    /// Iterate over option names and values, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of options in the set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .iter()
            .map(|(name, value)| format!("{}={}", name, if value { "True" } else { "False" }))
            .collect();
        write!(f, "{}", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFS: &[OptionDef] = &[
        OptionDef::new("shared", false),
        OptionDef::new("fPIC", true),
    ];

    #[test]
    fn test_defaults() {
        let options = OptionSet::from_defs(DEFS);
        assert_eq!(options.get("shared"), Some(false));
        assert_eq!(options.get("fPIC"), Some(true));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["True", "true", "1", "ON", "yes"] {
            assert_eq!(parse_bool(truthy), Some(true), "{}", truthy);
        }
        for falsy in ["False", "false", "0", "off", "No"] {
            assert_eq!(parse_bool(falsy), Some(false), "{}", falsy);
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_remove_then_require() {
        let mut options = OptionSet::from_defs(DEFS);
        assert_eq!(options.remove("fPIC"), Some(true));
        assert!(!options.contains("fPIC"));
        assert!(options.is_removed("fPIC"));
        assert!(matches!(
            options.require("fPIC"),
            Err(Error::OptionNotDefined(_))
        ));
        assert!(matches!(
            options.require("bogus"),
            Err(Error::UnknownOption(_))
        ));
    }

    #[test]
    fn test_set_removed_is_ignored() {
        let mut options = OptionSet::from_defs(DEFS);
        options.remove("fPIC");
        options.set("fPIC", false).unwrap();
        assert_eq!(options.get("fPIC"), None);
    }

    #[test]
    fn test_apply_assignments() {
        let mut options = OptionSet::from_defs(DEFS);
        options
            .apply_all(&["shared=True", "openscenegraph:fPIC=False"])
            .unwrap();
        assert_eq!(options.get("shared"), Some(true));
        assert_eq!(options.get("fPIC"), Some(false));
    }

    #[test]
    fn test_apply_errors() {
        let mut options = OptionSet::from_defs(DEFS);
        assert!(matches!(
            options.apply("static=True"),
            Err(Error::UnknownOption(_))
        ));
        assert!(matches!(
            options.apply("shared=sometimes"),
            Err(Error::InvalidOptionValue { .. })
        ));
        assert!(options.apply("shared").is_err());
    }

    #[test]
    fn test_display_sorted() {
        let options = OptionSet::from_defs(DEFS);
        assert_eq!(options.to_string(), "fPIC=True, shared=False");
    }
}
