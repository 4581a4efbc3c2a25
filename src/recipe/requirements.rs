// src/recipe/requirements.rs

//! Requirement references and platform-conditional resolution

use crate::error::{Error, Result};
use crate::settings::{Os, Settings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requirements pinned at authoring time
pub const REQUIRES: &[&str] = &[
    "zlib/1.2.11",
    "freetype/2.10.4",
    "libjpeg/9d",
    "libxml2/2.9.10",
    "libcurl/7.67.0",
    "libpng/1.6.37",
    "libtiff/4.0.9",
    "sdl2/2.0.12@bincrafters/stable",
    "jasper/2.0.19",
    "cairo/1.17.2",
];

/// Asynchronous I/O library, required everywhere but Windows
pub const ASIO: &str = "asio/1.13.0";

/// Windowing system, required on Linux only
pub const XORG: &str = "xorg/system";

/// Rendering API bindings, always required
pub const OPENGL: &str = "opengl/system";
pub const GLU: &str = "glu/system";

/// A package reference: `name/version[@user/channel]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Requirement {
    /// Create a reference without user/channel
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: None,
            channel: None,
        }
    }

    /// Whether this reference points at a system-provided package
    pub fn is_system(&self) -> bool {
        self.version == "system"
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::ParseError(format!("Invalid requirement reference: {}", s));

        let (package, user_channel) = match s.split_once('@') {
            Some((package, uc)) => (package, Some(uc)),
            None => (s, None),
        };

        let (name, version) = package.split_once('/').ok_or_else(invalid)?;
        if name.is_empty() || version.is_empty() || version.contains('/') {
            return Err(invalid());
        }

        let (user, channel) = match user_channel {
            Some(uc) => {
                let (user, channel) = uc.split_once('/').ok_or_else(invalid)?;
                if user.is_empty() || channel.is_empty() {
                    return Err(invalid());
                }
                (Some(user.to_string()), Some(channel.to_string()))
            }
            None => (None, None),
        };

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user,
            channel,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
            write!(f, "@{}/{}", user, channel)?;
        }
        Ok(())
    }
}

/// An ordered list of requirements with unique names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    items: Vec<Requirement>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement by reference string
    ///
    /// Declaring the same package twice is an error, whatever the version.
    pub fn add(&mut self, reference: &str) -> Result<()> {
        let requirement: Requirement = reference.parse()?;
        if self.contains(&requirement.name) {
            return Err(Error::DuplicateRequirement(requirement.name));
        }
        self.items.push(requirement);
        Ok(())
    }

    /// Check if a package is required
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|r| r.name == name)
    }

    /// Get a requirement by package name
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.items.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Requirement> {
        self.items
    }
}

/// Resolve the full requirement list for a target platform
///
/// Pure function of the settings: the fixed list first, then the
/// platform-conditional entries.
pub fn resolve(settings: &Settings) -> Result<Requirements> {
    let mut requirements = Requirements::new();

    for reference in REQUIRES {
        requirements.add(reference)?;
    }

    if settings.os != Os::Windows {
        requirements.add(ASIO)?;
    }
    if settings.os == Os::Linux {
        requirements.add(XORG)?;
    }
    requirements.add(OPENGL)?;
    requirements.add(GLU)?;

    Ok(requirements)
}
