//! Toolchain channel names.

use crate::errors::InvalidToolchainError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static DATED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(stable|beta|nightly)-(\d{4}-\d{2}-\d{2})$").expect("Invalid dated channel regex")
});
static VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("Invalid version channel regex"));

/// The shape of a toolchain name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// The `stable` channel.
    Stable,
    /// The `beta` channel.
    Beta,
    /// The `nightly` channel.
    Nightly,
    /// A channel pinned to a date, e.g. `nightly-2024-01-01`.
    Dated {
        /// The underlying channel name.
        channel: String,
        /// The `YYYY-MM-DD` date.
        date: String,
    },
    /// A numbered release, e.g. `1.75.0`.
    Version(String),
    /// Anything else; left for the provisioning tool to accept or reject.
    Custom(String),
}

/// A toolchain selected for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Toolchain {
    name: String,
}

impl Toolchain {
    /// Parses a toolchain name.
    ///
    /// Only names that could never be passed to the provisioning tool are
    /// rejected here. Unknown channels are accepted and fail at provisioning.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains whitespace.
    pub fn parse(name: &str) -> Result<Self, InvalidToolchainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(InvalidToolchainError::new(name, "toolchain cannot be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidToolchainError::new(
                name,
                "toolchain cannot contain whitespace",
            ));
        }

        Ok(Self {
            name: trimmed.to_string(),
        })
    }

    /// The `stable` toolchain.
    #[must_use]
    pub fn stable() -> Self {
        Self {
            name: "stable".to_string(),
        }
    }

    /// The `nightly` toolchain.
    #[must_use]
    pub fn nightly() -> Self {
        Self {
            name: "nightly".to_string(),
        }
    }

    /// Returns the name as passed to the provisioning tool.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Classifies the name.
    #[must_use]
    pub fn channel(&self) -> Channel {
        match self.name.as_str() {
            "stable" => Channel::Stable,
            "beta" => Channel::Beta,
            "nightly" => Channel::Nightly,
            name => {
                if let Some(caps) = DATED_REGEX.captures(name) {
                    Channel::Dated {
                        channel: caps[1].to_string(),
                        date: caps[2].to_string(),
                    }
                } else if VERSION_REGEX.is_match(name) {
                    Channel::Version(name.to_string())
                } else {
                    Channel::Custom(name.to_string())
                }
            }
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Toolchain {
    type Err = InvalidToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Toolchain {
    type Error = InvalidToolchainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Toolchain> for String {
    fn from(toolchain: Toolchain) -> Self {
        toolchain.name
    }
}
