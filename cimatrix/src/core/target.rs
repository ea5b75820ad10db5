//! Compilation target triples.

use crate::errors::InvalidTargetError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static COMPONENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("Invalid target component regex"));

/// Vendor fields that can appear in the second position of a triple.
const KNOWN_VENDORS: &[&str] = &[
    "unknown", "pc", "apple", "nvidia", "sun", "wrs", "fortanix", "esp", "kmc", "sony",
    "nintendo", "ibm", "uwp", "win7",
];

/// The C runtime family a target links against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibcFamily {
    /// GNU libc, dynamically linked (`gnu`, `gnueabihf`, `gnux32`, ...).
    Gnu,
    /// musl, statically linked (`musl`, `musleabi`, `musleabihf`, ...).
    Musl,
    /// The Microsoft C runtime.
    Msvc,
    /// An environment component this crate does not classify.
    Other(String),
    /// The triple has no environment component.
    None,
}

impl LibcFamily {
    fn from_env(env: Option<&str>) -> Self {
        match env {
            None => Self::None,
            Some(env) if env.starts_with("musl") => Self::Musl,
            Some(env) if env.starts_with("gnu") => Self::Gnu,
            Some("msvc") => Self::Msvc,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// A compilation target triple (`arch-vendor-os-env`).
///
/// The original identifier is preserved verbatim; the structural components
/// are only used to answer questions about the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target {
    triple: String,
    arch: String,
    vendor: Option<String>,
    os: String,
    env: Option<String>,
}

impl Target {
    /// Parses a target triple.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty, has fewer than two or
    /// more than four components, or contains characters outside
    /// `[A-Za-z0-9_.]` in any component.
    pub fn parse(triple: &str) -> Result<Self, InvalidTargetError> {
        let trimmed = triple.trim();
        if trimmed.is_empty() {
            return Err(InvalidTargetError::new(triple, "target cannot be empty"));
        }

        let parts: Vec<&str> = trimmed.split('-').collect();
        if let Some(bad) = parts.iter().find(|p| !COMPONENT_REGEX.is_match(p)) {
            return Err(InvalidTargetError::new(
                triple,
                format!("component '{bad}' is empty or contains invalid characters"),
            ));
        }

        let (arch, vendor, os, env) = match parts.as_slice() {
            [arch, os] => (*arch, None, *os, None),
            [arch, second, third] if KNOWN_VENDORS.contains(second) => {
                (*arch, Some(*second), *third, None)
            }
            [arch, os, env] => (*arch, None, *os, Some(*env)),
            [arch, vendor, os, env] => (*arch, Some(*vendor), *os, Some(*env)),
            _ => {
                return Err(InvalidTargetError::new(
                    triple,
                    format!("expected 2 to 4 components, found {}", parts.len()),
                ))
            }
        };

        Ok(Self {
            triple: trimmed.to_string(),
            arch: arch.to_string(),
            vendor: vendor.map(str::to_string),
            os: os.to_string(),
            env: env.map(str::to_string),
        })
    }

    /// Builds a target from already-separated components.
    #[must_use]
    pub fn from_parts(arch: &str, vendor: Option<&str>, os: &str, env: Option<&str>) -> Self {
        let triple = [Some(arch), vendor, Some(os), env]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("-");

        Self {
            triple,
            arch: arch.to_string(),
            vendor: vendor.map(str::to_string),
            os: os.to_string(),
            env: env.map(str::to_string),
        }
    }

    /// Returns the full triple as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.triple
    }

    /// Returns the architecture component.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Returns the vendor component, if present.
    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    /// Returns the operating system component.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Returns the environment component, if present.
    #[must_use]
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Returns the C runtime family implied by the environment component.
    #[must_use]
    pub fn libc(&self) -> LibcFamily {
        LibcFamily::from_env(self.env())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple)
    }
}

impl FromStr for Target {
    type Err = InvalidTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Target {
    type Error = InvalidTargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.triple
    }
}
