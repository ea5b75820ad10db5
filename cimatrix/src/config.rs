//! Pipeline configuration.
//!
//! Configuration is environment-style: the hosting CI exports `TARGET` and
//! `TOOLCHAIN_CHANNEL` per matrix cell, plus optional `CIMATRIX_*` switches.

use crate::core::{BuildPair, Target, Toolchain};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Required: the target triple to build for.
pub const ENV_TARGET: &str = "TARGET";
/// Required: the toolchain channel to provision.
pub const ENV_TOOLCHAIN: &str = "TOOLCHAIN_CHANNEL";
/// Optional: run build/test through the cross-execution wrapper.
pub const ENV_USE_CROSS: &str = "CIMATRIX_USE_CROSS";
/// Optional: set to false to bypass every phase.
pub const ENV_ENABLED: &str = "CIMATRIX_ENABLED";
/// Optional: override the detected native triple.
pub const ENV_HOST_TRIPLE: &str = "CIMATRIX_HOST_TRIPLE";
/// Optional: build tool program.
pub const ENV_CARGO: &str = "CIMATRIX_CARGO";
/// Optional: toolchain provisioning program.
pub const ENV_RUSTUP: &str = "CIMATRIX_RUSTUP";
/// Optional: cross-execution wrapper program.
pub const ENV_CROSS: &str = "CIMATRIX_CROSS";
/// Optional: package manager install command prefix.
pub const ENV_PACKAGE_MANAGER: &str = "CIMATRIX_PACKAGE_MANAGER";
/// Optional: system packages needed for the alternate libc.
pub const ENV_ALT_LIBC_PACKAGES: &str = "CIMATRIX_ALT_LIBC_PACKAGES";
/// Optional: directory build, test and format-check run in.
pub const ENV_WORKDIR: &str = "CIMATRIX_WORKDIR";

/// Programs and arguments used by the phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommands {
    /// Build tool.
    #[serde(default = "default_cargo")]
    pub cargo: String,
    /// Toolchain provisioning tool.
    #[serde(default = "default_rustup")]
    pub rustup: String,
    /// Cross-execution wrapper, used in place of `cargo` for build and test.
    #[serde(default = "default_cross")]
    pub cross: String,
    /// Package manager install prefix (program followed by arguments).
    #[serde(default = "default_package_manager")]
    pub package_manager: Vec<String>,
    /// Packages installed for alternate libc targets.
    #[serde(default = "default_alt_libc_packages")]
    pub alt_libc_packages: Vec<String>,
    /// Toolchain component providing the formatter.
    #[serde(default = "default_format_component")]
    pub format_component: String,
}

fn default_cargo() -> String {
    "cargo".to_string()
}

fn default_rustup() -> String {
    "rustup".to_string()
}

fn default_cross() -> String {
    "cross".to_string()
}

fn default_package_manager() -> Vec<String> {
    split_words("sudo apt-get install -y")
}

fn default_alt_libc_packages() -> Vec<String> {
    vec!["musl-tools".to_string()]
}

fn default_format_component() -> String {
    "rustfmt".to_string()
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            cargo: default_cargo(),
            rustup: default_rustup(),
            cross: default_cross(),
            package_manager: default_package_manager(),
            alt_libc_packages: default_alt_libc_packages(),
            format_component: default_format_component(),
        }
    }
}

impl ToolCommands {
    /// Applies `CIMATRIX_*` program overrides from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is set but blank.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tools = Self::default();
        if let Some(v) = non_blank(lookup, ENV_CARGO)? {
            tools.cargo = v;
        }
        if let Some(v) = non_blank(lookup, ENV_RUSTUP)? {
            tools.rustup = v;
        }
        if let Some(v) = non_blank(lookup, ENV_CROSS)? {
            tools.cross = v;
        }
        if let Some(v) = non_blank(lookup, ENV_PACKAGE_MANAGER)? {
            tools.package_manager = split_words(&v);
        }
        if let Some(v) = non_blank(lookup, ENV_ALT_LIBC_PACKAGES)? {
            tools.alt_libc_packages = split_words(&v);
        }
        Ok(tools)
    }
}

/// Everything one pipeline invocation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The pair to build.
    pub pair: BuildPair,
    /// Route build and test through the cross-execution wrapper for non-native targets.
    #[serde(default)]
    pub use_cross: bool,
    /// When false, no phase runs and the pipeline reports success.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the detected native triple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_triple: Option<Target>,
    /// Working directory for build, test and format-check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    /// External programs.
    #[serde(default)]
    pub tools: ToolCommands,
}

fn default_enabled() -> bool {
    true
}

impl PipelineConfig {
    /// Creates an enabled configuration with default tools.
    #[must_use]
    pub fn new(target: Target, toolchain: Toolchain) -> Self {
        Self {
            pair: BuildPair::new(target, toolchain),
            use_cross: false,
            enabled: default_enabled(),
            host_triple: None,
            workdir: None,
            tools: ToolCommands::default(),
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target =
            non_blank(&lookup, ENV_TARGET)?.ok_or_else(|| ConfigError::missing(ENV_TARGET))?;
        let toolchain =
            non_blank(&lookup, ENV_TOOLCHAIN)?.ok_or_else(|| ConfigError::missing(ENV_TOOLCHAIN))?;

        let mut config = Self::new(Target::parse(&target)?, Toolchain::parse(&toolchain)?);
        config.use_cross = bool_var(&lookup, ENV_USE_CROSS)?.unwrap_or(false);
        config.enabled = bool_var(&lookup, ENV_ENABLED)?.unwrap_or(true);
        config.host_triple = non_blank(&lookup, ENV_HOST_TRIPLE)?
            .map(|triple| Target::parse(&triple))
            .transpose()?;
        config.workdir = non_blank(&lookup, ENV_WORKDIR)?.map(PathBuf::from);
        config.tools = ToolCommands::from_lookup(&lookup)?;
        Ok(config)
    }

    /// Sets the cross-execution flag.
    #[must_use]
    pub fn with_use_cross(mut self, use_cross: bool) -> Self {
        self.use_cross = use_cross;
        self
    }

    /// Sets the enable switch.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Overrides the native triple.
    #[must_use]
    pub fn with_host_triple(mut self, host_triple: Target) -> Self {
        self.host_triple = Some(host_triple);
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Replaces the tool commands.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolCommands) -> Self {
        self.tools = tools;
        self
    }
}

/// Parses a boolean switch value.
///
/// # Errors
///
/// Returns an error for anything other than the accepted spellings.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            name,
            value,
            "expected one of 1/0, true/false, yes/no, on/off",
        )),
    }
}

fn bool_var<F>(lookup: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_bool(name, &v))
        .transpose()
}

/// Unset and empty are both "absent"; whitespace-only is an error.
fn non_blank<F>(lookup: &F, name: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v.trim().is_empty() => Err(ConfigError::invalid_value(name, v, "blank value")),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

fn split_words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_env() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-gnu"),
            ("TOOLCHAIN_CHANNEL", "stable"),
        ]))
        .unwrap();

        assert_eq!(config.pair.target.as_str(), "x86_64-unknown-linux-gnu");
        assert_eq!(config.pair.toolchain.as_str(), "stable");
        assert!(config.enabled);
        assert!(!config.use_cross);
        assert!(config.host_triple.is_none());
        assert_eq!(config.tools, ToolCommands::default());
    }

    #[test]
    fn test_missing_target() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("TOOLCHAIN_CHANNEL", "stable")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::missing("TARGET"));
    }

    #[test]
    fn test_missing_toolchain() {
        let err = PipelineConfig::from_lookup(lookup_from(&[(
            "TARGET",
            "x86_64-unknown-linux-gnu",
        )]))
        .unwrap_err();
        assert_eq!(err, ConfigError::missing("TOOLCHAIN_CHANNEL"));
    }

    #[test]
    fn test_invalid_target() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "linux"),
            ("TOOLCHAIN_CHANNEL", "stable"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Target(_)));
    }

    #[test]
    fn test_optional_switches() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "aarch64-unknown-linux-musl"),
            ("TOOLCHAIN_CHANNEL", "nightly"),
            ("CIMATRIX_USE_CROSS", "true"),
            ("CIMATRIX_ENABLED", "0"),
            ("CIMATRIX_HOST_TRIPLE", "x86_64-unknown-linux-gnu"),
            ("CIMATRIX_WORKDIR", "/src/project"),
        ]))
        .unwrap();

        assert!(config.use_cross);
        assert!(!config.enabled);
        assert_eq!(
            config.host_triple.as_ref().map(Target::as_str),
            Some("x86_64-unknown-linux-gnu")
        );
        assert_eq!(config.workdir, Some(PathBuf::from("/src/project")));
    }

    #[test]
    fn test_invalid_bool() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-gnu"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_USE_CROSS", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == "CIMATRIX_USE_CROSS"
        ));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-gnu"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_USE_CROSS", ""),
            ("CIMATRIX_HOST_TRIPLE", ""),
        ]))
        .unwrap();
        assert!(!config.use_cross);
        assert!(config.host_triple.is_none());
    }

    #[test]
    fn test_empty_package_list_keeps_default() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-musl"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_ALT_LIBC_PACKAGES", ""),
        ]))
        .unwrap();
        assert_eq!(config.tools.alt_libc_packages, vec!["musl-tools"]);
    }

    #[test]
    fn test_blank_package_list_is_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-musl"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_ALT_LIBC_PACKAGES", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == "CIMATRIX_ALT_LIBC_PACKAGES"
        ));
    }

    #[test]
    fn test_tool_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-musl"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_CARGO", "/opt/cargo/bin/cargo"),
            ("CIMATRIX_PACKAGE_MANAGER", "apk add --no-cache"),
            ("CIMATRIX_ALT_LIBC_PACKAGES", "musl-dev  musl-tools"),
        ]))
        .unwrap();

        assert_eq!(config.tools.cargo, "/opt/cargo/bin/cargo");
        assert_eq!(config.tools.rustup, "rustup");
        assert_eq!(config.tools.package_manager, vec!["apk", "add", "--no-cache"]);
        assert_eq!(config.tools.alt_libc_packages, vec!["musl-dev", "musl-tools"]);
    }

    #[test]
    fn test_blank_tool_override_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("TARGET", "x86_64-unknown-linux-gnu"),
            ("TOOLCHAIN_CHANNEL", "stable"),
            ("CIMATRIX_CARGO", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_bool_spellings() {
        for v in ["1", "true", "YES", "On"] {
            assert!(parse_bool("X", v).unwrap());
        }
        for v in ["0", "false", "No", "OFF"] {
            assert!(!parse_bool("X", v).unwrap());
        }
        assert!(parse_bool("X", "2").is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PipelineConfig = serde_json::from_value(serde_json::json!({
            "pair": {"target": "x86_64-unknown-linux-gnu", "toolchain": "beta"}
        }))
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.tools.cross, "cross");
    }
}
