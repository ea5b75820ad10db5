//! Host environment probing.
//!
//! Answers two questions about the executing host without side effects:
//! what its native target triple is, and whether a requested target links
//! against the alternate (statically linked) libc. The answers gate the
//! conditional phases of a pipeline.

use crate::core::{LibcFamily, Target};
use serde::{Deserialize, Serialize};

/// Triple this crate was compiled for, captured by the build script.
const BUILD_TARGET: &str = env!("CIMATRIX_BUILD_TARGET");

/// Structural facts about a target relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TargetProfile {
    /// The target differs from the host's native triple.
    pub cross: bool,
    /// The target links against the alternate libc.
    pub alternate_libc: bool,
}

/// Side-effect-free queries about the execution host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProber {
    native: Target,
}

impl Default for EnvironmentProber {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentProber {
    /// Creates a prober for the current host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            native: detect_native_triple(),
        }
    }

    /// Creates a prober that reports `native` as the host triple.
    #[must_use]
    pub fn with_native(native: Target) -> Self {
        Self { native }
    }

    /// Returns the host's native target triple.
    #[must_use]
    pub fn native_triple(&self) -> &Target {
        &self.native
    }

    /// Returns true if `target` is not the host's native triple.
    #[must_use]
    pub fn is_cross(&self, target: &Target) -> bool {
        target != &self.native
    }

    /// Returns true if `target` links against the statically linked libc.
    #[must_use]
    pub fn uses_alternate_libc(&self, target: &Target) -> bool {
        target.libc() == LibcFamily::Musl
    }

    /// Computes the facts the phase predicates are keyed on.
    #[must_use]
    pub fn profile(&self, target: &Target) -> TargetProfile {
        TargetProfile {
            cross: self.is_cross(target),
            alternate_libc: self.uses_alternate_libc(target),
        }
    }
}

fn detect_native_triple() -> Target {
    Target::parse(BUILD_TARGET).unwrap_or_else(|_| triple_from_consts())
}

/// Reconstructs the host triple from the standard library's constants.
fn triple_from_consts() -> Target {
    let arch = std::env::consts::ARCH;
    let env = if cfg!(target_env = "musl") {
        "musl"
    } else if cfg!(target_env = "msvc") {
        "msvc"
    } else {
        "gnu"
    };

    match std::env::consts::OS {
        "macos" => Target::from_parts(arch, Some("apple"), "darwin", None),
        "ios" => Target::from_parts(arch, Some("apple"), "ios", None),
        "windows" => Target::from_parts(arch, Some("pc"), "windows", Some(env)),
        "android" => Target::from_parts(arch, None, "linux", Some("android")),
        "linux" if arch == "arm" => {
            let abi = format!("{env}eabihf");
            Target::from_parts(arch, Some("unknown"), "linux", Some(&abi))
        }
        "linux" => Target::from_parts(arch, Some("unknown"), "linux", Some(env)),
        os => Target::from_parts(arch, Some("unknown"), os, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gnu_host() -> EnvironmentProber {
        EnvironmentProber::with_native(Target::parse("x86_64-unknown-linux-gnu").unwrap())
    }

    #[test]
    fn test_native_triple_is_cross_free() {
        let prober = EnvironmentProber::new();
        let native = prober.native_triple().clone();
        assert!(!prober.is_cross(&native));
        assert!(!native.arch().is_empty());
    }

    #[test]
    fn test_native_triple_is_deterministic() {
        assert_eq!(
            EnvironmentProber::new().native_triple(),
            EnvironmentProber::new().native_triple()
        );
    }

    #[test]
    fn test_native_matches_compile_target_arch() {
        let prober = EnvironmentProber::new();
        let arch = prober.native_triple().arch();
        // rustc names 32-bit x86 i686/i586 where std says x86
        if std::env::consts::ARCH != "x86" {
            assert!(
                arch.starts_with(std::env::consts::ARCH)
                    || std::env::consts::ARCH.starts_with(arch)
            );
        }
    }

    #[test]
    fn test_is_cross() {
        let prober = gnu_host();
        assert!(!prober.is_cross(&Target::parse("x86_64-unknown-linux-gnu").unwrap()));
        assert!(prober.is_cross(&Target::parse("x86_64-unknown-linux-musl").unwrap()));
        assert!(prober.is_cross(&Target::parse("aarch64-unknown-linux-gnu").unwrap()));
    }

    #[test]
    fn test_uses_alternate_libc() {
        let prober = gnu_host();
        assert!(prober.uses_alternate_libc(&Target::parse("x86_64-unknown-linux-musl").unwrap()));
        assert!(prober.uses_alternate_libc(
            &Target::parse("armv7-unknown-linux-musleabihf").unwrap()
        ));
        assert!(!prober.uses_alternate_libc(&Target::parse("x86_64-unknown-linux-gnu").unwrap()));
        assert!(!prober.uses_alternate_libc(&Target::parse("x86_64-apple-darwin").unwrap()));
        // "musl" elsewhere in the triple is not the environment component
        assert!(!prober.uses_alternate_libc(&Target::parse("musl-unknown-linux-gnu").unwrap()));
    }

    #[test]
    fn test_profile() {
        let prober = gnu_host();
        let native = prober.profile(&Target::parse("x86_64-unknown-linux-gnu").unwrap());
        assert_eq!(native, TargetProfile::default());

        let musl = prober.profile(&Target::parse("x86_64-unknown-linux-musl").unwrap());
        assert!(musl.cross);
        assert!(musl.alternate_libc);
    }

    #[test]
    fn test_triple_from_consts_parses() {
        let triple = triple_from_consts();
        assert!(Target::parse(triple.as_str()).is_ok());
    }
}
