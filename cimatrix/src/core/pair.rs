//! The (target, toolchain) pair a pipeline runs for.

use super::{Target, Toolchain};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of the build matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildPair {
    /// The compilation target.
    pub target: Target,
    /// The toolchain channel.
    pub toolchain: Toolchain,
}

impl BuildPair {
    /// Creates a new pair.
    #[must_use]
    pub fn new(target: Target, toolchain: Toolchain) -> Self {
        Self { target, toolchain }
    }
}

impl fmt::Display for BuildPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.toolchain)
    }
}
