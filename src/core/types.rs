//! EP-001: All types from the empacar schema.
//!
//! Defines the manifest types read from empacar.yaml, the resolved metadata
//! record, and the dependency-specifier types. Manifest and metadata types
//! derive Serialize/Deserialize for YAML/JSON roundtripping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Top-level empacar.yaml
// ============================================================================

/// Root manifest — the packaging declaration for one distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Schema version (must be "1.0")
    pub schema: String,

    /// Static package metadata
    pub package: PackageInfo,

    /// Script scanned for the `__version__` declaration, relative to the manifest
    pub version_from: String,

    /// Installed executable scripts (paths or glob patterns, order-preserving)
    pub scripts: Vec<String>,

    /// Dependency specifiers, e.g. "thermod >= 1.2.0" (declared, never fetched)
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Static metadata fields of a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Distribution name
    pub name: String,

    /// One-line summary
    #[serde(default)]
    pub description: Option<String>,

    /// Long description (emitted as the metadata body)
    #[serde(default)]
    pub long_description: Option<String>,

    /// Author name
    #[serde(default)]
    pub author: Option<String>,

    /// Author contact address
    #[serde(default)]
    pub author_email: Option<String>,

    /// Project homepage
    #[serde(default)]
    pub url: Option<String>,

    /// License identifier (e.g. "GPL-3.0+")
    #[serde(default)]
    pub license: Option<String>,
}

// ============================================================================
// Resolved metadata
// ============================================================================

/// Fully resolved distribution metadata — manifest fields plus the resolved
/// version, canonical requirement forms, and per-script BLAKE3 digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Distribution name
    pub name: String,

    /// Version resolved from the `__version__` line of `version_from`
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub long_description: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    /// Canonicalized dependency specifiers, manifest order
    #[serde(default)]
    pub requires: Vec<String>,

    /// Script path → `blake3:{hex}` digest, manifest order
    pub scripts: IndexMap<String, String>,

    /// Tool provenance, e.g. "empacar 1.2.0"
    pub generator: String,
}

// ============================================================================
// Dependency specifiers
// ============================================================================

/// Comparison operator in a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl ConstraintOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintOp::Eq => "==",
            ConstraintOp::Ne => "!=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Le => "<=",
            ConstraintOp::Gt => ">",
            ConstraintOp::Lt => "<",
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `op version` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: Version,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// A parsed dependency specifier: package name plus zero or more constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraints: Vec<Constraint>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "{}", self.name);
        }
        let clauses: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        write!(f, "{} {}", self.name, clauses.join(", "))
    }
}

/// A dotted numeric version with an optional trailing pre-release tag,
/// e.g. "1.2.0" or "2.4rc1". Missing segments compare as zero, so "1.2"
/// and "1.2.0" are equal; a tagged version orders before the untagged
/// version with the same segments.
#[derive(Debug, Clone)]
pub struct Version {
    pub segments: Vec<u64>,
    pub tag: Option<String>,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", dotted.join("."))?;
        if let Some(tag) = &self.tag {
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        match (&self.tag, &other.tag) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
