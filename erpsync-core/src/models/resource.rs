//! Resource types.
//!
//! A resource is a named collection (an OData entity set) known to the
//! remote collection service:
//! - [`Resource`] - A selectable collection with its cached record count
//! - [`ResourceOrigin`] - How the resource entered the working set
//! - [`RecordCount`] - Known count or "unavailable"

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::sanitize_resource_name;

// ============================================================================
// Resource Origin
// ============================================================================

/// How a resource was added to the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceOrigin {
    /// Typed in by the user.
    Manual,
    /// Added from the preset catalogue.
    Preset,
    /// Found in the remote service document.
    Discovered,
}

impl ResourceOrigin {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Preset => "preset",
            Self::Discovered => "discovered",
        }
    }
}

impl fmt::Display for ResourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Record Count
// ============================================================================

/// Result of a count request.
///
/// `Unavailable` is deliberately distinct from `Known(0)`: the first means
/// the service could not tell us, the second that the collection is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "value")]
pub enum RecordCount {
    /// The service reported this many records.
    Known(u64),
    /// The count request failed or returned something non-numeric.
    Unavailable,
}

impl RecordCount {
    /// Builds a count from the optional value returned by a count request.
    pub fn from_option(count: Option<u64>) -> Self {
        count.map_or(Self::Unavailable, Self::Known)
    }

    /// Returns the known value, if any.
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Display for RecordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(0) => f.write_str("0 (empty)"),
            Self::Known(n) => write!(f, "{n}"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

// ============================================================================
// Resource
// ============================================================================

/// A named remote collection in the working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Sanitized name, matching `^[A-Za-z0-9_]+$`.
    name: String,
    /// How it was added.
    pub origin: ResourceOrigin,
    /// Cached record count. `None` until a count has been requested.
    pub record_count: Option<RecordCount>,
}

impl Resource {
    /// Creates a resource, sanitizing the name.
    pub fn new(name: &str, origin: ResourceOrigin) -> Result<Self, ValidationError> {
        Ok(Self {
            name: sanitize_resource_name(name)?,
            origin,
            record_count: None,
        })
    }

    /// Returns the sanitized name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Tests
// ============================================================================
