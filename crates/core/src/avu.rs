// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribute-value-units metadata tags.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Separator between a namespace and the attribute proper.
pub const NAMESPACE_SEPARATOR: char = ':';

/// One metadata tag on an archive path.
///
/// The namespace, when present, is folded into the attribute as
/// `namespace:attribute`, which is how it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Avu {
    pub attribute: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Avu {
    pub fn new(attribute: impl Into<String>, value: impl ToString) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.to_string(),
            units: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Fold a namespace into the attribute. A tag that already carries a
    /// namespace is returned unchanged.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        if self.namespace().is_none() {
            self.attribute = format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, self.attribute);
        }
        self
    }

    /// The namespace part of the attribute, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.attribute
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(ns, _)| ns)
    }

    /// The attribute without its namespace prefix.
    pub fn without_namespace(&self) -> &str {
        self.attribute
            .split_once(NAMESPACE_SEPARATOR)
            .map_or(&self.attribute, |(_, attr)| attr)
    }
}

impl fmt::Display for Avu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.units {
            Some(units) => write!(f, "{}={} {}", self.attribute, self.value, units),
            None => write!(f, "{}={}", self.attribute, self.value),
        }
    }
}

// Tag lists sort lexically by (namespace, attribute, value, units), with
// absent parts preceding present ones.
impl Ord for Avu {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = (
            self.namespace(),
            self.without_namespace(),
            self.value.as_str(),
            self.units.as_deref(),
        );
        let rhs = (
            other.namespace(),
            other.without_namespace(),
            other.value.as_str(),
            other.units.as_deref(),
        );
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Avu {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
#[path = "avu_tests.rs"]
mod tests;
