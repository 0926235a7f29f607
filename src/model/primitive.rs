//! Event primitives and the backend's primitive/slot descriptions

use crate::error::{CurationError, CurationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subsubtype preferred when a primitive is picked from a recommendation
pub const UNSPECIFIED_SUBSUBTYPE: &str = "Unspecified";

/// A semantic primitive of the form `type.subtype.subsubtype`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventPrimitive {
    kind: String,
    subtype: String,
    subsubtype: String,
}

impl EventPrimitive {
    pub fn new(
        kind: impl Into<String>,
        subtype: impl Into<String>,
        subsubtype: impl Into<String>,
    ) -> CurationResult<Self> {
        let primitive = Self {
            kind: kind.into(),
            subtype: subtype.into(),
            subsubtype: subsubtype.into(),
        };
        if primitive.kind.is_empty() || primitive.subtype.is_empty() || primitive.subsubtype.is_empty() {
            return Err(CurationError::InvalidPrimitive(primitive.to_string()));
        }
        Ok(primitive)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn subsubtype(&self) -> &str {
        &self.subsubtype
    }

    /// `type.subtype`, the key the slot templates are stored under
    pub fn type_subtype(&self) -> String {
        format!("{}.{}", self.kind, self.subtype)
    }
}

impl fmt::Display for EventPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.kind, self.subtype, self.subsubtype)
    }
}

impl FromStr for EventPrimitive {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(subtype), Some(subsubtype), None) => {
                Self::new(kind, subtype, subsubtype)
                    .map_err(|_| CurationError::InvalidPrimitive(s.to_string()))
            }
            _ => Err(CurationError::InvalidPrimitive(s.to_string())),
        }
    }
}

impl TryFrom<String> for EventPrimitive {
    type Error = CurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventPrimitive> for String {
    fn from(value: EventPrimitive) -> Self {
        value.to_string()
    }
}

/// A `type.subtype` candidate with its subsubtypes, as returned by the
/// recommendation and primitive listing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveRecommendation {
    #[serde(rename = "type")]
    pub type_subtype: String,
    #[serde(default)]
    pub subsubtypes: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PrimitiveRecommendation {
    /// Full primitive for this candidate: `Unspecified` when offered, the
    /// first subsubtype otherwise
    pub fn default_primitive(&self) -> CurationResult<EventPrimitive> {
        let subsubtype = self
            .subsubtypes
            .iter()
            .find(|s| s.as_str() == UNSPECIFIED_SUBSUBTYPE)
            .or_else(|| self.subsubtypes.first())
            .ok_or_else(|| CurationError::InvalidPrimitive(self.type_subtype.clone()))?;
        format!("{}.{}", self.type_subtype, subsubtype).parse()
    }
}

/// Slot templates for a primitive: `constraints[i]` belongs to `slots[i]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTemplates {
    pub slots: Vec<String>,
    pub constraints: Vec<Vec<String>>,
}

impl SlotTemplates {
    /// Allowed constraints for `role`, if the primitive has such a slot
    pub fn constraints_for(&self, role: &str) -> Option<&[String]> {
        self.slots
            .iter()
            .position(|s| s == role)
            .map(|i| self.constraints.get(i).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// `(role, constraints)` pairs in template order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.slots.iter().enumerate().map(|(i, role)| {
            (
                role.as_str(),
                self.constraints.get(i).map(Vec::as_slice).unwrap_or(&[]),
            )
        })
    }
}
