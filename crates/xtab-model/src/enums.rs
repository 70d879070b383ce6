//! Closed vocabularies of the table definition language.
//!
//! These are represented as strings in linkbase resources; the enums give
//! the compiler exhaustive matches over them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering axis of a breakdown.
///
/// The declaration order (x, y, z) is also the constraint resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(format!("Unknown axis: {}", s)),
        }
    }
}

/// Where a parent header sits relative to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParentChildOrder {
    #[default]
    ParentFirst,
    ChildrenFirst,
}

impl ParentChildOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentChildOrder::ParentFirst => "parent-first",
            ParentChildOrder::ChildrenFirst => "children-first",
        }
    }
}

impl fmt::Display for ParentChildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Traversal keyword of a concept relationship node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipAxis {
    Child,
    ChildOrSelf,
    Descendant,
    DescendantOrSelf,
}

impl RelationshipAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipAxis::Child => "child",
            RelationshipAxis::ChildOrSelf => "child-or-self",
            RelationshipAxis::Descendant => "descendant",
            RelationshipAxis::DescendantOrSelf => "descendant-or-self",
        }
    }

    /// True when the relationship source itself becomes a node.
    pub fn includes_self(&self) -> bool {
        self.as_str().ends_with("-or-self")
    }

    /// Generation limit after applying the keyword; `None` is unbounded.
    pub fn effective_generations(&self, declared: Option<u32>) -> Option<u32> {
        match self {
            RelationshipAxis::Child | RelationshipAxis::ChildOrSelf => Some(1),
            RelationshipAxis::Descendant | RelationshipAxis::DescendantOrSelf => {
                declared.filter(|limit| *limit > 0)
            }
        }
    }
}

impl fmt::Display for RelationshipAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "child" => Ok(RelationshipAxis::Child),
            "child-or-self" => Ok(RelationshipAxis::ChildOrSelf),
            "descendant" => Ok(RelationshipAxis::Descendant),
            "descendant-or-self" => Ok(RelationshipAxis::DescendantOrSelf),
            _ => Err(format!("Unknown relationship axis: {}", s)),
        }
    }
}
