//! Aspects, member values and constraint sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{QName, TableError};

/// A reporting aspect a cell can be constrained on.
///
/// Built-in aspects have fixed names; anything else is a dimension QName.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Aspect {
    Concept,
    Period,
    EntityIdentifier,
    Unit,
    Dimension(QName),
}

impl Aspect {
    pub fn is_concept(&self) -> bool {
        matches!(self, Aspect::Concept)
    }

    pub fn dimension(&self) -> Option<&QName> {
        match self {
            Aspect::Dimension(qname) => Some(qname),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Aspect::Concept => "concept",
            Aspect::Period => "period",
            Aspect::EntityIdentifier => "entity-identifier",
            Aspect::Unit => "unit",
            Aspect::Dimension(qname) => qname.as_str(),
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "concept" => Ok(Aspect::Concept),
            "period" => Ok(Aspect::Period),
            "entity-identifier" | "entityIdentifier" => Ok(Aspect::EntityIdentifier),
            "unit" => Ok(Aspect::Unit),
            other => QName::new(other)
                .map(Aspect::Dimension)
                .map_err(|_| TableError::InvalidAspect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Aspect {
    type Error = TableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Aspect> for String {
    fn from(value: Aspect) -> Self {
        value.as_str().to_string()
    }
}

/// The value an aspect is constrained to. `Open` means no member is fixed
/// at compile time (typed or free dimension); it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<QName>", into = "Option<QName>")]
pub enum MemberValue {
    Fixed(QName),
    Open,
}

impl MemberValue {
    pub fn is_open(&self) -> bool {
        matches!(self, MemberValue::Open)
    }

    pub fn member(&self) -> Option<&QName> {
        match self {
            MemberValue::Fixed(qname) => Some(qname),
            MemberValue::Open => None,
        }
    }
}

impl From<Option<QName>> for MemberValue {
    fn from(value: Option<QName>) -> Self {
        value.map_or(MemberValue::Open, MemberValue::Fixed)
    }
}

impl From<MemberValue> for Option<QName> {
    fn from(value: MemberValue) -> Self {
        match value {
            MemberValue::Fixed(qname) => Some(qname),
            MemberValue::Open => None,
        }
    }
}

impl From<QName> for MemberValue {
    fn from(value: QName) -> Self {
        MemberValue::Fixed(value)
    }
}

impl fmt::Display for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::Fixed(qname) => write!(f, "{qname}"),
            MemberValue::Open => f.write_str("(open)"),
        }
    }
}

/// Aspect → member map carried by one rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet(BTreeMap<Aspect, MemberValue>);

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, aspect: Aspect, value: impl Into<MemberValue>) -> Self {
        self.0.insert(aspect, value.into());
        self
    }

    pub fn insert(&mut self, aspect: Aspect, value: MemberValue) -> Option<MemberValue> {
        self.0.insert(aspect, value)
    }

    pub fn get(&self, aspect: &Aspect) -> Option<&MemberValue> {
        self.0.get(aspect)
    }

    pub fn contains(&self, aspect: &Aspect) -> bool {
        self.0.contains_key(aspect)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Aspect, &MemberValue)> {
        self.0.iter()
    }

    pub fn concept(&self) -> Option<&QName> {
        self.0.get(&Aspect::Concept).and_then(MemberValue::member)
    }
}

impl FromIterator<(Aspect, MemberValue)> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = (Aspect, MemberValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The untagged (default) rule set plus any rule sets selected by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSets {
    #[serde(default)]
    pub default: ConstraintSet,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tagged: BTreeMap<String, ConstraintSet>,
}

impl RuleSets {
    pub fn from_default(default: ConstraintSet) -> Self {
        Self {
            default,
            tagged: BTreeMap::new(),
        }
    }

    pub fn with_tagged(mut self, tag: impl Into<String>, set: ConstraintSet) -> Self {
        self.tagged.insert(tag.into(), set);
        self
    }

    pub fn tagged(&self, tag: &str) -> Option<&ConstraintSet> {
        self.tagged.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.tagged.is_empty()
    }
}
