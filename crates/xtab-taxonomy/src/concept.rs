#![deny(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use xtab_model::QName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Instant,
    Duration,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Instant => "instant",
            PeriodType::Duration => "duration",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxonomy element: metric, abstract grouping item, dimension or member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub qname: QName,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_type: Option<PeriodType>,
    /// Domain element of a typed dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed_domain_ref: Option<String>,
}

impl Concept {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            is_abstract: false,
            label: None,
            data_type: None,
            period_type: None,
            typed_domain_ref: None,
        }
    }

    pub fn abstract_item(qname: QName) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(qname)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = Some(period_type);
        self
    }

    pub fn with_typed_domain_ref(mut self, domain: impl Into<String>) -> Self {
        self.typed_domain_ref = Some(domain.into());
        self
    }

    /// Display caption: the label, falling back to the QName.
    pub fn caption(&self) -> &str {
        self.label.as_deref().unwrap_or(self.qname.as_str())
    }
}
