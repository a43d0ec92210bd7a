use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::label::Label;
use super::node::NodeId;
use super::value::MonetaryValue;
use crate::error::TraceError;
use crate::error::TraceResult;

/// Numeric property a value range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    /// Estimated value of the relation itself
    Value,
    /// Current balance of the neighbor
    Balance,
    /// Total amount received by the neighbor
    Received,
}

impl FromStr for FilterField {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Self> {
        match s {
            "value" => Ok(FilterField::Value),
            "balance" => Ok(FilterField::Balance),
            "received" => Ok(FilterField::Received),
            other => Err(TraceError::InvalidFilter(format!("unknown field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCurrency {
    /// Native integer units
    Value,
    Usd,
    Eur,
}

impl FromStr for FieldCurrency {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Self> {
        match s {
            "value" => Ok(FieldCurrency::Value),
            "usd" => Ok(FieldCurrency::Usd),
            "eur" => Ok(FieldCurrency::Eur),
            other => Err(TraceError::InvalidFilter(format!("unknown field currency: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub field:    FilterField,
    pub currency: FieldCurrency,
    pub min:      Option<f64>,
    pub max:      Option<f64>,
}

impl ValueRange {
    pub fn parse(
        field: &str,
        currency: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> TraceResult<Self> {
        let range = Self {
            field: field.parse()?,
            currency: currency.parse()?,
            min,
            max,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> TraceResult<()> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if bound.is_nan() {
                return Err(TraceError::InvalidFilter("range bound is NaN".to_string()));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(TraceError::InvalidFilter(format!("min {} exceeds max {}", min, max)));
            }
        }
        Ok(())
    }

    pub fn amount_of(
        &self,
        value: &MonetaryValue,
    ) -> f64 {
        match self.currency {
            FieldCurrency::Value => value.value as f64,
            FieldCurrency::Usd => value.usd,
            FieldCurrency::Eur => value.eur,
        }
    }

    /// Inclusive on both bounds.
    pub fn contains(
        &self,
        value: &MonetaryValue,
    ) -> bool {
        let amount = self.amount_of(value);
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}

/// Constraints applied to every relation considered during a search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationFilter {
    pub category:    Option<String>,
    pub value_range: Option<ValueRange>,
    pub targets:     Option<BTreeSet<NodeId>>,
}

impl RelationFilter {
    pub fn validate(&self) -> TraceResult<()> {
        if let Some(category) = &self.category {
            if category.is_empty() || !category.chars().all(|c| c.is_alphabetic()) {
                return Err(TraceError::InvalidFilter(format!("invalid category: {}", category)));
            }
        }
        if let Some(range) = &self.value_range {
            range.validate()?;
        }
        Ok(())
    }

    /// Whether the filter says anything about which member addresses of an entity match.
    pub fn has_address_predicate(&self) -> bool {
        self.category.is_some() || self.targets.is_some()
    }

    pub fn matches_category(
        &self,
        labels: &[Label],
    ) -> bool {
        match &self.category {
            Some(category) => labels.iter().any(|label| label.has_category(category)),
            None => true,
        }
    }

    pub fn is_target(
        &self,
        id: &NodeId,
    ) -> bool {
        match &self.targets {
            Some(targets) => targets.contains(id),
            None => true,
        }
    }
}
