use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::node::NodeId;
use super::value::MonetaryValue;
use crate::error::TraceError;
use crate::error::TraceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

impl FromStr for Direction {
    type Err = TraceError;

    fn from_str(s: &str) -> TraceResult<Self> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(TraceError::InvalidFilter(format!("invalid direction: {}", other))),
        }
    }
}

/// Aggregated edge between two nodes as stored, amounts in native units. The `neighbor_*`
/// totals describe the far endpoint so filters on it need no extra lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRow {
    pub src:               NodeId,
    pub dst:               NodeId,
    pub tx_hash:           String,
    pub height:            u64,
    pub timestamp:         i64,
    pub input_value:       i64,
    pub output_value:      i64,
    pub no_txs:            u64,
    pub estimated_value:   i64,
    #[serde(default)]
    pub neighbor_received: i64,
    #[serde(default)]
    pub neighbor_spent:    i64,
}

impl RelationRow {
    /// The endpoint reached when walking the edge in `direction`.
    pub fn neighbor(
        &self,
        direction: Direction,
    ) -> &NodeId {
        match direction {
            Direction::Out => &self.dst,
            Direction::In => &self.src,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub src:             NodeId,
    pub dst:             NodeId,
    pub tx_hash:         String,
    pub height:          u64,
    pub timestamp:       i64,
    pub input_value:     MonetaryValue,
    pub output_value:    MonetaryValue,
    pub no_txs:          u64,
    pub estimated_value: MonetaryValue,
}

impl Relation {
    pub fn neighbor(
        &self,
        direction: Direction,
    ) -> &NodeId {
        match direction {
            Direction::Out => &self.dst,
            Direction::In => &self.src,
        }
    }
}
