pub mod in_memory;
pub mod redis;

use async_trait::async_trait;

use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::Label;
use crate::model::NodeId;
use crate::model::NodeRecord;
use crate::model::RelationRow;

/// One page of relation rows in store order. `next_page` resumes right after the last row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationPage {
  pub rows:      Vec<RelationRow>,
  pub next_page: Option<String>,
}

/// Read access to the node and relation tables of the transaction graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
  async fn resolve_node(
    &self,
    currency: &str,
    id: &NodeId,
  ) -> TraceResult<Option<NodeRecord>>;

  async fn relations(
    &self,
    currency: &str,
    id: &NodeId,
    direction: Direction,
    page: Option<String>,
    page_size: usize,
  ) -> TraceResult<RelationPage>;

  async fn entity_addresses(
    &self,
    currency: &str,
    entity: u64,
  ) -> TraceResult<Vec<String>>;
}

/// Tags attached to addresses and entities.
#[async_trait]
pub trait LabelStore: Send + Sync {
  async fn labels_for(
    &self,
    currency: &str,
    id: &NodeId,
  ) -> TraceResult<Vec<Label>>;
}
