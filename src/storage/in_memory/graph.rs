use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use petgraph::Graph;
use petgraph::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::err_with_loc;
use crate::error::EngineError;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::NodeId;
use crate::model::NodeRecord;
use crate::model::RelationRow;
use crate::storage::GraphStore;
use crate::storage::RelationPage;

/// A node slot in the graph. `record` stays empty for endpoints only known from relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
  pub id:     NodeId,
  pub record: Option<NodeRecord>,
}

/// Serialized form of one currency's graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
  pub currency:         String,
  pub nodes:            Vec<NodeRecord>,
  pub relations:        Vec<RelationRow>,
  #[serde(default)]
  pub entity_addresses: BTreeMap<u64, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionGraph {
  graph:            Graph<GraphNode, RelationRow>,
  #[serde(skip)]
  node_indices:     HashMap<NodeId, NodeIndex>,
  entity_addresses: BTreeMap<u64, Vec<String>>,
}

impl TransactionGraph {
  pub fn new() -> Self {
    Self {
      graph:            Graph::new(),
      node_indices:     HashMap::new(),
      entity_addresses: BTreeMap::new(),
    }
  }

  pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
    let mut graph = Self::new();
    for record in snapshot.nodes {
      graph.add_node(record);
    }
    for row in snapshot.relations {
      graph.add_relation(row);
    }
    graph.entity_addresses = snapshot.entity_addresses;
    graph
  }

  // Rebuild the node_indices HashMap from the graph (useful after deserialization)
  pub fn rebuild_indices(&mut self) {
    self.node_indices.clear();
    for node_index in self.graph.node_indices() {
      if let Some(node) = self.graph.node_weight(node_index) {
        self.node_indices.insert(node.id.clone(), node_index);
      }
    }
  }

  fn ensure_indices(&mut self) {
    if self.node_indices.is_empty() && self.graph.node_count() > 0 {
      self.rebuild_indices();
    }
  }

  fn slot(
    &mut self,
    id: &NodeId,
  ) -> NodeIndex {
    self.ensure_indices();

    if let Some(&idx) = self.node_indices.get(id) {
      return idx;
    }

    let idx = self.graph.add_node(GraphNode { id: id.clone(), record: None });
    self.node_indices.insert(id.clone(), idx);
    idx
  }

  /// Insert or replace the record of a node.
  pub fn add_node(
    &mut self,
    record: NodeRecord,
  ) -> NodeIndex {
    let idx = self.slot(&record.id);
    self.graph[idx].record = Some(record);
    idx
  }

  /// Add a relation; endpoints without a record get an empty slot.
  pub fn add_relation(
    &mut self,
    row: RelationRow,
  ) -> EdgeIndex {
    let from_idx = self.slot(&row.src);
    let to_idx = self.slot(&row.dst);
    self.graph.add_edge(from_idx, to_idx, row)
  }

  pub fn set_entity_addresses(
    &mut self,
    entity: u64,
    addresses: Vec<String>,
  ) {
    self.entity_addresses.insert(entity, addresses);
  }

  pub fn get_node_count(&self) -> usize {
    self.graph.node_count()
  }

  pub fn get_edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  pub fn record(
    &self,
    id: &NodeId,
  ) -> Option<&NodeRecord> {
    let idx = self.node_indices.get(id)?;
    self.graph.node_weight(*idx)?.record.as_ref()
  }

  /// Relations touching `id` in insertion order.
  pub fn relations_of(
    &self,
    id: &NodeId,
    direction: Direction,
  ) -> Vec<&RelationRow> {
    let Some(&idx) = self.node_indices.get(id) else {
      return Vec::new();
    };
    let petgraph_direction = match direction {
      Direction::Out => Outgoing,
      Direction::In => Incoming,
    };
    let mut edges: Vec<_> = self.graph.edges_directed(idx, petgraph_direction).collect();
    edges.sort_by_key(|edge| edge.id());
    edges.into_iter().map(|edge| edge.weight()).collect()
  }

  pub fn addresses_of(
    &self,
    entity: u64,
  ) -> Vec<String> {
    self.entity_addresses.get(&entity).cloned().unwrap_or_default()
  }
}

/// Graph store serving one `TransactionGraph` per currency from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
  graphs: HashMap<String, TransactionGraph>,
}

impl InMemoryGraphStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_graph(
    &mut self,
    currency: &str,
    graph: TransactionGraph,
  ) {
    self.graphs.insert(currency.to_string(), graph);
  }

  pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
    let mut store = Self::new();
    let currency = snapshot.currency.clone();
    store.insert_graph(&currency, TransactionGraph::from_snapshot(snapshot));
    store
  }

  pub fn load_snapshot(path: impl AsRef<Path>) -> crate::Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|e| err_with_loc!(EngineError::SnapshotError(format!("{}: {}", path.display(), e))))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&raw)
      .map_err(|e| err_with_loc!(EngineError::SnapshotError(format!("{}: {}", path.display(), e))))?;
    let store = Self::from_snapshot(snapshot);
    for (currency, graph) in &store.graphs {
      info!(
        "graph_snapshot_loaded::currency::{}::nodes::{}::relations::{}",
        currency,
        graph.get_node_count(),
        graph.get_edge_count()
      );
    }
    Ok(store)
  }

  pub fn graph(
    &self,
    currency: &str,
  ) -> Option<&TransactionGraph> {
    self.graphs.get(currency)
  }
}

fn parse_page(page: Option<String>) -> TraceResult<usize> {
  match page {
    None => Ok(0),
    Some(token) => token
      .parse::<usize>()
      .map_err(|_| TraceError::InvalidFilter(format!("invalid store page token: {}", token))),
  }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
  async fn resolve_node(
    &self,
    currency: &str,
    id: &NodeId,
  ) -> TraceResult<Option<NodeRecord>> {
    Ok(self.graph(currency).and_then(|graph| graph.record(id)).cloned())
  }

  async fn relations(
    &self,
    currency: &str,
    id: &NodeId,
    direction: Direction,
    page: Option<String>,
    page_size: usize,
  ) -> TraceResult<RelationPage> {
    let Some(graph) = self.graph(currency) else {
      return Ok(RelationPage::default());
    };
    let offset = parse_page(page)?;
    let all = graph.relations_of(id, direction);
    let rows: Vec<RelationRow> = all.iter().skip(offset).take(page_size).map(|row| (*row).clone()).collect();
    let end = offset + rows.len();
    let next_page = (end < all.len() && !rows.is_empty()).then(|| end.to_string());
    debug!("in_memory_relations::node::{}::direction::{}::offset::{}::rows::{}", id, direction, offset, rows.len());
    Ok(RelationPage { rows, next_page })
  }

  async fn entity_addresses(
    &self,
    currency: &str,
    entity: u64,
  ) -> TraceResult<Vec<String>> {
    Ok(self.graph(currency).map(|graph| graph.addresses_of(entity)).unwrap_or_default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::TxSummary;

  fn record(id: NodeId) -> NodeRecord {
    NodeRecord {
      id,
      first_tx: TxSummary::default(),
      last_tx: TxSummary::default(),
      in_degree: 0,
      out_degree: 0,
      no_incoming_txs: 0,
      no_outgoing_txs: 0,
      total_received: 10,
      total_spent: 4,
      no_addresses: None,
      entity: None,
    }
  }

  fn relation(
    src: &str,
    dst: &str,
    value: i64,
  ) -> RelationRow {
    RelationRow {
      src: NodeId::Address(src.to_string()),
      dst: NodeId::Address(dst.to_string()),
      tx_hash: format!("{}{}", src, dst),
      height: 1,
      timestamp: 0,
      input_value: value,
      output_value: value,
      no_txs: 1,
      estimated_value: value,
      neighbor_received: 0,
      neighbor_spent: 0,
    }
  }

  fn address(id: &str) -> NodeId {
    NodeId::Address(id.to_string())
  }

  fn store() -> InMemoryGraphStore {
    InMemoryGraphStore::from_snapshot(GraphSnapshot {
      currency: "btc".to_string(),
      nodes: vec![record(address("A")), record(address("B"))],
      relations: vec![relation("A", "B", 1), relation("A", "C", 2), relation("A", "D", 3), relation("B", "A", 4)],
      entity_addresses: BTreeMap::new(),
    })
  }

  #[tokio::test]
  async fn test_pages_through_relations_in_insertion_order() {
    let store = store();
    let first = store.relations("btc", &address("A"), Direction::Out, None, 2).await.unwrap();
    assert_eq!(first.rows.iter().map(|r| r.dst.id_string()).collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(first.next_page.as_deref(), Some("2"));

    let second = store.relations("btc", &address("A"), Direction::Out, first.next_page, 2).await.unwrap();
    assert_eq!(second.rows.len(), 1);
    assert_eq!(second.next_page, None);

    let incoming = store.relations("btc", &address("A"), Direction::In, None, 10).await.unwrap();
    assert_eq!(incoming.rows, vec![relation("B", "A", 4)]);
  }

  #[tokio::test]
  async fn test_endpoints_without_records_resolve_to_none() {
    let store = store();
    assert!(store.resolve_node("btc", &address("A")).await.unwrap().is_some());
    assert_eq!(store.resolve_node("btc", &address("C")).await.unwrap(), None);
    assert_eq!(store.resolve_node("ltc", &address("A")).await.unwrap(), None);
    assert_eq!(store.graph("btc").unwrap().get_node_count(), 4);
  }

  #[tokio::test]
  async fn test_rejects_malformed_store_token() {
    let err = store()
      .relations("btc", &address("A"), Direction::Out, Some("x".to_string()), 2)
      .await
      .unwrap_err();
    assert!(matches!(err, TraceError::InvalidFilter(_)));
  }

  #[test]
  fn test_indices_survive_serde_round_trip() {
    let graph = store().graph("btc").unwrap().clone();
    let json = serde_json::to_string(&graph).unwrap();
    let mut restored: TransactionGraph = serde_json::from_str(&json).unwrap();
    restored.rebuild_indices();
    assert!(restored.record(&address("B")).is_some());
    assert_eq!(restored.relations_of(&address("A"), Direction::Out).len(), 3);
  }
}
