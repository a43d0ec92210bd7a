use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TraceResult;
use crate::model::Label;
use crate::model::NodeId;
use crate::storage::LabelStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEntry {
  pub currency: String,
  #[serde(flatten)]
  pub id:       NodeId,
  pub labels:   Vec<Label>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLabelStore {
  labels: HashMap<(String, NodeId), Vec<Label>>,
}

impl InMemoryLabelStore {
  pub fn new() -> Self { Self::default() }

  pub fn from_entries(entries: impl IntoIterator<Item = LabelEntry>) -> Self {
    let mut store = Self::new();
    for entry in entries {
      store.insert(&entry.currency, entry.id, entry.labels);
    }
    store
  }

  /// Append labels for a node, keeping any already stored.
  pub fn insert(
    &mut self,
    currency: &str,
    id: NodeId,
    labels: Vec<Label>,
  ) {
    self.labels.entry((currency.to_string(), id)).or_default().extend(labels);
  }

  pub fn len(&self) -> usize { self.labels.len() }

  pub fn is_empty(&self) -> bool { self.labels.is_empty() }
}

#[async_trait]
impl LabelStore for InMemoryLabelStore {
  async fn labels_for(
    &self,
    currency: &str,
    id: &NodeId,
  ) -> TraceResult<Vec<Label>> {
    Ok(self.labels.get(&(currency.to_string(), id.clone())).cloned().unwrap_or_default())
  }
}
