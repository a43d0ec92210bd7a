use async_trait::async_trait;
use mockall::mock;

use crate::error::TraceResult;
use crate::model::Direction;
use crate::model::Label;
use crate::model::NodeId;
use crate::model::NodeRecord;
use crate::storage::GraphStore;
use crate::storage::LabelStore;
use crate::storage::RelationPage;

// Mock for graph store reads
mock! {
    pub GraphStore {}

    #[async_trait]
    impl GraphStore for GraphStore {
        async fn resolve_node(&self, currency: &str, id: &NodeId) -> TraceResult<Option<NodeRecord>>;
        async fn relations(
            &self,
            currency: &str,
            id: &NodeId,
            direction: Direction,
            page: Option<String>,
            page_size: usize,
        ) -> TraceResult<RelationPage>;
        async fn entity_addresses(&self, currency: &str, entity: u64) -> TraceResult<Vec<String>>;
    }
}

// Mock for label lookups
mock! {
    pub LabelStore {}

    #[async_trait]
    impl LabelStore for LabelStore {
        async fn labels_for(&self, currency: &str, id: &NodeId) -> TraceResult<Vec<Label>>;
    }
}

/// Label store that knows no labels.
pub fn create_empty_label_store() -> MockLabelStore {
    let mut mock = MockLabelStore::new();
    mock.expect_labels_for().returning(|_, _| Ok(vec![]));
    mock
}
