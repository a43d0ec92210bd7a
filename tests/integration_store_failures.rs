mod common;

use std::sync::Arc;

use async_trait::async_trait;
use athar::config::TracerConfig;
use athar::error::TraceError;
use athar::error::TraceResult;
use athar::model::Direction;
use athar::model::Label;
use athar::model::NodeId;
use athar::model::NodeRecord;
use athar::search::SearchRequest;
use athar::storage::GraphStore;
use athar::storage::LabelStore;
use athar::storage::RelationPage;
use athar::storage::in_memory::InMemoryGraphStore;
use common::BTC;
use common::GraphBuilder;
use common::address;
use mockall::mock;
use mockall::predicate::eq;
use tokio_util::sync::CancellationToken;

mock! {
    pub Store {}

    #[async_trait]
    impl GraphStore for Store {
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

mock! {
    pub Labels {}

    #[async_trait]
    impl LabelStore for Labels {
        async fn labels_for(&self, currency: &str, id: &NodeId) -> TraceResult<Vec<Label>>;
    }
}

/// Records and first relation page of a small graph served through the mock.
fn fixture() -> (InMemoryGraphStore, NodeId, NodeId) {
    let (a1, b1) = (address("A1"), address("B1"));
    let (graph, _) = GraphBuilder::new().edge(&a1, &b1, BTC, 10).edge(&b1, &address("C1"), BTC, 20).build();
    (graph, a1, b1)
}

#[tokio::test]
async fn test_relation_store_outage_fails_the_search_with_location() {
    let (graph, a1, b1) = fixture();
    let graph = Arc::new(graph);

    let mut store = MockStore::new();
    let records = graph.clone();
    store
        .expect_resolve_node()
        .returning(move |currency, id| futures::executor::block_on(records.resolve_node(currency, id)));
    let pages = graph.clone();
    store
        .expect_relations()
        .with(eq("btc"), eq(a1.clone()), eq(Direction::Out), eq(None::<String>), eq(100usize))
        .times(1)
        .returning(move |currency, id, direction, page, page_size| {
            futures::executor::block_on(pages.relations(currency, id, direction, page, page_size))
        });
    store
        .expect_relations()
        .with(eq("btc"), eq(b1.clone()), eq(Direction::Out), eq(None::<String>), eq(100usize))
        .times(1)
        .returning(|_, _, _, _, _| Err(TraceError::StoreUnavailable("column store timeout".to_string())));

    let mut labels = MockLabels::new();
    labels.expect_labels_for().never();

    let traversal =
        common::traversal_with(Arc::new(store), Arc::new(labels), common::converter(&[]), TracerConfig::default());
    let mut request = SearchRequest::new("btc", vec![a1], Direction::Out);
    request.depth = 3;

    let err = traversal.search(&request, &CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.root(), &TraceError::StoreUnavailable("column store timeout".to_string()));
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("node address:B1, depth 1"));
}

#[tokio::test]
async fn test_label_store_outage_is_fatal_when_tags_are_requested() {
    let (graph, a1, _) = fixture();
    let mut labels = MockLabels::new();
    labels
        .expect_labels_for()
        .returning(|_, _| Err(TraceError::StoreUnavailable("label service down".to_string())));

    let traversal =
        common::traversal_with(Arc::new(graph), Arc::new(labels), common::converter(&[]), TracerConfig::default());
    let mut request = SearchRequest::new("btc", vec![a1.clone()], Direction::Out);
    request.with_tags = true;

    let err = traversal.search(&request, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.root(), &TraceError::StoreUnavailable("label service down".to_string()));
    match err {
        TraceError::AtNode { node, depth, .. } => assert_eq!((node, depth), (a1, 0)),
        other => panic!("expected a located error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_errors_are_not_retried() {
    let mut store = MockStore::new();
    store
        .expect_resolve_node()
        .times(1)
        .returning(|_, _| Err(TraceError::StoreUnavailable("refused".to_string())));

    let traversal = common::traversal_with(
        Arc::new(store),
        Arc::new(MockLabels::new()),
        common::converter(&[]),
        TracerConfig::default(),
    );
    let request = SearchRequest::new("btc", vec![address("A1")], Direction::In);

    let err = traversal.search(&request, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.root(), &TraceError::StoreUnavailable("refused".to_string()));
}
