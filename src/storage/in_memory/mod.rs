pub mod graph;
pub mod label;

pub use graph::GraphNode;
pub use graph::GraphSnapshot;
pub use graph::InMemoryGraphStore;
pub use graph::TransactionGraph;
pub use label::InMemoryLabelStore;
