pub mod filter;
pub mod label;
pub mod node;
pub mod path;
pub mod relation;
pub mod value;

pub use filter::FieldCurrency;
pub use filter::FilterField;
pub use filter::RelationFilter;
pub use filter::ValueRange;
pub use label::Label;
pub use node::Node;
pub use node::NodeId;
pub use node::NodeRecord;
pub use node::NodeType;
pub use node::TxSummary;
pub use path::PathNode;
pub use path::SearchForest;
pub use path::StartNode;
pub use relation::Direction;
pub use relation::Relation;
pub use relation::RelationRow;
pub use value::MonetaryValue;
