//! Assembly-free classifiers for closed ways and area relations.

pub mod problems;
pub mod tags;
pub mod topology;

pub use problems::{check_relation, Violation, ViolationKind};
pub use tags::{classify_tags, Category, CategoryCounts};
pub use topology::{classify_topology, Topology};
