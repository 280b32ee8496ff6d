pub type NodeId = String;

/// Nodes sharing one leaf of the virtual tree, in registry order.
pub type Cluster = Vec<NodeId>;

/// Every cluster of the current topology, addressed by leaf index.
pub type ClusterTable = Vec<Cluster>;
