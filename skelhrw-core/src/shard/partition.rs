use std::collections::HashSet;

use crate::shard::types::{Cluster, ClusterTable, NodeId};

/// Ordered, duplicate-free list of node identifiers.
///
/// Order matters: the partitioner cuts clusters out of the registry in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every identifier not yet registered, keeping first-seen order.
    ///
    /// Returns how many identifiers were added.
    pub fn extend<I, S>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<NodeId> = self.nodes.iter().cloned().collect();
        let before = self.nodes.len();

        for node in nodes {
            let node = node.as_ref();
            if !seen.contains(node) {
                seen.insert(node.to_owned());
                self.nodes.push(node.to_owned());
            }
        }

        self.nodes.len() - before
    }

    /// Drops every registered identifier that appears in `removed`.
    ///
    /// Returns how many identifiers were dropped.
    pub fn remove<I, S>(&mut self, removed: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed: HashSet<String> = removed.into_iter().map(|n| n.as_ref().to_owned()).collect();
        let before = self.nodes.len();
        self.nodes.retain(|node| !removed.contains(node));
        before - self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Cuts `nodes` into contiguous clusters of `cluster_size`.
///
/// When more than one cluster is produced and the trailing one holds fewer
/// than `min_cluster_size` nodes, it is dissolved and its members are dealt
/// round-robin onto the remaining clusters, starting at cluster 0.
///
/// `cluster_size` must be at least 1.
///
/// # Examples
///
/// ```
/// use skelhrw_core::shard::partition::partition;
///
/// let nodes: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
/// let clusters = partition(&nodes, 2, 2);
/// assert_eq!(clusters, vec![vec!["a", "b", "e"], vec!["c", "d"]]);
/// ```
pub fn partition(nodes: &[NodeId], cluster_size: usize, min_cluster_size: usize) -> ClusterTable {
    let mut clusters: ClusterTable = nodes.chunks(cluster_size).map(<[NodeId]>::to_vec).collect();

    if clusters.len() > 1
        && let Some(last) = clusters.last()
        && last.len() < min_cluster_size
    {
        let orphans: Cluster = clusters.pop().unwrap_or_default();
        let remaining = clusters.len();

        for (i, node) in orphans.into_iter().enumerate() {
            clusters[i % remaining].push(node);
        }
    }

    clusters
}

/// Minimal depth `d` such that `fan_out^d >= cluster_count`.
///
/// Zero or one cluster needs no decisions at all, so the depth is 0.
/// `fan_out` must be at least 2.
pub fn tree_depth(cluster_count: usize, fan_out: usize) -> usize {
    let mut depth = 0;
    let mut leaves: usize = 1;

    while leaves < cluster_count {
        leaves = leaves.saturating_mul(fan_out);
        depth += 1;
    }

    depth
}
