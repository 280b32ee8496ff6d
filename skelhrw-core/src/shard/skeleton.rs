use tracing::{debug, trace, warn};

use crate::config::Options;
use crate::errors::{ConfigurationError, LookupError};
use crate::shard::hasher::{Fnv1a64, HashPrimitive};
use crate::shard::hrw::highest_random_weight;
use crate::shard::partition::{NodeRegistry, partition, tree_depth};
use crate::shard::tree::{Branch, select_branch};
use crate::shard::types::{ClusterTable, NodeId};

/// A key whose owner differs between two topologies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remap {
    pub key: String,
    pub from: NodeId,
    pub to: NodeId,
}

/// Rendezvous hashing over a skeleton of clusters.
///
/// Nodes are cut into fixed-size clusters in registration order. A lookup
/// walks a virtual `fan_out`-ary tree whose leaves are the clusters, then
/// runs plain HRW inside the chosen cluster, so its cost grows with
/// `fan_out * log_fan_out(clusters) + cluster_size` instead of the node
/// count.
///
/// Topology changes take `&mut self` and rebuild the cluster table from
/// scratch; lookups take `&self` and can run from any number of readers.
#[derive(Debug, Clone)]
pub struct SkeletonRendezvous<H = Fnv1a64> {
    options: Options<H>,
    registry: NodeRegistry,
    clusters: ClusterTable,
    depth: usize,
}

impl<H: HashPrimitive> SkeletonRendezvous<H> {
    /// Creates an empty skeleton after validating `options`.
    pub fn new(options: Options<H>) -> Result<Self, ConfigurationError> {
        options.validate()?;

        Ok(Self { options, registry: NodeRegistry::new(), clusters: Vec::new(), depth: 0 })
    }

    /// Registers `nodes` and rebuilds the clusters.
    ///
    /// Duplicates, both within `nodes` and against already registered nodes,
    /// are ignored. Registration is cumulative: earlier nodes stay in place
    /// and new ones are appended after them.
    pub fn set_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = self.registry.extend(nodes);
        debug!(added, "registering nodes");
        self.rebuild();
    }

    /// Unregisters `nodes` and rebuilds every cluster from the remaining
    /// registry.
    ///
    /// Partitioning is positional, so clusters that held none of the removed
    /// nodes may still change shape.
    pub fn remove_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed = self.registry.remove(nodes);
        debug!(removed, "unregistering nodes");
        self.rebuild();
    }

    /// Replaces the whole registry with `nodes`.
    pub fn replace_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.clear();
        self.set_nodes(nodes);
    }

    /// Returns the node that owns `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skelhrw_core::{Options, SkeletonRendezvous};
    ///
    /// let mut skeleton = SkeletonRendezvous::new(Options::default()).unwrap();
    /// skeleton.set_nodes(["cache-1", "cache-2", "cache-3", "cache-4"]);
    ///
    /// let owner = skeleton.find_node("user:1001").unwrap();
    /// assert_eq!(skeleton.find_node("user:1001").unwrap(), owner);
    /// ```
    pub fn find_node(&self, key: &str) -> Result<&str, LookupError> {
        let mut hasher = self.options.hasher.clone();
        let index = self.locate(&mut hasher, key)?;

        highest_random_weight(&mut hasher, key, &self.clusters[index]).ok_or_else(|| {
            warn!(cluster = index, "resolved cluster is empty");
            LookupError::NodeNotFound(index)
        })
    }

    /// Returns the virtual-tree path `key` takes.
    pub fn branch(&self, key: &str) -> Result<Branch, LookupError> {
        self.ensure_populated()?;
        let mut hasher = self.options.hasher.clone();
        Ok(select_branch(&mut hasher, key, self.depth, self.options.fan_out))
    }

    /// Returns the index of the cluster responsible for `key`.
    pub fn cluster_index(&self, key: &str) -> Result<usize, LookupError> {
        let mut hasher = self.options.hasher.clone();
        self.locate(&mut hasher, key)
    }

    /// Lists every key in `keys` whose owner differs between `old` and `new`.
    ///
    /// Keys that cannot be placed in either topology are skipped.
    pub fn diff<'k, I>(old: &Self, new: &Self, keys: I) -> Vec<Remap>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter()
            .filter_map(|key| {
                let from = old.find_node(key).ok()?;
                let to = new.find_node(key).ok()?;
                (from != to).then(|| Remap { key: key.to_owned(), from: from.to_owned(), to: to.to_owned() })
            })
            .collect()
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.registry.as_slice()
    }

    pub fn clusters(&self) -> &ClusterTable {
        &self.clusters
    }

    /// Levels of the virtual tree, i.e. digests per lookup divided by fan-out.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn options(&self) -> &Options<H> {
        &self.options
    }

    fn ensure_populated(&self) -> Result<(), LookupError> {
        if self.clusters.is_empty() {
            warn!("lookup against an empty topology");
            return Err(LookupError::EmptyTopology);
        }
        Ok(())
    }

    fn locate(&self, hasher: &mut H, key: &str) -> Result<usize, LookupError> {
        self.ensure_populated()?;

        let branch = select_branch(hasher, key, self.depth, self.options.fan_out);
        let index = branch
            .resolve(self.options.fan_out, self.clusters.len())
            .ok_or(LookupError::EmptyTopology)?;

        trace!(key, %branch, cluster = index, "resolved branch");
        Ok(index)
    }

    fn rebuild(&mut self) {
        self.clusters = partition(
            self.registry.as_slice(),
            self.options.cluster_size,
            self.options.min_cluster_size,
        );
        self.depth = tree_depth(self.clusters.len(), self.options.fan_out);

        debug!(
            nodes = self.registry.len(),
            clusters = self.clusters.len(),
            depth = self.depth,
            "rebuilt skeleton"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> SkeletonRendezvous {
        SkeletonRendezvous::new(Options::default().fan_out(3).cluster_size(2).min_cluster_size(2))
            .unwrap()
    }

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_rejects_invalid_options() {
        let err = SkeletonRendezvous::new(Options::default().fan_out(1)).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidFanOut(1));
    }

    #[test]
    fn starts_empty() {
        let sr = skeleton();
        assert!(sr.is_empty());
        assert_eq!(sr.cluster_count(), 0);
        assert_eq!(sr.depth(), 0);
        assert_eq!(sr.find_node("k"), Err(LookupError::EmptyTopology));
        assert_eq!(sr.branch("k"), Err(LookupError::EmptyTopology));
        assert_eq!(sr.cluster_index("k"), Err(LookupError::EmptyTopology));
    }

    #[test]
    fn set_nodes_builds_two_clusters() {
        let mut sr = skeleton();
        sr.set_nodes(["jg1", "jg2", "jg3", "jg4"]);

        assert_eq!(sr.cluster_count(), 2);
        assert_eq!(sr.clusters(), &vec![ids(&["jg1", "jg2"]), ids(&["jg3", "jg4"])]);
        assert_eq!(sr.depth(), 1);
    }

    #[test]
    fn set_nodes_ignores_duplicates() {
        let mut sr = skeleton();
        sr.set_nodes(["jg1", "jg1", "jg2", "jg3", "jg4"]);

        assert_eq!(sr.clusters(), &vec![ids(&["jg1", "jg2"]), ids(&["jg3", "jg4"])]);
    }

    #[test]
    fn set_nodes_is_cumulative() {
        let mut sr = skeleton();
        sr.set_nodes(["jg1", "jg2"]);
        sr.set_nodes(["jg2", "jg3", "jg4"]);

        assert_eq!(sr.nodes(), ids(&["jg1", "jg2", "jg3", "jg4"]).as_slice());
        assert_eq!(sr.cluster_count(), 2);
    }

    #[test]
    fn remove_nodes_collapses_to_one_cluster() {
        let mut sr = skeleton();
        sr.set_nodes(["jg1", "jg2", "jg3", "jg4"]);
        sr.remove_nodes(["jg2", "jg3"]);

        assert_eq!(sr.cluster_count(), 1);
        assert_eq!(sr.clusters(), &vec![ids(&["jg1", "jg4"])]);
        assert_eq!(sr.nodes(), ids(&["jg1", "jg4"]).as_slice());
        assert_eq!(sr.depth(), 0);
    }

    #[test]
    fn remove_every_node_empties_topology() {
        let mut sr = skeleton();
        sr.set_nodes(["jg1", "jg2"]);
        sr.remove_nodes(["jg1", "jg2"]);

        assert!(sr.is_empty());
        assert_eq!(sr.find_node("k"), Err(LookupError::EmptyTopology));
    }

    #[test]
    fn replace_nodes_resets_registry() {
        let mut sr = skeleton();
        sr.set_nodes(["a", "b", "c", "d"]);
        sr.replace_nodes(["x", "y"]);

        assert_eq!(sr.nodes(), ids(&["x", "y"]).as_slice());
        assert_eq!(sr.clusters(), &vec![ids(&["x", "y"])]);
    }

    #[test]
    fn single_cluster_uses_plain_hrw() {
        let mut sr = skeleton();
        sr.set_nodes(["only-a", "only-b"]);

        let mut hasher = Fnv1a64::new();
        for i in 0..50 {
            let key = format!("k{i}");
            let expected = highest_random_weight(&mut hasher, &key, sr.clusters()[0].as_slice());
            assert_eq!(sr.find_node(&key).ok(), expected);
            assert_eq!(sr.branch(&key).unwrap().depth(), 0);
        }
    }

    #[test]
    fn find_node_returns_member_of_resolved_cluster() {
        let mut sr = skeleton();
        sr.set_nodes((0..20).map(|i| format!("node-{i}")));

        for i in 0..200 {
            let key = format!("object-{i}");
            let index = sr.cluster_index(&key).unwrap();
            let node = sr.find_node(&key).unwrap();
            assert!(sr.clusters()[index].iter().any(|n| n == node));
        }
    }

    #[test]
    fn diff_reports_moved_keys_only() {
        let mut old = skeleton();
        old.set_nodes(["a", "b", "c", "d"]);
        let mut new = old.clone();
        new.remove_nodes(["b", "c"]);

        let keys: Vec<String> = (0..100).map(|i| format!("key-{i}")).collect();
        let remaps = SkeletonRendezvous::diff(&old, &new, keys.iter().map(String::as_str));

        for remap in &remaps {
            assert_ne!(remap.from, remap.to);
            assert_eq!(old.find_node(&remap.key).unwrap(), remap.from);
            assert_eq!(new.find_node(&remap.key).unwrap(), remap.to);
        }
        // Every key owned by a removed node must have moved.
        for key in &keys {
            let owner = old.find_node(key).unwrap();
            if owner == "b" || owner == "c" {
                assert!(remaps.iter().any(|r| &r.key == key));
            }
        }
    }
}
