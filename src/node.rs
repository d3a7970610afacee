//! Storage nodes and the zone layout they are placed on
use bytes::Bytes;
use serde::Serialize;

use crate::{
    error::{Error, Result},
    storage_engine::{in_memory::InMemory, StorageEngine},
};

/// A storage target owned by a [`crate::Ring`].
///
/// `id` is the node's index in the ring's node list and `zone` is the failure domain
/// (rack, datacenter...) it lives in. Multiple nodes share a zone.
///
/// Each node also carries its own [`InMemory`] store that callers can use to simulate writes
/// against the replicas returned by a lookup. The store takes no part in placement decisions
/// nor in equality. Clones of a node share the same store.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub id: usize,
    pub zone: usize,
    #[serde(skip)]
    store: InMemory,
}

impl Node {
    pub fn new(id: usize, zone: usize) -> Self {
        Self {
            id,
            zone,
            store: InMemory::default(),
        }
    }

    /// Stores a new key on this node. An existing key is never overwritten,
    /// see [`StorageEngine::create`]
    pub fn set(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.store.create(key, value)
    }

    /// Overrides an existing key on this node, see [`StorageEngine::update`]
    pub fn update(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.store.update(key, value)
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.store.get(key)
    }

    pub fn store(&self) -> &InMemory {
        &self.store
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.zone == other.zone
    }
}

impl Eq for Node {}

/// Creates `node_count` nodes with ids `0..node_count`, spreading them over the zones round-robin.
///
/// Zones cycle `0, 1, .., zone_count - 1, 0, 1, ..` across increasing node ids, so every zone holds
/// exactly `node_count / zone_count` nodes when `zone_count` divides `node_count`.
pub fn init_nodes(node_count: usize, zone_count: usize) -> Result<Vec<Node>> {
    if zone_count == 0 {
        return Err(Error::invalid_config("zone_count must be greater than 0"));
    }

    Ok((0..node_count)
        .map(|id| Node::new(id, id % zone_count))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{init_nodes, Node};
    use crate::error::Error;
    use bytes::Bytes;
    use std::collections::HashMap;

    #[test]
    fn zones_cycle_across_ids() {
        let nodes = init_nodes(7, 3).unwrap();
        let zones: Vec<usize> = nodes.iter().map(|n| n.zone).collect();
        let ids: Vec<usize> = nodes.iter().map(|n| n.id).collect();

        assert_eq!(zones, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn zones_are_balanced_when_divisible() {
        let nodes = init_nodes(256, 16).unwrap();
        let mut per_zone: HashMap<usize, usize> = HashMap::new();
        for node in nodes.iter() {
            *per_zone.entry(node.zone).or_default() += 1;
        }

        assert_eq!(per_zone.len(), 16);
        assert!(per_zone.values().all(|count| *count == 16));
    }

    #[test]
    fn zero_zones_is_rejected() {
        assert!(matches!(
            init_nodes(10, 0).err().unwrap(),
            Error::InvalidConfig { .. }
        ));
    }

    #[test]
    fn set_then_update() {
        let node = Node::new(0, 0);
        let key = Bytes::from("Marcus");
        node.set(key.clone(), Bytes::from("IPA")).unwrap();

        let err = node.set(key.clone(), Bytes::from("Stout")).err().unwrap();
        assert!(err.is_key_exists());

        node.update(key.clone(), Bytes::from("Stout")).unwrap();
        assert_eq!(node.get(&key).unwrap().unwrap(), Bytes::from("Stout"));
    }

    #[test]
    fn equality_ignores_store_contents() {
        let a = Node::new(1, 1);
        let b = Node::new(1, 1);
        a.set(Bytes::from("k"), Bytes::from("v")).unwrap();
        assert_eq!(a, b);
    }
}
