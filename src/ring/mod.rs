//! The partition ring: maps keys to the set of replica nodes that should store them.
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{event, instrument, Level};

use crate::{
    config::RingConfig,
    error::{Error, Result},
    node::{init_nodes, Node},
};
use hash::{key_hash, pow2, HASH_BITS};

pub mod hash;
pub mod partition_table;

/// A zone-aware partition ring.
///
/// Instead of hashing keys against the nodes themselves (which moves almost every key around
/// whenever the node count changes), the 32 bit hash space is split into `2^partition_power`
/// partitions and a precomputed table says which node owns each partition.
/// The top `partition_power` bits of a key's hash select its partition:
///
/// hash("2") = 3357438605 = 0b1100_1000_0001_1110_....
/// partition_power = 4  ->  partition = 0b1100 = 12  ->  primary node = partitions[12]
///
/// Additional replicas are found by walking forward through the table (wrapping around at the end)
/// until a slot points to a node that was not picked yet and that lives in a zone that was not
/// picked yet either. Losing a whole zone then never loses every copy of a key.
///
/// When there are fewer zones than replicas, the zone constraint can't be satisfied.
/// After a full wrap of the table without a hit the walk drops the zone constraint and only
/// requires a node that was not picked yet.
///
/// The ring is immutable once built. Changing the topology means building a new ring.
/// Lookups only need `&self`, so a single ring can be shared between threads.
#[derive(Debug)]
pub struct Ring {
    nodes: Vec<Node>,
    partitions: Vec<usize>,
    replica_count: usize,
    partition_power: u32,
    partition_shift: u32,
    zone_count: usize,
    populated_zones: usize,
}

impl Ring {
    /// Builds `node_count` nodes spread round-robin across `zone_count` zones and a ring on top of them
    pub fn new(
        node_count: usize,
        zone_count: usize,
        partition_power: u32,
        replica_count: usize,
    ) -> Result<Self> {
        let nodes = init_nodes(node_count, zone_count)?;
        Self::with_nodes(nodes, zone_count, partition_power, replica_count)
    }

    /// Builds a ring over nodes created by the caller. Node ids must be exactly `0..nodes.len()`, in order.
    pub fn with_nodes(
        nodes: Vec<Node>,
        zone_count: usize,
        partition_power: u32,
        replica_count: usize,
    ) -> Result<Self> {
        Self::with_rng(
            nodes,
            zone_count,
            partition_power,
            replica_count,
            &mut rand::thread_rng(),
        )
    }

    /// Builds a ring from a [`RingConfig`]. If the config carries a seed, the partition table
    /// is shuffled deterministically.
    pub fn from_config(config: &RingConfig) -> Result<Self> {
        let nodes = init_nodes(config.node_count, config.zone_count)?;
        match config.seed {
            Some(seed) => Self::with_rng(
                nodes,
                config.zone_count,
                config.partition_power,
                config.replica_count,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => Self::with_nodes(
                nodes,
                config.zone_count,
                config.partition_power,
                config.replica_count,
            ),
        }
    }

    /// Same as [`Ring::with_nodes`] but the partition table is shuffled with the provided random source
    #[instrument(name = "ring::build", level = "info", skip(nodes, rng), fields(node_count = nodes.len()))]
    pub fn with_rng<R: Rng>(
        nodes: Vec<Node>,
        zone_count: usize,
        partition_power: u32,
        replica_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        validate(&nodes, zone_count, partition_power, replica_count)?;

        let partitions = partition_table::build(partition_power, nodes.len(), rng)?;
        let populated_zones = nodes.iter().map(|n| n.zone).collect::<HashSet<_>>().len();
        let effective_power = if partition_power > 1 {
            partition_power
        } else {
            0
        };

        let ring = Self {
            nodes,
            partitions,
            replica_count,
            partition_power,
            partition_shift: HASH_BITS - effective_power,
            zone_count,
            populated_zones,
        };
        ring.report_imbalance();

        event!(
            Level::INFO,
            "ring built with {} nodes, {} zones, {} partitions and {} replicas",
            ring.node_count(),
            ring.zone_count(),
            ring.partition_count(),
            ring.replica_count()
        );

        Ok(ring)
    }

    /// Returns the `replica_count` nodes responsible for `key`, primary first.
    ///
    /// The returned nodes never repeat and are spread over distinct zones whenever there are
    /// at least as many zones as replicas. Integer keys are expected to be passed in their
    /// decimal form (ie: `ring.get_nodes(42.to_string())`).
    pub fn get_nodes(&self, key: impl AsRef<[u8]>) -> Vec<&Node> {
        let mut part = self.primary_partition(key);
        let primary = self.partitions[part];

        let mut node_ids = Vec::with_capacity(self.replica_count);
        let mut chosen_ids = HashSet::with_capacity(self.replica_count);
        let mut chosen_zones = HashSet::with_capacity(self.replica_count);
        node_ids.push(primary);
        chosen_ids.insert(primary);
        chosen_zones.insert(self.nodes[primary].zone);

        for _ in 1..self.replica_count {
            let zone_aware = if chosen_zones.len() < self.populated_zones {
                next_replica(
                    &self.partitions,
                    &self.nodes,
                    part,
                    &chosen_ids,
                    Some(&chosen_zones),
                )
            } else {
                None
            };

            let found = zone_aware.or_else(|| {
                next_replica(&self.partitions, &self.nodes, part, &chosen_ids, None)
            });

            // construction guarantees at least `replica_count` distinct ids in the table
            let Some(found) = found else {
                event!(
                    Level::ERROR,
                    "unable to find replica {} - partition table has too few distinct nodes",
                    node_ids.len()
                );
                break;
            };

            part = found;
            let node_id = self.partitions[part];
            node_ids.push(node_id);
            chosen_ids.insert(node_id);
            chosen_zones.insert(self.nodes[node_id].zone);
        }

        node_ids.into_iter().map(|id| &self.nodes[id]).collect()
    }

    /// The partition a key hashes into, ie: the top `partition_power` bits of its hash
    pub fn primary_partition(&self, key: impl AsRef<[u8]>) -> usize {
        (u64::from(key_hash(key.as_ref())) >> self.partition_shift) as usize
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zone_count
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn replica_count(&self) -> usize {
        self.replica_count
    }

    /// The partition power this ring was built with (powers `<= 1` produce a single partition)
    pub fn partition_power(&self) -> u32 {
        self.partition_power
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The partition -> node id table
    pub fn partitions(&self) -> &[usize] {
        &self.partitions
    }

    /// How many partitions each node owns, indexed by node id
    pub fn partitions_per_node(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for node_id in self.partitions.iter() {
            counts[*node_id] += 1;
        }
        counts
    }

    /// How many nodes live in each zone, indexed by zone
    pub fn nodes_per_zone(&self) -> Vec<usize> {
        let mut counts = vec![0; self.zone_count];
        for node in self.nodes.iter() {
            counts[node.zone] += 1;
        }
        counts
    }

    fn report_imbalance(&self) {
        if self.partition_count() % self.node_count() != 0 {
            event!(
                Level::WARN,
                "{} partitions can't be split evenly across {} nodes - ownership is only approximately balanced",
                self.partition_count(),
                self.node_count()
            );
        }

        if self.node_count() % self.zone_count != 0 {
            event!(
                Level::WARN,
                "{} nodes can't be split evenly across {} zones - zones are only approximately balanced",
                self.node_count(),
                self.zone_count
            );
        }
    }
}

/// Walks the table forward from `start` (inclusive, wrapping around) and returns the first partition whose
/// node is not in `excluded_ids` and, if `excluded_zones` is provided, whose zone is not in `excluded_zones`.
///
/// At most one full wrap of the table is visited. Returns [`None`] if no partition qualifies.
fn next_replica(
    partitions: &[usize],
    nodes: &[Node],
    start: usize,
    excluded_ids: &HashSet<usize>,
    excluded_zones: Option<&HashSet<usize>>,
) -> Option<usize> {
    let len = partitions.len();
    (0..len).map(|offset| (start + offset) % len).find(|part| {
        let node_id = partitions[*part];
        !excluded_ids.contains(&node_id)
            && excluded_zones.map_or(true, |zones| !zones.contains(&nodes[node_id].zone))
    })
}

fn validate(
    nodes: &[Node],
    zone_count: usize,
    partition_power: u32,
    replica_count: usize,
) -> Result<()> {
    if nodes.is_empty() {
        return Err(Error::invalid_config("node_count must be greater than 0"));
    }

    if zone_count == 0 {
        return Err(Error::invalid_config("zone_count must be greater than 0"));
    }

    if replica_count == 0 {
        return Err(Error::invalid_config("replica_count must be greater than 0"));
    }

    if replica_count > nodes.len() {
        return Err(Error::invalid_config(format!(
            "replica_count ({}) can't be greater than node_count ({})",
            replica_count,
            nodes.len()
        )));
    }

    if partition_power > HASH_BITS {
        return Err(Error::invalid_config(format!(
            "partition_power ({}) can't be greater than the hash width ({} bits)",
            partition_power, HASH_BITS
        )));
    }

    if pow2(partition_power) < replica_count as u64 {
        return Err(Error::invalid_config(format!(
            "{} partitions can't hold {} distinct replicas",
            pow2(partition_power),
            replica_count
        )));
    }

    for (index, node) in nodes.iter().enumerate() {
        if node.id != index {
            return Err(Error::invalid_config(format!(
                "node ids must be 0..{} in order - found id {} at position {}",
                nodes.len(),
                node.id,
                index
            )));
        }

        if node.zone >= zone_count {
            return Err(Error::invalid_config(format!(
                "node {} is in zone {} but the ring only has {} zones",
                node.id, node.zone, zone_count
            )));
        }
    }

    Ok(())
}
