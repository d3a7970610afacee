//! Builds the partition -> node assignment table used by [`super::Ring`]
use rand::Rng;
use tracing::instrument;

use super::hash::pow2;
use crate::error::{Error, Result};

/// Creates a table with `2^partition_power` slots and assigns each slot to a node id in `[0, node_count)`.
///
/// Slots are first seeded round-robin (`slot % node_count`), which gives every node exactly the same
/// number of partitions whenever `node_count` divides the table length. The table is then shuffled
/// so that adjacent slots don't map to adjacent node ids. This matters because replicas are found by
/// walking forward from the primary slot.
#[instrument(level = "debug", skip(rng))]
pub fn build<R: Rng>(
    partition_power: u32,
    node_count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if node_count == 0 {
        return Err(Error::invalid_config(
            "unable to build a partition table without nodes",
        ));
    }

    let total = usize::try_from(pow2(partition_power)).map_err(|_| {
        Error::invalid_config(format!(
            "partition power {} does not fit in memory on this platform",
            partition_power
        ))
    })?;

    let mut table: Vec<usize> = (0..total).map(|slot| slot % node_count).collect();
    shuffle(&mut table, rng);
    Ok(table)
}

/// Fisher-Yates shuffle: walks the slice backwards swapping each slot with one drawn uniformly from `[0, i]`
fn shuffle<T, R: Rng>(arr: &mut [T], rng: &mut R) {
    for i in (1..arr.len()).rev() {
        let j = rng.gen_range(0..=i);
        arr.swap(i, j);
    }
}
