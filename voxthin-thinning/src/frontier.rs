//! Incremental border frontier
//!
//! Six direction-indexed worklists of voxel coordinates plus a dense grid of
//! membership masks. The lists hold exactly the voxels where a free pair may
//! currently exist in the corresponding direction; the membership grid keeps
//! marking idempotent so a voxel is never queued twice for one direction.

use crate::Direction;
use itertools::iproduct;
use voxthin_core::{Grid3, Vec3i, Vec3u};

/// Direction-indexed collapse worklists over a dense membership grid
#[derive(Debug, Clone)]
pub struct BorderFrontier {
    lists: [Vec<Vec3i>; 6],
    membership: Grid3<u8>,
}

impl BorderFrontier {
    /// Create an empty frontier covering a grid of the given cell dimensions
    pub fn new(dims: Vec3u) -> Self {
        Self {
            lists: Default::default(),
            membership: Grid3::new(dims.x, dims.y, dims.z, 0),
        }
    }

    fn bit(direction: Direction) -> u8 {
        1 << direction.index()
    }

    /// Whether `v` is currently listed for `direction`
    pub fn is_marked(&self, direction: Direction, v: Vec3i) -> bool {
        self.membership[v] & Self::bit(direction) != 0
    }

    /// Add `v` to the direction's list; idempotent
    pub fn mark(&mut self, direction: Direction, v: Vec3i) {
        let bit = Self::bit(direction);
        let mask = &mut self.membership[v];
        if *mask & bit == 0 {
            *mask |= bit;
            self.lists[direction.index()].push(v);
        }
    }

    /// Remove `v` from the direction's list; idempotent
    pub fn unmark(&mut self, direction: Direction, v: Vec3i) {
        let bit = Self::bit(direction);
        let mask = &mut self.membership[v];
        if *mask & bit != 0 {
            *mask &= !bit;
            let list = &mut self.lists[direction.index()];
            if let Some(pos) = list.iter().position(|&w| w == v) {
                list.swap_remove(pos);
            }
        }
    }

    /// The current worklist for one direction
    pub fn list(&self, direction: Direction) -> &[Vec3i] {
        &self.lists[direction.index()]
    }

    /// Total number of list entries across all six directions
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// Whether every direction's list is empty
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Drop all entries and membership marks
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
        self.membership.fill(0);
    }

    /// Incrementally resynchronize the lists with the border predicate
    ///
    /// `touched` is the set of cells mutated since the last rebuild. Stale
    /// entries are dropped by re-testing every listed voxel, and fresh ones
    /// are discovered by probing the touched cells and their neighbors within
    /// the free-pair stencil: all offsets with at most two nonzero
    /// components, since edge rules reach across plane diagonals. Cost is
    /// proportional to the live lists plus |touched|, never to grid volume.
    pub fn rebuild<F>(&mut self, touched: &[Vec3i], is_border: F)
    where
        F: Fn(Direction, Vec3i) -> bool,
    {
        for direction in Direction::ALL {
            let bit = Self::bit(direction);
            let membership = &mut self.membership;
            self.lists[direction.index()].retain(|&v| {
                if is_border(direction, v) {
                    true
                } else {
                    membership[v] &= !bit;
                    false
                }
            });
        }

        let mut candidates = Vec::with_capacity(touched.len() * 19);
        for &c in touched {
            for (dx, dy, dz) in iproduct!(-1..=1, -1..=1, -1..=1) {
                if dx * dx + dy * dy + dz * dz > 2 {
                    continue;
                }
                let v = c + Vec3i::new(dx, dy, dz);
                if self.membership.contains(v) {
                    candidates.push(v);
                }
            }
        }
        candidates.sort_unstable_by_key(|v| (v.z, v.y, v.x));
        candidates.dedup();

        for &v in &candidates {
            for direction in Direction::ALL {
                if is_border(direction, v) {
                    self.mark(direction, v);
                }
            }
        }
    }
}
