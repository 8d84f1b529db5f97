//! Directional thinning controller
//!
//! Orchestrates free-pair testing, collapse application, birth-date
//! recording and frontier maintenance. Each round runs six directional
//! passes in the fixed order −X, +X, −Y, +Y, −Z, +Z. A pass has two phases:
//! a collect phase that tests every listed voxel against the complex as it
//! stood at the start of the pass, and an apply phase where the
//! orchestrating thread clears the collected bits. Snapshot testing makes
//! the pass outcome independent of traversal order, which is what lets the
//! parallel mode produce bit-identical results to the sequential one.

use crate::free_pair::{rule, PairRule};
use crate::{BorderFrontier, Direction};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use voxthin_core::{Axis, CellBits, CubicalComplex, Error, Grid3, Result, Vec3i, Vec3u};

/// Birth-date value of an edge that has not been collapsed
pub const UNSET_BIRTH: i32 = -1;

/// The (cell, bits) set cleared by one collapsed pair; padded with empty bits
type Removal = [(Vec3i, CellBits); 2];

/// Read-only view of everything the free-pair predicate consults
#[derive(Clone, Copy)]
struct FreeTest<'c> {
    complex: &'c CubicalComplex,
    constraint: Option<&'c CubicalComplex>,
    edge_distance: Option<&'c Grid3<Vec3u>>,
    edge_opening: Option<&'c Grid3<Vec3u>>,
}

impl FreeTest<'_> {
    /// Full free-pair predicate: structural freeness and not constrained
    fn is_collapsible(&self, rule: &PairRule) -> bool {
        rule.is_free_in(self.complex) && !self.is_constrained(rule)
    }

    /// Whether any element kind has a collapsible pair at `v` in `direction`
    fn is_border(&self, direction: Direction, v: Vec3i) -> bool {
        direction
            .elements()
            .into_iter()
            .any(|element| self.is_collapsible(&rule(direction, element, v)))
    }

    fn is_constrained(&self, rule: &PairRule) -> bool {
        if let Some(constraint) = self.constraint {
            if rule
                .removed()
                .any(|(cell, bits)| constraint.contains_some(cell, bits))
            {
                return true;
            }
        }
        let (Some(distance), Some(opening)) = (self.edge_distance, self.edge_opening) else {
            return false;
        };
        rule.removed().any(|(cell, bits)| {
            Axis::ALL.iter().any(|&axis| {
                bits.contains_some(CellBits::edge(axis))
                    && is_protected_edge(distance, opening, cell, axis)
            })
        })
    }
}

/// Medial-axis protection rule for an axis edge
///
/// An opening radius is pointwise at least the boundary distance, so a cell
/// where the two meet is the center of a maximal ball. The edge aggregates
/// (max of distance, min of opening over its incident cells) widen the
/// protected set by half a cell so medial curves stay connected.
fn is_protected_edge(
    distance: &Grid3<Vec3u>,
    opening: &Grid3<Vec3u>,
    cell: Vec3i,
    axis: Axis,
) -> bool {
    match (distance.get(cell), opening.get(cell)) {
        (Some(d), Some(o)) => d[axis.index()] >= o[axis.index()],
        _ => false,
    }
}

/// Per-edge aggregate of a voxel map over each edge's incident cells
///
/// The edge along `axis` anchored at a cell touches up to four cells, offset
/// by 0 or −1 along the two other axes; out-of-range cells are skipped.
fn edge_aggregate(map: &Grid3<u32>, empty: u32, combine: fn(u32, u32) -> u32) -> Grid3<Vec3u> {
    let dims = map.dims();
    let mut out = Grid3::new(dims.x, dims.y, dims.z, Vec3u::new(empty, empty, empty));
    for v in map.coords() {
        for axis in Axis::ALL {
            let (lat_a, lat_b) = match axis {
                Axis::X => (Axis::Y.unit(), Axis::Z.unit()),
                Axis::Y => (Axis::X.unit(), Axis::Z.unit()),
                Axis::Z => (Axis::X.unit(), Axis::Y.unit()),
            };
            let mut acc = empty;
            for a in 0..2 {
                for b in 0..2 {
                    if let Some(&value) = map.get(v - lat_a * a - lat_b * b) {
                        acc = combine(acc, value);
                    }
                }
            }
            out[v][axis.index()] = acc;
        }
    }
    out
}

/// Iterative directional collapse of a cubical complex
///
/// Construction binds the inputs and seeds the initial frontier with one
/// full-grid scan; afterwards every round costs time proportional to the
/// live frontier, not to grid volume. The borrowed auxiliary fields are
/// never mutated; the complex is thinned in place.
pub struct ThinningProcess<'a> {
    complex: &'a mut CubicalComplex,
    constraint: Option<&'a CubicalComplex>,
    frontier: BorderFrontier,
    birth_map: Grid3<Vec3i>,
    edge_distance: Option<Grid3<Vec3u>>,
    edge_opening: Option<Grid3<Vec3u>>,
    iteration: u32,
}

impl<'a> ThinningProcess<'a> {
    /// Bind a complex and its auxiliary fields and seed the frontier
    ///
    /// The distance and opening maps only take effect when both are supplied;
    /// any bit set in `constraint` keeps the corresponding bit of the
    /// complex from ever being collapsed.
    ///
    /// # Panics
    /// If any auxiliary field's dimensions differ from the complex's.
    pub fn new(
        complex: &'a mut CubicalComplex,
        distance_map: Option<&Grid3<u32>>,
        opening_map: Option<&Grid3<u32>>,
        constraint: Option<&'a CubicalComplex>,
    ) -> Self {
        let dims = complex.dims();
        if let Some(map) = distance_map {
            assert_eq!(map.dims(), dims, "distance map dimensions must match the complex");
        }
        if let Some(map) = opening_map {
            assert_eq!(map.dims(), dims, "opening map dimensions must match the complex");
        }
        if let Some(cc) = constraint {
            assert_eq!(cc.dims(), dims, "constraint complex dimensions must match the complex");
        }

        let (edge_distance, edge_opening) = match (distance_map, opening_map) {
            (Some(distance), Some(opening)) => (
                Some(edge_aggregate(distance, 0, u32::max)),
                Some(edge_aggregate(opening, u32::MAX, u32::min)),
            ),
            _ => (None, None),
        };

        let mut process = Self {
            complex,
            constraint,
            frontier: BorderFrontier::new(dims),
            birth_map: Grid3::new(
                dims.x,
                dims.y,
                dims.z,
                Vec3i::new(UNSET_BIRTH, UNSET_BIRTH, UNSET_BIRTH),
            ),
            edge_distance,
            edge_opening,
            iteration: 0,
        };
        process.seed_frontier();
        process
    }

    fn free_test(&self) -> FreeTest<'_> {
        FreeTest {
            complex: self.complex,
            constraint: self.constraint,
            edge_distance: self.edge_distance.as_ref(),
            edge_opening: self.edge_opening.as_ref(),
        }
    }

    fn seed_frontier(&mut self) {
        let test = FreeTest {
            complex: &*self.complex,
            constraint: self.constraint,
            edge_distance: self.edge_distance.as_ref(),
            edge_opening: self.edge_opening.as_ref(),
        };
        let frontier = &mut self.frontier;
        for v in test.complex.cells().coords() {
            for direction in Direction::ALL {
                if test.is_border(direction, v) {
                    frontier.mark(direction, v);
                }
            }
        }
    }

    /// Collapse in all six directions until the frontier empties or the
    /// round budget runs out (`None` = unbounded)
    ///
    /// Returns true iff the complex is fully thin on exit; false means only
    /// that the budget was exhausted and the caller may re-invoke.
    pub fn directional_collapse(&mut self, budget: Option<usize>) -> bool {
        self.run(budget, None)
    }

    /// Same contract and bit-identical results as
    /// [`directional_collapse`](Self::directional_collapse), with each pass's
    /// collect phase fanned out over a worker pool of `num_threads` threads
    pub fn parallel_directional_collapse(
        &mut self,
        budget: Option<usize>,
        num_threads: usize,
    ) -> Result<bool> {
        if num_threads == 0 {
            return Err(Error::InvalidData(
                "num_threads must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("voxthin-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        Ok(self.run(budget, Some(&pool)))
    }

    fn run(&mut self, budget: Option<usize>, pool: Option<&ThreadPool>) -> bool {
        let mut remaining = budget;
        while !self.frontier.is_empty() {
            if let Some(rounds) = remaining.as_mut() {
                if *rounds == 0 {
                    break;
                }
                *rounds -= 1;
            }
            self.round(pool);
        }
        self.frontier.is_empty()
    }

    /// One pass in a single direction followed by a frontier rebuild;
    /// returns the number of pairs collapsed
    pub fn collapse_direction(&mut self, direction: Direction) -> usize {
        let mut touched = Vec::new();
        let removals = self.collect_pass(direction);
        let removed = self.apply(&removals, &mut touched);
        self.iteration += 1;
        self.rebuild_frontier(&touched);
        removed
    }

    fn round(&mut self, pool: Option<&ThreadPool>) -> usize {
        let mut touched = Vec::new();
        let mut removed = 0;
        for direction in Direction::ALL {
            let removals = match pool {
                Some(pool) => pool.install(|| self.collect_pass_parallel(direction)),
                None => self.collect_pass(direction),
            };
            removed += self.apply(&removals, &mut touched);
        }
        self.iteration += 1;
        self.rebuild_frontier(&touched);
        removed
    }

    fn collect_pass(&self, direction: Direction) -> Vec<Removal> {
        let test = self.free_test();
        self.frontier
            .list(direction)
            .iter()
            .flat_map(|&v| Self::free_pairs_at(test, direction, v))
            .collect()
    }

    fn collect_pass_parallel(&self, direction: Direction) -> Vec<Removal> {
        let test = self.free_test();
        self.frontier
            .list(direction)
            .par_iter()
            .flat_map_iter(|&v| Self::free_pairs_at(test, direction, v))
            .collect()
    }

    fn free_pairs_at(
        test: FreeTest<'_>,
        direction: Direction,
        v: Vec3i,
    ) -> impl Iterator<Item = Removal> + '_ {
        direction.elements().into_iter().filter_map(move |element| {
            let rule = rule(direction, element, v);
            test.is_collapsible(&rule).then(|| rule.removed_cells())
        })
    }

    fn apply(&mut self, removals: &[Removal], touched: &mut Vec<Vec3i>) -> usize {
        #[cfg(debug_assertions)]
        assert_disjoint_targets(removals);

        let birth = self.iteration as i32;
        for removal in removals {
            for &(cell, bits) in removal {
                if bits.is_empty() {
                    continue;
                }
                self.complex.remove(cell, bits);
                for axis in Axis::ALL {
                    if bits.contains_some(CellBits::edge(axis)) {
                        self.birth_map[cell][axis.index()] = birth;
                    }
                }
                touched.push(cell);
            }
        }
        removals.len()
    }

    fn rebuild_frontier(&mut self, touched: &[Vec3i]) {
        let test = FreeTest {
            complex: &*self.complex,
            constraint: self.constraint,
            edge_distance: self.edge_distance.as_ref(),
            edge_opening: self.edge_opening.as_ref(),
        };
        self.frontier
            .rebuild(touched, |direction, v| test.is_border(direction, v));
    }

    /// The complex being thinned
    pub fn complex(&self) -> &CubicalComplex {
        self.complex
    }

    /// Whether the free-pair predicate currently holds at `v` for `direction`
    pub fn is_border(&self, direction: Direction, v: Vec3i) -> bool {
        self.free_test().is_border(direction, v)
    }

    /// Iteration index each axis edge was collapsed at, [`UNSET_BIRTH`] where
    /// the edge was never removed
    pub fn birth_map(&self) -> &Grid3<Vec3i> {
        &self.birth_map
    }

    /// Consume the process and keep the birth-date map
    pub fn into_birth_map(self) -> Grid3<Vec3i> {
        self.birth_map
    }

    /// Number of completed collapse rounds
    pub fn iteration_count(&self) -> u32 {
        self.iteration
    }

    /// Current worklist for one direction
    pub fn border_list(&self, direction: Direction) -> &[Vec3i] {
        self.frontier.list(direction)
    }

    /// Total frontier size across all six directions
    pub fn border_len(&self) -> usize {
        self.frontier.len()
    }

    /// Whether no direction has collapse candidates left
    pub fn border_is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}

/// Partition contract of a pass: no two collected pairs may clear the same
/// element, otherwise concurrent collection would not be order-free
#[cfg(debug_assertions)]
fn assert_disjoint_targets(removals: &[Removal]) {
    use std::collections::HashMap;

    let mut seen: HashMap<(i32, i32, i32), u8> = HashMap::new();
    for removal in removals {
        for &(cell, bits) in removal {
            if bits.is_empty() {
                continue;
            }
            let mask = seen.entry((cell.x, cell.y, cell.z)).or_default();
            assert_eq!(
                *mask & bits.bits(),
                0,
                "two free pairs in one pass target the same element at ({}, {}, {})",
                cell.x,
                cell.y,
                cell.z
            );
            *mask |= bits.bits();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn solid(w: u32, h: u32, d: u32) -> CubicalComplex {
        let voxels = Grid3::new(w, h, d, true);
        CubicalComplex::from_solid_voxels(&voxels)
    }

    fn random_blob(seed: u64) -> Grid3<bool> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut voxels = Grid3::new(6, 6, 6, false);
        let coords: Vec<_> = voxels.coords().collect();
        for v in coords {
            voxels[v] = rng.gen_bool(0.6);
        }
        voxels
    }

    #[test]
    fn solid_cube_thins_to_empty_frontier() {
        let mut complex = solid(3, 3, 3);
        let before = complex.element_count();
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        assert!(process.directional_collapse(None));
        assert!(process.border_is_empty());
        assert!(process.complex().element_count() < before);
    }

    #[test]
    fn collapse_is_idempotent_once_thin() {
        let mut complex = solid(3, 3, 3);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        assert!(process.directional_collapse(None));
        let cells = process.complex().clone();
        let births = process.birth_map().clone();
        let rounds = process.iteration_count();
        assert!(process.directional_collapse(None));
        assert_eq!(process.complex(), &cells);
        assert_eq!(process.birth_map(), &births);
        assert_eq!(process.iteration_count(), rounds);
    }

    #[test]
    fn exhausted_budget_reports_not_thin_and_resumes() {
        let mut complex = solid(4, 4, 4);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        assert!(!process.directional_collapse(Some(1)));
        assert!(!process.border_is_empty());
        assert!(process.directional_collapse(None));
        assert!(process.border_is_empty());
    }

    #[test]
    fn sequential_and_parallel_collapse_agree() {
        for seed in [1, 7, 42] {
            let voxels = random_blob(seed);
            let mut sequential = CubicalComplex::from_solid_voxels(&voxels);
            let mut parallel = sequential.clone();

            let mut process = ThinningProcess::new(&mut sequential, None, None, None);
            let thin_seq = process.directional_collapse(Some(8));
            let births_seq = process.into_birth_map();

            let mut process = ThinningProcess::new(&mut parallel, None, None, None);
            let thin_par = process
                .parallel_directional_collapse(Some(8), 4)
                .expect("pool should build");
            let births_par = process.into_birth_map();

            assert_eq!(thin_seq, thin_par, "seed {seed}");
            assert_eq!(sequential, parallel, "seed {seed}");
            assert_eq!(births_seq, births_par, "seed {seed}");
        }
    }

    #[test]
    fn sequential_and_parallel_agree_under_constraints_and_maps() {
        for seed in [5, 11] {
            let voxels = random_blob(seed);
            let mut sequential = CubicalComplex::from_solid_voxels(&voxels);
            let mut parallel = sequential.clone();

            let mut constraint = CubicalComplex::new(7, 7, 7);
            constraint.insert(Vec3i::new(3, 3, 3), CellBits::X_EDGE | CellBits::Y_EDGE);
            constraint.insert(Vec3i::new(2, 4, 3), CellBits::CUBE | CellBits::XY_FACE);

            let mut rng = StdRng::seed_from_u64(seed ^ 0xa5);
            let mut distance = Grid3::new(7, 7, 7, 0u32);
            let coords: Vec<_> = distance.coords().collect();
            for v in coords {
                distance[v] = rng.gen_range(1..4);
            }
            let opening = Grid3::new(7, 7, 7, 2u32);

            let mut process = ThinningProcess::new(
                &mut sequential,
                Some(&distance),
                Some(&opening),
                Some(&constraint),
            );
            let thin_seq = process.directional_collapse(Some(8));
            let births_seq = process.into_birth_map();

            let mut process = ThinningProcess::new(
                &mut parallel,
                Some(&distance),
                Some(&opening),
                Some(&constraint),
            );
            let thin_par = process
                .parallel_directional_collapse(Some(8), 4)
                .expect("pool should build");
            let births_par = process.into_birth_map();

            assert_eq!(thin_seq, thin_par, "seed {seed}");
            assert_eq!(sequential, parallel, "seed {seed}");
            assert_eq!(births_seq, births_par, "seed {seed}");
        }
    }

    #[test]
    fn fully_constrained_complex_never_moves() {
        let mut complex = solid(3, 3, 3);
        let constraint = complex.clone();
        let before = complex.clone();
        let mut process = ThinningProcess::new(&mut complex, None, None, Some(&constraint));
        assert!(process.border_is_empty());
        assert!(process.directional_collapse(None));
        assert_eq!(process.iteration_count(), 0);
        assert_eq!(process.complex(), &before);
        let unset = Vec3i::new(UNSET_BIRTH, UNSET_BIRTH, UNSET_BIRTH);
        assert!(process.birth_map().as_slice().iter().all(|b| *b == unset));
    }

    #[test]
    fn constrained_bits_survive() {
        let mut complex = solid(4, 4, 4);
        let mut constraint = CubicalComplex::new(5, 5, 5);
        let pinned = Vec3i::new(2, 2, 2);
        constraint.insert(pinned, CellBits::X_EDGE);
        let mut process = ThinningProcess::new(&mut complex, None, None, Some(&constraint));
        assert!(process.directional_collapse(None));
        assert!(process.complex().contains_some(pinned, CellBits::X_EDGE));
    }

    #[test]
    fn medial_edges_survive_with_distance_and_opening_maps() {
        // 3x3x3 solid; only the center cell sits on the medial axis
        let mut complex = solid(3, 3, 3);
        let center = Vec3i::new(1, 1, 1);
        let mut distance = Grid3::new(4, 4, 4, 1u32);
        distance[center] = 2;
        let opening = Grid3::new(4, 4, 4, 2u32);
        let mut process =
            ThinningProcess::new(&mut complex, Some(&distance), Some(&opening), None);
        assert!(process.directional_collapse(None));
        assert!(process.complex().contains_some(center, CellBits::X_EDGE));
    }

    #[test]
    fn frontier_matches_predicate_after_every_round() {
        let voxels = random_blob(3);
        let mut complex = CubicalComplex::from_solid_voxels(&voxels);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        for _ in 0..4 {
            if process.border_is_empty() {
                break;
            }
            process.directional_collapse(Some(1));
            for direction in Direction::ALL {
                let mut listed = process.border_list(direction).to_vec();
                listed.sort_unstable_by_key(|v| (v.z, v.y, v.x));
                let expected: Vec<_> = process
                    .complex()
                    .cells()
                    .coords()
                    .filter(|&v| process.is_border(direction, v))
                    .collect();
                assert_eq!(listed, expected, "direction {direction:?}");
            }
        }
    }

    #[test]
    fn minus_x_pass_on_solid_cube() {
        let mut complex = solid(3, 3, 3);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        // only the x = 0 boundary plane is collapsible towards −X at first
        let seeded = process.border_list(Direction::X_NEG).len();
        assert_eq!(seeded, 9);
        assert!(process.collapse_direction(Direction::X_NEG) >= 1);
        // exhaust the −X direction alone
        while process.collapse_direction(Direction::X_NEG) > 0 {}
        assert!(process.border_list(Direction::X_NEG).len() < seeded);
    }

    #[test]
    fn birth_dates_stay_within_completed_rounds() {
        let mut complex = solid(3, 3, 2);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        assert!(process.directional_collapse(None));
        let rounds = process.iteration_count() as i32;
        let births = process.birth_map();
        assert!(births
            .as_slice()
            .iter()
            .flat_map(|b| [b.x, b.y, b.z])
            .any(|b| b >= 0));
        assert!(births
            .as_slice()
            .iter()
            .flat_map(|b| [b.x, b.y, b.z])
            .all(|b| b >= UNSET_BIRTH && b < rounds));
    }

    #[test]
    #[should_panic(expected = "distance map dimensions")]
    fn mismatched_distance_map_panics() {
        let mut complex = solid(2, 2, 2);
        let distance = Grid3::new(2, 2, 2, 0u32);
        let opening = Grid3::new(3, 3, 3, 0u32);
        let _ = ThinningProcess::new(&mut complex, Some(&distance), Some(&opening), None);
    }

    #[test]
    fn zero_worker_threads_is_rejected() {
        let mut complex = solid(2, 2, 2);
        let mut process = ThinningProcess::new(&mut complex, None, None, None);
        assert!(matches!(
            process.parallel_directional_collapse(None, 0),
            Err(Error::InvalidData(_))
        ));
    }
}
