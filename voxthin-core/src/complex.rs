//! Cubical complex over a voxel grid
//!
//! Each cell stores a bitmask of the topological elements anchored at its
//! minimum corner: the cube interior, three face elements and three edge
//! elements. Vertices carry no bit. The complex performs no topological
//! validation of its own; keeping mutations homotopy-safe is the thinning
//! controller's responsibility.

use crate::{Grid3, Vec3i, Vec3u};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A coordinate axis of the voxel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit step along this axis
    pub fn unit(self) -> Vec3i {
        match self {
            Axis::X => Vec3i::new(1, 0, 0),
            Axis::Y => Vec3i::new(0, 1, 0),
            Axis::Z => Vec3i::new(0, 0, 1),
        }
    }

    /// Index into per-axis triples such as the birth-date map
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Per-cell element bitmask of a cubical complex
///
/// Seven independent flags: the cube interior `[x,x+1]x[y,y+1]x[z,z+1]`, the
/// three faces incident to the cell's minimum corner (spanning the XY, XZ and
/// YZ axis pairs) and the three axis-aligned edges leaving the minimum corner.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable,
)]
pub struct CellBits(u8);

impl CellBits {
    /// No elements present
    pub const EMPTY: CellBits = CellBits(0);
    /// The cube interior
    pub const CUBE: CellBits = CellBits(1 << 0);
    /// The face spanning the X and Y axes at the cell's z plane
    pub const XY_FACE: CellBits = CellBits(1 << 1);
    /// The face spanning the X and Z axes at the cell's y plane
    pub const XZ_FACE: CellBits = CellBits(1 << 2);
    /// The face spanning the Y and Z axes at the cell's x plane
    pub const YZ_FACE: CellBits = CellBits(1 << 3);
    /// The edge along X from the cell's minimum corner
    pub const X_EDGE: CellBits = CellBits(1 << 4);
    /// The edge along Y from the cell's minimum corner
    pub const Y_EDGE: CellBits = CellBits(1 << 5);
    /// The edge along Z from the cell's minimum corner
    pub const Z_EDGE: CellBits = CellBits(1 << 6);
    /// All seven elements
    pub const ALL: CellBits = CellBits(0x7f);

    /// The edge element along `axis`
    pub fn edge(axis: Axis) -> CellBits {
        match axis {
            Axis::X => CellBits::X_EDGE,
            Axis::Y => CellBits::Y_EDGE,
            Axis::Z => CellBits::Z_EDGE,
        }
    }

    /// Raw bit pattern
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether any of `other`'s bits are set here
    pub fn contains_some(self, other: CellBits) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether all of `other`'s bits are set here
    pub fn contains_all(self, other: CellBits) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the given bits
    pub fn insert(&mut self, other: CellBits) {
        self.0 |= other.0;
    }

    /// Clear the given bits
    pub fn remove(&mut self, other: CellBits) {
        self.0 &= !other.0;
    }

    /// Whether no element is present
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of elements present
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for CellBits {
    type Output = CellBits;

    fn bitor(self, rhs: CellBits) -> CellBits {
        CellBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellBits {
    fn bitor_assign(&mut self, rhs: CellBits) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CellBits {
    type Output = CellBits;

    fn bitand(self, rhs: CellBits) -> CellBits {
        CellBits(self.0 & rhs.0)
    }
}

/// A cubical complex stored as a dense grid of [`CellBits`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubicalComplex {
    cells: Grid3<CellBits>,
}

impl CubicalComplex {
    /// Create an empty complex with the given cell dimensions
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            cells: Grid3::new(width, height, depth, CellBits::EMPTY),
        }
    }

    /// Wrap an existing grid of cell bitmasks
    pub fn from_cells(cells: Grid3<CellBits>) -> Self {
        Self { cells }
    }

    /// Build the closed complex of a binary voxel volume
    ///
    /// Every solid voxel contributes its cube interior together with all six
    /// faces and twelve edges of the cube. Elements are anchored at their
    /// minimum corner, so the resulting complex is one cell larger than the
    /// voxel grid along each axis.
    pub fn from_solid_voxels(voxels: &Grid3<bool>) -> Self {
        let dims = voxels.dims();
        let mut complex = CubicalComplex::new(dims.x + 1, dims.y + 1, dims.z + 1);
        let x = Axis::X.unit();
        let y = Axis::Y.unit();
        let z = Axis::Z.unit();
        for v in voxels.coords() {
            if !voxels[v] {
                continue;
            }
            complex.insert(v, CellBits::ALL);
            complex.insert(v + x, CellBits::YZ_FACE | CellBits::Y_EDGE | CellBits::Z_EDGE);
            complex.insert(v + y, CellBits::XZ_FACE | CellBits::X_EDGE | CellBits::Z_EDGE);
            complex.insert(v + z, CellBits::XY_FACE | CellBits::X_EDGE | CellBits::Y_EDGE);
            complex.insert(v + x + y, CellBits::Z_EDGE);
            complex.insert(v + x + z, CellBits::Y_EDGE);
            complex.insert(v + y + z, CellBits::X_EDGE);
        }
        complex
    }

    /// Cell dimensions of the complex
    pub fn dims(&self) -> Vec3u {
        self.cells.dims()
    }

    /// The element bitmask at `v`; panics outside the grid
    pub fn bits(&self, v: Vec3i) -> CellBits {
        self.cells[v]
    }

    /// The element bitmask at `v`, reading cells outside the grid as empty
    pub fn bits_or_empty(&self, v: Vec3i) -> CellBits {
        self.cells.get(v).copied().unwrap_or(CellBits::EMPTY)
    }

    /// Set the given bits at `v`; panics outside the grid
    pub fn insert(&mut self, v: Vec3i, bits: CellBits) {
        self.cells[v].insert(bits);
    }

    /// Clear the given bits at `v`; panics outside the grid
    pub fn remove(&mut self, v: Vec3i, bits: CellBits) {
        self.cells[v].remove(bits);
    }

    /// Whether any of `bits` is present at `v`; false outside the grid
    pub fn contains_some(&self, v: Vec3i, bits: CellBits) -> bool {
        self.bits_or_empty(v).contains_some(bits)
    }

    /// Whether the complex holds no element at all
    pub fn is_empty(&self) -> bool {
        self.cells.as_slice().iter().all(|cell| cell.is_empty())
    }

    /// Total number of elements present across all cells
    pub fn element_count(&self) -> usize {
        self.cells
            .as_slice()
            .iter()
            .map(|cell| cell.count() as usize)
            .sum()
    }

    /// The underlying cell grid
    pub fn cells(&self) -> &Grid3<CellBits> {
        &self.cells
    }
}
