//! Free-pair rules for directional collapse
//!
//! A free pair is a cell element `f` together with one of its boundary
//! elements `g` such that `f` is the only present element containing `g`;
//! removing both preserves the homotopy type of the complex. Every
//! (direction, orientation, element) tuple resolves to one small pure rule
//! describing which elements must be present, which co-faces of `g` must be
//! absent, and which bits collapsing the pair clears.
//!
//! Pair shapes, with `g` always on the direction side of `f`:
//! - (cube, face): `g` is the face closing the cube on the direction side;
//!   its only other co-face is the adjacent cube.
//! - (face, edge): `g` is the face's edge on the direction side; it has three
//!   other 2-cell co-faces. A present 3-cell containing `g` would imply two
//!   of them present by closure, so checking 2-cells suffices.
//! - (edge, vertex): vertices carry no bit, so the check is that no other
//!   edge meets the direction-side endpoint. Only the edge bit is cleared;
//!   this is the rule that retracts dangling curve tips.

use crate::{Direction, Element};
use voxthin_core::{Axis, CellBits, CubicalComplex, Vec3i};

/// One free-pair candidate at a voxel: presence/absence conditions plus the
/// bits removed on collapse. Entries with empty bits are padding.
#[derive(Debug, Clone, Copy)]
pub struct PairRule {
    present: [(Vec3i, CellBits); 2],
    absent: [(Vec3i, CellBits); 5],
    removed: [(Vec3i, CellBits); 2],
}

impl PairRule {
    /// Structural freeness: the pair is present and `g` has no other present
    /// co-face. Cells outside the complex read as absent.
    pub fn is_free_in(&self, complex: &CubicalComplex) -> bool {
        self.present
            .iter()
            .all(|&(cell, bits)| complex.bits_or_empty(cell).contains_all(bits))
            && self
                .absent
                .iter()
                .all(|&(cell, bits)| !complex.contains_some(cell, bits))
    }

    /// The (cell, bits) pairs cleared when this pair collapses
    pub fn removed(&self) -> impl Iterator<Item = (Vec3i, CellBits)> + '_ {
        self.removed
            .iter()
            .copied()
            .filter(|(_, bits)| !bits.is_empty())
    }

    /// The removal set as a fixed array, padded with empty bits
    pub fn removed_cells(&self) -> [(Vec3i, CellBits); 2] {
        self.removed
    }
}

/// The free-pair rule for `element` at `v` in `direction`
///
/// Panics if `element` is not collapsible along the direction's axis; use
/// [`Direction::elements`] to enumerate the valid tuples.
pub fn rule(direction: Direction, element: Element, v: Vec3i) -> PairRule {
    let side = direction.orientation.side();
    let step = direction.orientation.step();
    let x = Axis::X.unit();
    let y = Axis::Y.unit();
    let z = Axis::Z.unit();
    match (direction.axis, element) {
        (Axis::X, Element::Cube) => cube_rule(v, x, side, step, CellBits::YZ_FACE),
        (Axis::X, Element::XyFace) => face_rule(
            v,
            x,
            side,
            step,
            CellBits::XY_FACE,
            CellBits::Y_EDGE,
            CellBits::YZ_FACE,
            z,
        ),
        (Axis::X, Element::XzFace) => face_rule(
            v,
            x,
            side,
            step,
            CellBits::XZ_FACE,
            CellBits::Z_EDGE,
            CellBits::YZ_FACE,
            y,
        ),
        (Axis::X, Element::XEdge) => edge_rule(
            v,
            x,
            side,
            step,
            CellBits::X_EDGE,
            (CellBits::Y_EDGE, y),
            (CellBits::Z_EDGE, z),
        ),
        (Axis::Y, Element::Cube) => cube_rule(v, y, side, step, CellBits::XZ_FACE),
        (Axis::Y, Element::YzFace) => face_rule(
            v,
            y,
            side,
            step,
            CellBits::YZ_FACE,
            CellBits::Z_EDGE,
            CellBits::XZ_FACE,
            x,
        ),
        (Axis::Y, Element::XyFace) => face_rule(
            v,
            y,
            side,
            step,
            CellBits::XY_FACE,
            CellBits::X_EDGE,
            CellBits::XZ_FACE,
            z,
        ),
        (Axis::Y, Element::YEdge) => edge_rule(
            v,
            y,
            side,
            step,
            CellBits::Y_EDGE,
            (CellBits::X_EDGE, x),
            (CellBits::Z_EDGE, z),
        ),
        (Axis::Z, Element::Cube) => cube_rule(v, z, side, step, CellBits::XY_FACE),
        (Axis::Z, Element::XzFace) => face_rule(
            v,
            z,
            side,
            step,
            CellBits::XZ_FACE,
            CellBits::X_EDGE,
            CellBits::XY_FACE,
            y,
        ),
        (Axis::Z, Element::YzFace) => face_rule(
            v,
            z,
            side,
            step,
            CellBits::YZ_FACE,
            CellBits::Y_EDGE,
            CellBits::XY_FACE,
            x,
        ),
        (Axis::Z, Element::ZEdge) => edge_rule(
            v,
            z,
            side,
            step,
            CellBits::Z_EDGE,
            (CellBits::X_EDGE, x),
            (CellBits::Y_EDGE, y),
        ),
        (axis, element) => panic!("element {element:?} is not collapsible along axis {axis:?}"),
    }
}

/// (cube, face) pair: the face on the direction side of the cube, free when
/// the cube beyond that face is absent
fn cube_rule(v: Vec3i, axis: Vec3i, side: i32, step: i32, face: CellBits) -> PairRule {
    let g = v + axis * side;
    let pad = (v, CellBits::EMPTY);
    PairRule {
        present: [(v, CellBits::CUBE), (g, face)],
        absent: [(v + axis * step, CellBits::CUBE), pad, pad, pad, pad],
        removed: [(v, CellBits::CUBE), (g, face)],
    }
}

/// (face, edge) pair: the face's edge on the direction side, free when the
/// edge's three other 2-cell co-faces are absent
#[allow(clippy::too_many_arguments)]
fn face_rule(
    v: Vec3i,
    axis: Vec3i,
    side: i32,
    step: i32,
    face: CellBits,
    edge: CellBits,
    other_face: CellBits,
    lateral: Vec3i,
) -> PairRule {
    let g = v + axis * side;
    let pad = (v, CellBits::EMPTY);
    PairRule {
        present: [(v, face), (g, edge)],
        absent: [
            (v + axis * step, face),
            (g, other_face),
            (g - lateral, other_face),
            pad,
            pad,
        ],
        removed: [(v, face), (g, edge)],
    }
}

/// (edge, vertex) pair: free when no other edge meets the direction-side
/// endpoint of the axis edge
fn edge_rule(
    v: Vec3i,
    axis: Vec3i,
    side: i32,
    step: i32,
    edge: CellBits,
    (edge_a, lateral_a): (CellBits, Vec3i),
    (edge_b, lateral_b): (CellBits, Vec3i),
) -> PairRule {
    // the direction-side endpoint of the edge
    let u = v + axis * side;
    PairRule {
        present: [(v, edge), (v, CellBits::EMPTY)],
        absent: [
            (v + axis * step, edge),
            (u, edge_a),
            (u - lateral_a, edge_a),
            (u, edge_b),
            (u - lateral_b, edge_b),
        ],
        removed: [(v, edge), (v, CellBits::EMPTY)],
    }
}
