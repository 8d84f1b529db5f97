//! Collapse directions and the elements they can remove

use voxthin_core::Axis;

/// Which side of the axis a collapse pass eats from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Negative,
    Positive,
}

impl Orientation {
    /// 0 for negative, 1 for positive; offsets the lower pair element
    pub fn side(self) -> i32 {
        match self {
            Orientation::Negative => 0,
            Orientation::Positive => 1,
        }
    }

    /// Unit step towards this side of the axis
    pub fn step(self) -> i32 {
        match self {
            Orientation::Negative => -1,
            Orientation::Positive => 1,
        }
    }
}

/// A direction-orientation pair of the 3D grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub axis: Axis,
    pub orientation: Orientation,
}

/// A topological element kind that a directional pass may remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Cube,
    XyFace,
    XzFace,
    YzFace,
    XEdge,
    YEdge,
    ZEdge,
}

impl Direction {
    pub const X_NEG: Direction = Direction {
        axis: Axis::X,
        orientation: Orientation::Negative,
    };
    pub const X_POS: Direction = Direction {
        axis: Axis::X,
        orientation: Orientation::Positive,
    };
    pub const Y_NEG: Direction = Direction {
        axis: Axis::Y,
        orientation: Orientation::Negative,
    };
    pub const Y_POS: Direction = Direction {
        axis: Axis::Y,
        orientation: Orientation::Positive,
    };
    pub const Z_NEG: Direction = Direction {
        axis: Axis::Z,
        orientation: Orientation::Negative,
    };
    pub const Z_POS: Direction = Direction {
        axis: Axis::Z,
        orientation: Orientation::Positive,
    };

    /// All six directions in the fixed processing order −X, +X, −Y, +Y, −Z, +Z
    pub const ALL: [Direction; 6] = [
        Direction::X_NEG,
        Direction::X_POS,
        Direction::Y_NEG,
        Direction::Y_POS,
        Direction::Z_NEG,
        Direction::Z_POS,
    ];

    /// Index of this direction in [`Direction::ALL`]
    pub fn index(self) -> usize {
        self.axis.index() * 2 + self.orientation.side() as usize
    }

    /// The element kinds collapsible along this direction: the cube, the two
    /// faces whose plane contains the axis, and the edge along the axis
    pub fn elements(self) -> [Element; 4] {
        match self.axis {
            Axis::X => [Element::Cube, Element::XyFace, Element::XzFace, Element::XEdge],
            Axis::Y => [Element::Cube, Element::YzFace, Element::XyFace, Element::YEdge],
            Axis::Z => [Element::Cube, Element::XzFace, Element::YzFace, Element::ZEdge],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_processing_order() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn every_direction_tests_its_own_edge() {
        assert!(Direction::X_NEG.elements().contains(&Element::XEdge));
        assert!(Direction::Y_POS.elements().contains(&Element::YEdge));
        assert!(Direction::Z_NEG.elements().contains(&Element::ZEdge));
    }
}
