//! Dense 3D grid storage

use crate::{Vec3i, Vec3u};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A bounds-checked dense 3D array addressed by integer coordinates
///
/// Dimensions are fixed at construction and the grid is never resized.
/// Out-of-range access through `Index`/`IndexMut` is a programming error and
/// panics; use [`Grid3::get`] when "outside the grid" is a meaningful answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid3<T> {
    width: u32,
    height: u32,
    depth: u32,
    data: Vec<T>,
}

impl<T: Clone> Grid3<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: u32, height: u32, depth: u32, fill: T) -> Self {
        let len = width as usize * height as usize * depth as usize;
        Self {
            width,
            height,
            depth,
            data: vec![fill; len],
        }
    }

    /// Reset every cell to `value`
    pub fn fill(&mut self, value: T) {
        for cell in &mut self.data {
            *cell = value.clone();
        }
    }
}

impl<T> Grid3<T> {
    /// Grid width (x extent)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (y extent)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grid depth (z extent)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Grid dimensions as a vector
    pub fn dims(&self) -> Vec3u {
        Vec3u::new(self.width, self.height, self.depth)
    }

    /// Number of cells in the grid
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid has zero cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `v` addresses a cell inside the grid
    pub fn contains(&self, v: Vec3i) -> bool {
        v.x >= 0
            && v.y >= 0
            && v.z >= 0
            && (v.x as u32) < self.width
            && (v.y as u32) < self.height
            && (v.z as u32) < self.depth
    }

    fn offset(&self, v: Vec3i) -> usize {
        debug_assert!(self.contains(v));
        v.x as usize + self.width as usize * (v.y as usize + self.height as usize * v.z as usize)
    }

    /// Checked cell access; `None` outside the grid
    pub fn get(&self, v: Vec3i) -> Option<&T> {
        if self.contains(v) {
            let offset = self.offset(v);
            Some(&self.data[offset])
        } else {
            None
        }
    }

    /// Checked mutable cell access; `None` outside the grid
    pub fn get_mut(&mut self, v: Vec3i) -> Option<&mut T> {
        if self.contains(v) {
            let offset = self.offset(v);
            Some(&mut self.data[offset])
        } else {
            None
        }
    }

    /// Iterate all cell coordinates in row-major order (x fastest)
    pub fn coords(&self) -> impl Iterator<Item = Vec3i> + '_ {
        let w = self.width as usize;
        let h = self.height as usize;
        (0..self.data.len()).map(move |i| {
            Vec3i::new((i % w) as i32, ((i / w) % h) as i32, (i / (w * h)) as i32)
        })
    }

    /// Raw cell storage in row-major order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<Vec3i> for Grid3<T> {
    type Output = T;

    fn index(&self, v: Vec3i) -> &T {
        assert!(
            self.contains(v),
            "grid access out of range: ({}, {}, {}) outside {}x{}x{}",
            v.x,
            v.y,
            v.z,
            self.width,
            self.height,
            self.depth
        );
        let offset = self.offset(v);
        &self.data[offset]
    }
}

impl<T> IndexMut<Vec3i> for Grid3<T> {
    fn index_mut(&mut self, v: Vec3i) -> &mut T {
        assert!(
            self.contains(v),
            "grid access out of range: ({}, {}, {}) outside {}x{}x{}",
            v.x,
            v.y,
            v.z,
            self.width,
            self.height,
            self.depth
        );
        let offset = self.offset(v);
        &mut self.data[offset]
    }
}
