//! Spatial hash grid for radius queries
//!
//! Used by the distance modifiers (`around`, `expand`, `beyond`) to avoid
//! all-pairs distance checks.

use ahash::AHashMap;
use lin_alg::f32::Vec3;

use crate::adapter::MoleculeView;
use crate::index::AtomIndex;

/// Uniform grid over atom coordinates
///
/// Divides 3D space into cubic cells. Each cell stores the atoms that fall
/// within it together with their positions. With the cell size equal to the
/// query radius, every atom within the radius of a point lies in the point's
/// cell or one of its 26 neighbours.
#[derive(Clone)]
pub struct SpatialGrid {
    cells: AHashMap<(i32, i32, i32), Vec<(AtomIndex, Vec3)>>,
    cell_size: f32,
    len: usize,
}

impl SpatialGrid {
    pub fn with_capacity(cell_size: f32, expected_atoms: usize) -> Self {
        Self {
            cells: AHashMap::with_capacity(expected_atoms),
            cell_size,
            len: 0,
        }
    }

    /// Build a grid over every atom of `mol` that has a coordinate
    pub fn from_molecule<M: MoleculeView + ?Sized>(mol: &M, cell_size: f32) -> Self {
        let mut grid = Self::with_capacity(cell_size, mol.atom_count());
        for atom in mol.atoms() {
            if let Some(pos) = mol.coord(atom) {
                grid.insert(pos, atom);
            }
        }
        log::debug!(
            "Built spatial grid: cell size {}, {} atoms in {} cells",
            cell_size,
            grid.len,
            grid.cells.len()
        );
        grid
    }

    fn cell_key(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, pos: Vec3, atom: AtomIndex) {
        let key = self.cell_key(pos);
        self.cells.entry(key).or_default().push((atom, pos));
        self.len += 1;
    }

    /// Number of atoms stored
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Collect every atom in the 3×3×3 neighbourhood of the given position
    pub fn query_neighbors(&self, pos: Vec3, out: &mut Vec<AtomIndex>) {
        out.clear();
        self.visit_cells(pos, 1, |atom, _| out.push(atom));
    }

    /// Collect every atom within `radius` of `pos` (inclusive, exact)
    ///
    /// When `radius` exceeds the cell size the searched neighbourhood grows
    /// accordingly, so the result is exact for any radius.
    pub fn query_within_radius(&self, pos: Vec3, radius: f32, out: &mut Vec<AtomIndex>) {
        out.clear();
        let span = (radius / self.cell_size).ceil().max(1.0) as i32;
        let radius_sq = radius * radius;
        self.visit_cells(pos, span, |atom, p| {
            if (p - pos).magnitude_squared() <= radius_sq {
                out.push(atom);
            }
        });
    }

    fn visit_cells<F>(&self, pos: Vec3, span: i32, mut f: F)
    where
        F: FnMut(AtomIndex, Vec3),
    {
        // Keys saturate for coordinates far beyond the cell size; offsets
        // that leave the i32 range name no cell.
        let axis = |c: i32| (-span..=span).filter_map(move |d| c.checked_add(d));
        let (cx, cy, cz) = self.cell_key(pos);
        for x in axis(cx) {
            for y in axis(cy) {
                for z in axis(cz) {
                    if let Some(entries) = self.cells.get(&(x, y, z)) {
                        for &(atom, p) in entries {
                            f(atom, p);
                        }
                    }
                }
            }
        }
    }
}
