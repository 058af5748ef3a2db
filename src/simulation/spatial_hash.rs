//! Spatial hash grid for neighbor search.
//!
//! Particles are bucketed into square cells of side `radius`; cell
//! coordinates are hashed into a table of `table_size` keys (by default the
//! particle count). Rebuilding sorts `(key, particle)` pairs by key and
//! records where each key's run starts, so a radius query scans at most nine
//! runs.

use bevy::math::{IVec2, Vec2};

/// Marker for keys with no particles in the sorted entry array.
pub const EMPTY_KEY: u32 = u32::MAX;

/// Offsets of the 3x3 cell neighborhood.
const CELL_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

const HASH_X: u32 = 15823;
const HASH_Y: u32 = 9_737_333;

/// Cell containing `pos`. Truncates toward zero, so cell 0 spans `(-r, r)`
/// on each axis.
pub fn position_to_cell(pos: Vec2, radius: f32) -> IVec2 {
    IVec2::new((pos.x / radius) as i32, (pos.y / radius) as i32)
}

/// Hash of a cell coordinate, wrapping in 32 bits.
pub fn hash_cell(cell: IVec2) -> u32 {
    let a = (cell.x as u32).wrapping_mul(HASH_X);
    let b = (cell.y as u32).wrapping_mul(HASH_Y);
    a.wrapping_add(b)
}

/// Table slot for a hash.
pub fn key_from_hash(hash: u32, table_size: u32) -> u32 {
    hash % table_size
}

/// Uniform-grid spatial hash over 2D positions.
#[derive(Debug, Clone, Default)]
pub struct SpatialHash {
    /// `(key, particle index)` pairs sorted by key after a rebuild.
    entries: Vec<(u32, u32)>,
    /// First position in `entries` holding each key, or [`EMPTY_KEY`].
    start_indices: Vec<u32>,
    /// Cell size the table was last built with.
    radius: f32,
}

impl SpatialHash {
    /// Creates an empty grid with room for `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            start_indices: Vec::with_capacity(capacity),
            radius: 0.0,
        }
    }

    /// Number of hash table slots.
    pub fn table_size(&self) -> usize {
        self.start_indices.len()
    }

    /// Cell size of the last rebuild.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sorted `(key, particle)` pairs.
    pub fn entries(&self) -> &[(u32, u32)] {
        &self.entries
    }

    /// Start position of `key` in [`Self::entries`], if any particle has it.
    pub fn start_index(&self, key: u32) -> Option<usize> {
        match self.start_indices.get(key as usize) {
            Some(&start) if start != EMPTY_KEY => Some(start as usize),
            _ => None,
        }
    }

    /// Rebuilds with one table slot per particle.
    pub fn rebuild(&mut self, positions: &[Vec2], radius: f32) {
        self.rebuild_with_table_size(positions, radius, positions.len());
    }

    /// Rebuilds the grid from `positions` with cell size `radius`.
    ///
    /// A table size of zero leaves the grid empty. Sizes beyond `u32::MAX`
    /// are capped.
    pub fn rebuild_with_table_size(&mut self, positions: &[Vec2], radius: f32, table_size: usize) {
        let table_size = table_size.min(u32::MAX as usize);
        self.radius = radius;
        self.entries.clear();
        self.start_indices.clear();
        if table_size == 0 {
            return;
        }
        let table = table_size as u32;

        self.entries.extend(positions.iter().enumerate().map(|(i, &pos)| {
            let key = key_from_hash(hash_cell(position_to_cell(pos, radius)), table);
            (key, i as u32)
        }));
        // Order within a key does not matter.
        self.entries.sort_unstable_by_key(|&(key, _)| key);

        self.start_indices.resize(table_size, EMPTY_KEY);
        let mut previous = EMPTY_KEY;
        for (i, &(key, _)) in self.entries.iter().enumerate() {
            if key != previous {
                self.start_indices[key as usize] = i as u32;
                previous = key;
            }
        }
    }

    /// Appends to `neighbors` every particle whose position lies strictly
    /// within `radius` of `pos`.
    ///
    /// `positions` must be the slice the grid was built from and `radius`
    /// the cell size used for that build. `neighbors` is not cleared.
    pub fn query(&self, pos: Vec2, positions: &[Vec2], radius: f32, neighbors: &mut Vec<usize>) {
        let table = self.start_indices.len() as u32;
        if table == 0 {
            return;
        }
        debug_assert!(
            radius.to_bits() == self.radius.to_bits(),
            "query radius {radius} differs from build radius {}",
            self.radius
        );
        let center = position_to_cell(pos, radius);
        let sqr_radius = radius * radius;

        // Distinct cells can share a key; scan each key's run only once.
        let mut visited = [EMPTY_KEY; 9];
        for (slot, offset) in CELL_OFFSETS.iter().enumerate() {
            let key = key_from_hash(hash_cell(center.wrapping_add(*offset)), table);
            if visited[..slot].contains(&key) {
                continue;
            }
            visited[slot] = key;

            let Some(start) = self.start_index(key) else {
                continue;
            };
            for &(entry_key, index) in &self.entries[start..] {
                if entry_key != key {
                    break;
                }
                let index = index as usize;
                if positions[index].distance_squared(pos) < sqr_radius {
                    neighbors.push(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(pos: Vec2, positions: &[Vec2], radius: f32) -> Vec<usize> {
        positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance_squared(pos) < radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    fn assert_matches_brute_force(positions: &[Vec2], probes: &[Vec2], radius: f32) {
        let mut grid = SpatialHash::default();
        grid.rebuild(positions, radius);
        let mut neighbors = Vec::new();
        for &probe in probes {
            neighbors.clear();
            grid.query(probe, positions, radius, &mut neighbors);
            neighbors.sort_unstable();
            assert_eq!(neighbors, brute_force(probe, positions, radius), "probe {probe}");
        }
    }

    #[test]
    fn position_to_cell_truncates_toward_zero() {
        assert_eq!(position_to_cell(Vec2::new(0.5, 1.5), 1.0), IVec2::new(0, 1));
        assert_eq!(position_to_cell(Vec2::new(-0.5, -1.5), 1.0), IVec2::new(0, -1));
        assert_eq!(position_to_cell(Vec2::new(-2.9, 2.9), 1.0), IVec2::new(-2, 2));
    }

    #[test]
    fn hash_wraps_for_negative_cells() {
        assert_eq!(hash_cell(IVec2::ZERO), 0);
        assert_eq!(hash_cell(IVec2::new(1, 1)), 15823 + 9_737_333);
        assert_eq!(hash_cell(IVec2::new(-1, 0)), u32::MAX.wrapping_mul(15823));
        assert_eq!(
            hash_cell(IVec2::new(-3, -7)),
            ((-3i32) as u32)
                .wrapping_mul(15823)
                .wrapping_add(((-7i32) as u32).wrapping_mul(9_737_333))
        );
    }

    #[test]
    fn rebuild_sorts_and_indexes_runs() {
        let positions = vec![
            Vec2::new(3.5, 0.2),
            Vec2::new(0.1, 0.1),
            Vec2::new(-4.0, 2.0),
            Vec2::new(0.2, 0.3),
            Vec2::new(3.6, 0.4),
        ];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 1.0);

        assert_eq!(grid.table_size(), positions.len());
        let entries = grid.entries();
        assert!(entries.windows(2).all(|w| w[0].0 <= w[1].0));
        for (i, &(key, _)) in entries.iter().enumerate() {
            let start = grid.start_index(key).expect("key present");
            assert!(start <= i);
            assert_eq!(entries[start].0, key);
            assert!(start == 0 || entries[start - 1].0 != key);
        }
        for key in 0..positions.len() as u32 {
            if entries.iter().all(|&(k, _)| k != key) {
                assert_eq!(grid.start_index(key), None);
            }
        }
    }

    #[test]
    fn query_matches_brute_force_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let positions: Vec<Vec2> = (0..800)
            .map(|_| Vec2::new(rng.gen_range(-7.5..7.5), rng.gen_range(-4.0..4.0)))
            .collect();
        let probes: Vec<Vec2> = positions
            .iter()
            .take(200)
            .copied()
            .chain((0..50).map(|_| Vec2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-5.0..5.0))))
            .collect();
        assert_matches_brute_force(&positions, &probes, 0.5);
    }

    #[test]
    fn query_matches_brute_force_clustered() {
        let mut rng = StdRng::seed_from_u64(11);
        let centers = [Vec2::new(-2.0, 1.0), Vec2::new(0.0, 0.0), Vec2::new(3.0, -1.5)];
        let positions: Vec<Vec2> = (0..600)
            .map(|i| centers[i % 3] + Vec2::new(rng.gen_range(-0.4..0.4), rng.gen_range(-0.4..0.4)))
            .collect();
        assert_matches_brute_force(&positions, &positions, 0.26);
    }

    #[test]
    fn query_matches_brute_force_straddling_origin() {
        let mut positions = Vec::new();
        for y in -10..=10 {
            for x in -10..=10 {
                positions.push(Vec2::new(x as f32 * 0.09, y as f32 * 0.09));
            }
        }
        assert_matches_brute_force(&positions, &positions, 0.2);
    }

    #[test]
    fn query_coincident_particles() {
        let positions = vec![Vec2::new(0.3, -0.7); 64];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 0.5);

        let mut neighbors = Vec::new();
        grid.query(Vec2::new(0.3, -0.7), &positions, 0.5, &mut neighbors);
        neighbors.sort_unstable();
        assert_eq!(neighbors, (0..64).collect::<Vec<_>>());

        neighbors.clear();
        grid.query(Vec2::new(5.0, 5.0), &positions, 0.5, &mut neighbors);
        assert!(neighbors.is_empty());
    }

    #[test]
    fn small_tables_do_not_duplicate_neighbors() {
        // With two slots every one of the nine cells collides.
        let positions = vec![Vec2::new(0.1, 0.1), Vec2::new(0.4, 0.2)];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 1.0);
        let mut neighbors = Vec::new();
        grid.query(Vec2::ZERO, &positions, 1.0, &mut neighbors);
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 1]);
    }

    #[test]
    fn custom_table_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)))
            .collect();
        let mut grid = SpatialHash::default();
        grid.rebuild_with_table_size(&positions, 0.4, 1024);
        assert_eq!(grid.table_size(), 1024);

        let mut neighbors = Vec::new();
        for &probe in positions.iter().take(50) {
            neighbors.clear();
            grid.query(probe, &positions, 0.4, &mut neighbors);
            neighbors.sort_unstable();
            assert_eq!(neighbors, brute_force(probe, &positions, 0.4));
        }
    }

    #[test]
    fn rebuild_records_cell_size() {
        let mut grid = SpatialHash::default();
        grid.rebuild(&[Vec2::ZERO], 0.26);
        assert_eq!(grid.radius(), 0.26);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "differs from build radius")]
    fn query_with_other_radius_panics_in_debug() {
        let positions = [Vec2::ZERO, Vec2::new(0.5, 0.0)];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 1.0);
        grid.query(Vec2::ZERO, &positions, 2.0, &mut Vec::new());
    }

    #[test]
    fn empty_grid_queries_nothing() {
        let mut grid = SpatialHash::default();
        grid.rebuild(&[], 1.0);
        let mut neighbors = Vec::new();
        grid.query(Vec2::ZERO, &[], 1.0, &mut neighbors);
        assert!(neighbors.is_empty());
        assert_eq!(grid.table_size(), 0);
    }
}
