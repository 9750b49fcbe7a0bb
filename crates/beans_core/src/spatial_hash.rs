use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
/// Static uniform-grid index over a batch of positions.
///
/// Rebuilt from scratch every frame for the collision broad phase. Entries
/// are stored in "offset array" form (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i + 1]` is the slice of `entity_indices`
/// that falls into cell `i`, and within a cell indices keep their input
/// order so queries are deterministic.
///
/// Positions outside the arena are clamped into the border cells rather
/// than dropped.
///
/// # Examples
/// ```
/// use beans_core::spatial_hash::SpatialHash;
///
/// let mut spatial = SpatialHash::new(10.0, 100, 100);
/// spatial.build(&[(15.0, 15.0), (25.0, 25.0), (85.0, 85.0)]);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(15.0, 15.0, 20.0, &mut nearby);
/// assert_eq!(nearby, vec![0, 1]);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub width: u32,
    pub height: u32,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
}

impl SpatialHash {
    pub fn new(cell_size: f64, width: u32, height: u32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let cols = ((f64::from(width) / cell_size).ceil() as usize).max(1);
        let rows = ((f64::from(height) / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            width,
            height,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, v: f64, cells: usize) -> usize {
        if !v.is_finite() {
            return 0;
        }
        let c = (v / self.cell_size).floor();
        if c <= 0.0 {
            0
        } else {
            (c as usize).min(cells - 1)
        }
    }

    /// Cell index for a world coordinate, clamped into the grid.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, y: f64) -> usize {
        self.cell_coord(y, self.rows) * self.cols + self.cell_coord(x, self.cols)
    }

    /// Re-indexes `positions`; index `i` in query results is `positions[i]`.
    pub fn build(&mut self, positions: &[(f64, f64)]) {
        let cell_count = self.cols * self.rows;

        let mut counts = vec![0usize; cell_count];
        let cells: Vec<usize> = positions
            .iter()
            .map(|&(x, y)| self.get_cell_idx(x, y))
            .collect();
        for &cell in &cells {
            counts[cell] += 1;
        }

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.clear();
        self.entity_indices.resize(positions.len(), 0);
        let mut cursor = self.cell_offsets[..cell_count].to_vec();
        for (entity_idx, &cell) in cells.iter().enumerate() {
            self.entity_indices[cursor[cell]] = entity_idx;
            cursor[cell] += 1;
        }
    }

    /// Inclusive cell bounds `(min_cx, max_cx, min_cy, max_cy)` covering the
    /// square around `(x, y)`.
    fn cell_span(&self, x: f64, y: f64, radius: f64) -> (usize, usize, usize, usize) {
        (
            self.cell_coord(x - radius, self.cols),
            self.cell_coord(x + radius, self.cols),
            self.cell_coord(y - radius, self.rows),
            self.cell_coord(y + radius, self.rows),
        )
    }

    /// Visits every entity in cells overlapping the query square. Callers
    /// still need an exact distance test.
    pub fn query_callback<F>(&self, x: f64, y: f64, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        let (min_cx, max_cx, min_cy, max_cy) = self.cell_span(x, y, radius);
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let cell_idx = cy * self.cols + cx;
                let start = self.cell_offsets[cell_idx];
                let end = self.cell_offsets[cell_idx + 1];
                for &entity_idx in &self.entity_indices[start..end] {
                    callback(entity_idx);
                }
            }
        }
    }

    #[inline]
    pub fn query_into(&self, x: f64, y: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(x, y, radius, |idx| result.push(idx));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_indices.is_empty()
    }
}

/// Incremental bucket grid used while placing beans one at a time.
///
/// Unlike [`SpatialHash`] it grows as points are accepted and is unbounded,
/// so candidates only need the 3×3 bucket neighborhood checked.
#[derive(Clone, Debug)]
pub struct BucketGrid {
    bucket_size: f64,
    buckets: HashMap<(i64, i64), Vec<(f64, f64)>>,
    len: usize,
}

impl BucketGrid {
    pub fn new(bucket_size: f64) -> Self {
        Self {
            bucket_size: bucket_size.max(f64::EPSILON),
            buckets: HashMap::new(),
            len: 0,
        }
    }

    #[inline]
    fn bucket(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.bucket_size).floor() as i64,
            (y / self.bucket_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, x: f64, y: f64) {
        let key = self.bucket(x, y);
        self.buckets.entry(key).or_default().push((x, y));
        self.len += 1;
    }

    /// True when a stored point lies closer than `min_distance` to `(x, y)`.
    ///
    /// Only the 3×3 neighborhood is inspected, so `min_distance` must not
    /// exceed the bucket size.
    pub fn has_conflict(&self, x: f64, y: f64, min_distance: f64) -> bool {
        let (bx, by) = self.bucket(x, y);
        let min_sq = min_distance * min_distance;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(points) = self.buckets.get(&(bx + dx, by + dy)) else {
                    continue;
                };
                if points.iter().any(|&(px, py)| {
                    let (ddx, ddy) = (px - x, py - y);
                    ddx * ddx + ddy * ddy < min_sq
                }) {
                    return true;
                }
            }
        }
        false
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_spatial_hash_query_finds_nearby() {
        let mut sh = SpatialHash::new(5.0, 20, 20);
        sh.build(&[(1.0, 1.0), (2.0, 2.0), (10.0, 10.0)]);

        let mut count = 0;
        sh.query_callback(1.5, 1.5, 2.0, |_| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_spatial_hash_keeps_out_of_bounds_points() {
        let mut sh = SpatialHash::new(5.0, 20, 20);
        sh.build(&[(-3.0, 25.0), (20.0, 20.0)]);
        let mut found = Vec::new();
        sh.query_into(0.0, 19.0, 1.0, &mut found);
        assert_eq!(found, vec![0]);
        sh.query_into(19.5, 19.5, 1.0, &mut found);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_spatial_hash_rebuild_clears() {
        let mut sh = SpatialHash::new(5.0, 20, 20);
        sh.build(&[(1.0, 1.0)]);
        sh.build(&[]);
        let mut count = 0;
        sh.query_callback(1.0, 1.0, 10.0, |_| count += 1);
        assert_eq!(count, 0);
        assert!(sh.is_empty());
    }

    #[test]
    fn test_bucket_grid_conflicts() {
        let mut grid = BucketGrid::new(6.0);
        assert!(!grid.has_conflict(10.0, 10.0, 6.0));
        grid.insert(10.0, 10.0);
        assert!(grid.has_conflict(14.0, 10.0, 6.0));
        assert!(!grid.has_conflict(16.0, 10.0, 6.0));
        // neighbor bucket across a boundary
        assert!(grid.has_conflict(10.0, 5.9, 6.0));
        assert_eq!(grid.len(), 1);
    }
}
