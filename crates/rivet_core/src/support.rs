//! Component E (support half): the ξ-support matrix, spec.md §3, §4.E input.
//!
//! Grounded on `examples/original_source/dcel/xi_support_matrix.cpp/.h`'s
//! sparse 2D structure with `down`/`left` back-links to the next nonempty
//! cell in each axis.

use crate::matrix::Bigrade;

/// One nonempty cell of the ξ-support matrix: the graded Betti numbers at a
/// bigrade, plus the multigrades of low/high-dim simplices that map there
/// under the current equivalence-class partition (spec.md §3).
#[derive(Debug, Clone)]
pub struct SupportEntry {
    pub bigrade: Bigrade,
    pub xi: (usize, usize, usize),
    /// Index (into the owning `SupportMatrix`) of the next nonempty cell
    /// directly below this one (same x, smallest y greater than this
    /// entry's y).
    pub down: Option<usize>,
    /// Index of the next nonempty cell directly to the right (same y,
    /// smallest x greater than this entry's x).
    pub left: Option<usize>,
    pub low_multigrades: Vec<Bigrade>,
    pub high_multigrades: Vec<Bigrade>,
}

/// The full sparse ξ-support table, held in reverse-lex column order (the
/// same order the bigraded matrices use).
#[derive(Debug, Clone, Default)]
pub struct SupportMatrix {
    entries: Vec<SupportEntry>,
}

impl SupportMatrix {
    /// Builds the table from raw (bigrade, xi-counts) cells, computing the
    /// `down`/`left` back-links by direct scan. `O(n^2)`: a documented
    /// simplification of the original's sparse linked-list construction,
    /// acceptable at the scale this engine targets (see DESIGN.md).
    pub fn build(raw: Vec<(Bigrade, (usize, usize, usize))>) -> Self {
        let mut entries: Vec<SupportEntry> = raw
            .into_iter()
            .map(|(bigrade, xi)| SupportEntry {
                bigrade,
                xi,
                down: None,
                left: None,
                low_multigrades: Vec::new(),
                high_multigrades: Vec::new(),
            })
            .collect();
        entries.sort_by_key(|e| e.bigrade.sort_key());

        for i in 0..entries.len() {
            let bg = entries[i].bigrade;
            let mut best_down: Option<(usize, usize)> = None;
            let mut best_left: Option<(usize, usize)> = None;
            for (j, other) in entries.iter().enumerate() {
                if j == i {
                    continue;
                }
                let bg2 = other.bigrade;
                if bg2.x == bg.x && bg2.y > bg.y && best_down.is_none_or(|(by, _)| bg2.y < by) {
                    best_down = Some((bg2.y, j));
                }
                if bg2.y == bg.y && bg2.x > bg.x && best_left.is_none_or(|(bx, _)| bg2.x < bx) {
                    best_left = Some((bg2.x, j));
                }
            }
            entries[i].down = best_down.map(|(_, j)| j);
            entries[i].left = best_left.map(|(_, j)| j);
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[SupportEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [SupportEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_of(&self, bigrade: Bigrade) -> Option<usize> {
        self.entries.iter().position(|e| e.bigrade == bigrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_links_point_to_nearest_nonempty_cell() {
        let raw = vec![
            (Bigrade::new(0, 0), (1, 0, 0)),
            (Bigrade::new(0, 2), (1, 0, 0)),
            (Bigrade::new(3, 0), (1, 0, 0)),
        ];
        let m = SupportMatrix::build(raw);
        let origin = m.index_of(Bigrade::new(0, 0)).unwrap();
        assert_eq!(m.entries()[origin].down, m.index_of(Bigrade::new(0, 2)));
        assert_eq!(m.entries()[origin].left, m.index_of(Bigrade::new(3, 0)));
    }
}
