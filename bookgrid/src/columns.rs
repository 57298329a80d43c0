use alloc::vec::Vec;

/// An ordered viewport-width → column-count table.
///
/// `columns_for` is pure and total: it keeps no memory of prior widths, so
/// callers can evaluate it on every resize event and only react when the
/// returned count actually changes (most resizes land in the same bucket).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoints {
    /// `(min_width, columns)` entries, sorted descending by `min_width`.
    entries: Vec<(u32, usize)>,
    /// Column count for widths below the smallest entry.
    base: usize,
}

impl Breakpoints {
    /// Builds a table from `(min_width, columns)` entries plus a base column
    /// count for narrower viewports.
    ///
    /// Entries are sorted descending by width; `columns` values of 0 are
    /// bumped to 1 so partitioning stays well-defined.
    pub fn new(entries: impl IntoIterator<Item = (u32, usize)>, base: usize) -> Self {
        let mut entries: Vec<(u32, usize)> = entries
            .into_iter()
            .map(|(w, c)| (w, c.max(1)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Self {
            entries,
            base: base.max(1),
        }
    }

    /// Maps a viewport width to a column count.
    pub fn columns_for(&self, viewport_width: u32) -> usize {
        for &(min_width, columns) in &self.entries {
            if viewport_width >= min_width {
                return columns;
            }
        }
        self.base
    }
}

impl Default for Breakpoints {
    /// The book-grid table: ≥1280 → 5, ≥1024 → 4, ≥768 → 3, otherwise 2.
    fn default() -> Self {
        Self::new([(1280, 5), (1024, 4), (768, 3)], 2)
    }
}
