use core::ops::Range;

/// Partition of a flat item list into fixed-width rows.
///
/// Rows are index ranges into the item list (no item data is held here), so a
/// partition over `n` items costs `O(1)` space and `O(1)` per row lookup.
/// Row `r` covers items `r * columns .. min((r + 1) * columns, n)`; every row
/// has `columns` items except possibly the last.
///
/// Row indices are positional, not content-addressed: any change to `columns`
/// reshuffles which items a row contains, so callers must treat all cached
/// per-row state (measurements in particular) as invalid after such a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowPartition {
    item_count: usize,
    columns: usize,
}

impl RowPartition {
    pub fn new(item_count: usize, columns: usize) -> Self {
        Self {
            item_count,
            columns: columns.max(1),
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows: `ceil(item_count / columns)`.
    pub fn row_count(&self) -> usize {
        self.item_count.div_ceil(self.columns)
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Item index range for row `row`, or `None` past the end.
    pub fn row(&self, row: usize) -> Option<Range<usize>> {
        let start = row.checked_mul(self.columns)?;
        if start >= self.item_count {
            return None;
        }
        let end = start.saturating_add(self.columns).min(self.item_count);
        Some(start..end)
    }

    /// Number of items in row `row` (0 past the end).
    pub fn row_len(&self, row: usize) -> usize {
        self.row(row).map_or(0, |r| r.len())
    }

    /// Row containing item `item`, or `None` past the end.
    pub fn row_of(&self, item: usize) -> Option<usize> {
        (item < self.item_count).then(|| item / self.columns)
    }

    pub fn last_row(&self) -> Option<usize> {
        self.row_count().checked_sub(1)
    }

    /// Applies new inputs, returning what changed so callers can skip no-op
    /// repartitions (a resize that stays inside the same breakpoint bucket)
    /// and only invalidate measurements when row boundaries actually moved.
    pub fn update(&mut self, item_count: usize, columns: usize) -> PartitionChange {
        let columns = columns.max(1);
        let change = PartitionChange {
            items_changed: self.item_count != item_count,
            columns_changed: self.columns != columns,
        };
        self.item_count = item_count;
        self.columns = columns;
        change
    }
}

/// What a [`RowPartition::update`] call changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionChange {
    pub items_changed: bool,
    pub columns_changed: bool,
}

impl PartitionChange {
    pub fn any(&self) -> bool {
        self.items_changed || self.columns_changed
    }
}
