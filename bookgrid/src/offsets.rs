use alloc::vec::Vec;
use core::cmp;

/// Fenwick tree over per-row extents (height plus any trailing row gap).
///
/// This is the backbone of the virtualizer: it answers "where does row `i`
/// start", "how tall is everything", and "which row covers offset `y`" in
/// `O(log n)`, while a single measurement update is also `O(log n)`.
///
/// Stored values are the *effective* extent of each row: callers fold the
/// inter-row gap into every value except the last one.
#[derive(Clone, Debug)]
pub(crate) struct RowOffsets {
    tree: Vec<u64>, // 1-indexed
    total: u64,
    top_bit: usize,
}

impl RowOffsets {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            tree: alloc::vec![0; n + 1],
            total: 0,
            top_bit: top_bit_for(n),
        }
    }

    /// Builds the tree from row heights, folding `gap` into every row but the
    /// last.
    pub(crate) fn from_heights(heights: &[u32], gap: u32) -> Self {
        let n = heights.len();
        let mut tree = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        let gap = gap as u64;
        for i in 1..=n {
            let mut extent = heights[i - 1] as u64;
            if gap > 0 && i < n {
                extent = extent.saturating_add(gap);
            }
            total = total.saturating_add(extent);
            tree[i] = tree[i].saturating_add(extent);
            let parent = i + lsb(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit_for(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    /// Drops all rows at index `new_len` and beyond.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        self.total = self.prefix(new_len);
        self.tree.truncate(new_len + 1);
        self.top_bit = top_bit_for(new_len);
    }

    /// Appends one row extent at the end in `O(log n)`.
    ///
    /// The initial value of the new internal node is derived from existing
    /// prefix sums (a node at index `i` covers the last `lsb(i)` rows).
    pub(crate) fn push(&mut self, extent: u64) {
        let new_len = self.len().saturating_add(1);
        self.tree.push(0);
        self.total = self.total.saturating_add(extent);

        let covered = lsb(new_len);
        let before_start = new_len.saturating_sub(covered);
        let carried = self
            .prefix(new_len.saturating_sub(1))
            .saturating_sub(self.prefix(before_start));
        self.tree[new_len] = carried.saturating_add(extent);

        self.top_bit = top_bit_for(new_len);
    }

    /// Applies a signed delta to row `index`. Offsets of rows at or before
    /// `index` are unaffected; everything after shifts by `delta`.
    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n {
            return;
        }
        if delta > 0 {
            self.total = self.total.saturating_add(delta as u64);
        } else if delta < 0 {
            self.total = self.total.saturating_sub((-delta) as u64);
        }
        let mut i = index + 1;
        while i <= n {
            let cur = self.tree[i] as i128;
            let next = cur + delta as i128;
            debug_assert!(
                next >= 0,
                "RowOffsets underflow (idx={i}, cur={cur}, delta={delta})"
            );
            self.tree[i] = next.clamp(0, u64::MAX as i128) as u64;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` row extents.
    pub(crate) fn prefix(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Returns the number of rows whose prefix sum is `<= target`, i.e. the
    /// index of the row covering `target` (clamp to `len - 1` for a valid row).
    pub(crate) fn row_at(&self, mut target: u64) -> usize {
        let n = self.len();
        if n == 0 {
            return 0;
        }

        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit_for(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}
