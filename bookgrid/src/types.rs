#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Platform-agnostic viewport geometry: `main` is the scroll axis (height for
/// a vertical grid), `cross` the other axis (width, which drives columns).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    pub start_row: usize,
    pub end_row: usize, // exclusive
}

impl RowRange {
    pub fn is_empty(&self) -> bool {
        self.start_row >= self.end_row
    }

    pub fn len(&self) -> usize {
        self.end_row.saturating_sub(self.start_row)
    }
}

/// A row the renderer should place: its index, its start offset in the scroll
/// axis (includes `scroll_margin` and `padding_start`), and its current height
/// (measured if known, estimated otherwise; excludes `gap`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRow {
    pub index: usize,
    pub start: u64,
    pub height: u32,
}

impl VirtualRow {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.height as u64)
    }
}
