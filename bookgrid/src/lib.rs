//! A headless row-grid virtualization engine for incrementally loaded lists.
//!
//! For query sessions (pagination, prefetch triggering, the Open Library
//! client), see the `bookgrid-feed` crate.
//!
//! This crate covers the core math needed to render an unbounded, growing
//! result grid at bounded cost: a breakpoint table mapping viewport width to a
//! column count, a partition of the flat item list into fixed-width rows, and
//! a row virtualizer with prefix sums over measured row heights, fast
//! offset → row lookup, and overscanned visible ranges.
//!
//! It is UI-agnostic. A rendering layer is expected to provide:
//! - viewport size (height/width)
//! - scroll offset
//! - measured row heights as rows render
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod columns;
mod offsets;
mod options;
mod partition;
mod types;
mod virtualizer;


pub use columns::Breakpoints;
pub use options::{InitialOffset, OnChangeCallback, RowVirtualizerOptions};
pub use partition::{PartitionChange, RowPartition};
pub use types::{Align, Rect, RowRange, ScrollDirection, VirtualRow};
pub use virtualizer::RowVirtualizer;
