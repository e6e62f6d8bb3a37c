//! Visitors that grow occupancy, discover per-cell values and report blocks.
#![forbid(unsafe_code)]

pub mod discover;
pub mod extend;
pub mod finder;

pub use discover::{CopyDiscoveryExtender, DiscoveryExtender, discover_from, discover_with};
pub use extend::{BitGridExtender, dilate, dilate_n};
pub use finder::{Finder, find_blocks};
