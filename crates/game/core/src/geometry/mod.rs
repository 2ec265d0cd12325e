//! Grid geometry: line of sight, attack reach and per-tick visibility.
mod reach;
mod sight;
mod visibility;

pub use reach::{pixel_distance, within_reach};
pub use sight::is_blocked;
pub use visibility::{refresh_visibility, reveal_for, visible_from};
