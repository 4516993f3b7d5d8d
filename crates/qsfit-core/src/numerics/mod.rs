pub mod grid;
pub mod stats;

pub use grid::{GridAxis, GridMinimum, minimize_grid};
pub use stats::{local_maxima, median, peak_to_peak};
