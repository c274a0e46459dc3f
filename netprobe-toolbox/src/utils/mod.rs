//! Small helpers shared across the toolbox.

pub mod datetime;
