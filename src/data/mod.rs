//! Fixed game tables: the browsable filesystem and the simulated network.

pub mod filesystem;
pub mod hosts;
