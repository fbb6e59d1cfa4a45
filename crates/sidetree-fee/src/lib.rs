pub mod approximator;
pub mod memory;
pub mod quantile;
pub mod runlength;

pub use memory::InMemoryQuantileStore;
pub use quantile::{QuantileConfig, QuantileRecord, QuantileStore, SlidingWindowQuantileCalculator};
