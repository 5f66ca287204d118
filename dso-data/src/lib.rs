pub mod dataset;
pub mod loader;
pub mod measurement;
pub mod outlier;
