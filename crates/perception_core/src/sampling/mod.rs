//! Point sampling strategies for placing objects in a 2D area.
pub mod poisson_disk;

pub use poisson_disk::{PoissonDiskSampling, DEFAULT_SAMPLING_RESOLUTION, DEFAULT_SEED};
