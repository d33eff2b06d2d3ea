pub mod npy;

pub use npy::{LoadError, NpyVolumeReader};
