use ndarray::{Array3, ArrayD, Ix3};
use ndarray_npy::{read_npy, ReadNpyError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("NumPy read error: {0}")]
    Npy(#[from] ReadNpyError),

    #[error("Expected a 3-dimensional array, got {0} dimension(s)")]
    NotThreeDimensional(usize),
}

/// Reader for `.npy` volumes, the single input format of the pipeline.
///
/// The shape is discovered from the file header at load time. Anything that
/// is not 3-dimensional f32 data is rejected; the element type must match
/// exactly (no silent widening of f64 files).
pub struct NpyVolumeReader {
    file_path: PathBuf,
}

impl NpyVolumeReader {
    /// Create a new reader for the given path
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Load the whole tensor into memory as one atomic read
    pub fn load(&self) -> Result<Array3<f32>, LoadError> {
        if !self.file_path.exists() {
            return Err(LoadError::FileNotFound(
                self.file_path.to_string_lossy().to_string(),
            ));
        }

        let raw: ArrayD<f32> = read_npy(&self.file_path)?;
        let ndim = raw.ndim();
        raw.into_dimensionality::<Ix3>()
            .map_err(|_| LoadError::NotThreeDimensional(ndim))
    }
}
