//! Local persistence of generated images for debugging
//!
//! In development mode every successfully generated image is also written
//! to the output directory, named by its seed and a capture timestamp.
//! There is no retention policy; production mode writes nothing.

use crate::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ImageArchive {
    output_dir: PathBuf,
    enabled: bool,
}

impl ImageArchive {
    pub fn new(output_dir: &Path, enabled: bool) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            enabled,
        }
    }

    /// Write the image to disk when enabled, returning the path written.
    pub fn save(&self, image_bytes: &[u8], seed: u32) -> Result<Option<PathBuf>> {
        if !self.enabled {
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir)?;

        let filename = format!(
            "image-seed-{}-{}.png",
            seed,
            Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = self.output_dir.join(filename);
        fs::write(&path, image_bytes)?;

        info!("Image saved locally: {}", path.display());
        Ok(Some(path))
    }
}
