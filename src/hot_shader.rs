//! Shader hot-reloading for iterating on the mesh shader while the game
//! runs. Pressing R re-reads the shader file and rebuilds the pipeline; a
//! shader that fails to compile leaves the previous pipeline in place.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

/// A shader source that can be re-read from disk on demand.
///
/// The crate ships with the shader embedded, so a missing file on disk is
/// not an error; the embedded source is used until the file appears.
pub struct HotShader {
    path: PathBuf,
    source: String,
}

impl HotShader {
    /// Creates the shader from the file at `path`, falling back to
    /// `embedded` when the file cannot be read.
    pub fn new(path: impl AsRef<Path>, embedded: &str) -> Self {
        let path = path.as_ref().to_path_buf();
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(_) => embedded.to_string(),
        };
        Self { path, source }
    }

    /// Re-reads the shader file. Returns `true` if new source was loaded.
    pub fn reload(&mut self) -> bool {
        match fs::read_to_string(&self.path) {
            Ok(source) => {
                info!("reloaded shader {}", self.path.display());
                self.source = source;
                true
            }
            Err(err) => {
                warn!(
                    "could not re-read shader {}: {err}, keeping current source",
                    self.path.display()
                );
                false
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_the_embedded_source() {
        let shader = HotShader::new("no/such/shader.wgsl", "// embedded");
        assert_eq!(shader.source(), "// embedded");
    }

    #[test]
    fn reload_picks_up_changes_from_disk() {
        let path = std::env::temp_dir().join("hot_shader_reload_test.wgsl");
        fs::write(&path, "// v1").unwrap();

        let mut shader = HotShader::new(&path, "// embedded");
        assert_eq!(shader.source(), "// v1");

        fs::write(&path, "// v2").unwrap();
        assert!(shader.reload());
        assert_eq!(shader.source(), "// v2");

        fs::remove_file(&path).unwrap();
        assert!(!shader.reload());
        assert_eq!(shader.source(), "// v2");
    }
}
