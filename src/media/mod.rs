pub mod assemble;
pub mod ffmpeg;
pub mod keyframe;
pub mod probe;
pub mod reconcile;
pub mod transcode;

pub use assemble::assemble_clips;
pub use keyframe::{sample_keyframes, SampleStats};
pub use probe::{probe_video, VideoInfo};
pub use reconcile::attach_narration;
pub use transcode::{transcode_for_web, AudioPolicy};

use std::path::Path;

use tempfile::TempPath;

/// Exclusively-owned handle to an assembled intermediate video.
///
/// The backing file is deleted when the handle is dropped, on every exit
/// path. Consumers take the handle by value, so use-after-release cannot
/// compile.
pub struct MediaHandle {
    path: TempPath,
    duration: f64,
}

impl MediaHandle {
    pub(crate) fn new(path: TempPath, duration: f64) -> Self {
        Self { path, duration }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Duration of the assembled stream in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Move the assembled file to its final location, consuming the handle.
    ///
    /// Falls back to copy-and-delete when the destination is on a different
    /// filesystem than the temp file.
    pub fn persist(self, dest: &Path) -> crate::error::Result<()> {
        match self.path.persist(dest) {
            Ok(_) => Ok(()),
            Err(e) => {
                std::fs::copy(&e.path, dest)?;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandle")
            .field("path", &self.path.to_path_buf())
            .field("duration", &self.duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_handle_releases_file_on_drop() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let handle = MediaHandle::new(file.into_temp_path(), 1.0);
        assert!(path.exists());
        drop(handle);
        assert!(!path.exists());
    }

    #[test]
    fn test_media_handle_persist_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        std::fs::write(file.path(), b"video bytes").unwrap();
        let handle = MediaHandle::new(file.into_temp_path(), 2.5);

        let dest = dir.path().join("final.mp4");
        handle.persist(&dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"video bytes");
    }
}
