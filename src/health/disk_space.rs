//! Free disk space health.

use std::path::{Path, PathBuf};

use crate::health::provider::{Health, HealthProvider, HealthStatus};

/// Reports `DOWN` once free space on the filesystem holding `path` drops to
/// the threshold or below.
///
/// Unsupported when the filesystem cannot be queried at construction, in
/// which case it never joins the aggregate.
#[derive(Debug, Clone)]
pub struct DiskSpaceHealthProvider {
    path: PathBuf,
    free_bytes_down_threshold: u64,
    supported: bool,
}

impl DiskSpaceHealthProvider {
    pub fn new(path: impl Into<PathBuf>, free_bytes_down_threshold: u64) -> Self {
        let path = path.into();
        let supported = disk_space(&path).is_some();
        if !supported {
            tracing::warn!(path = %path.display(), "Cannot read disk space, provider disabled");
        }
        Self {
            path,
            free_bytes_down_threshold,
            supported,
        }
    }
}

impl HealthProvider for DiskSpaceHealthProvider {
    fn name(&self) -> &str {
        "diskSpace"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn health(&self) -> Health {
        match disk_space(&self.path) {
            Some((total, free)) => {
                let status = if free > self.free_bytes_down_threshold {
                    HealthStatus::Up
                } else {
                    HealthStatus::Down
                };
                Health::with_status(status)
                    .with_detail("total", total)
                    .with_detail("free", free)
                    .with_detail("threshold", self.free_bytes_down_threshold)
            }
            None => Health::with_status(HealthStatus::Unknown)
                .with_detail("path", self.path.display().to_string()),
        }
    }
}

/// (total bytes, free bytes) of the filesystem containing `path`.
fn disk_space(path: &Path) -> Option<(u64, u64)> {
    let total = fs2::total_space(path).ok()?;
    let free = fs2::available_space(path).ok()?;
    Some((total, free))
}
