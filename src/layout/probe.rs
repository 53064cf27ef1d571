use async_trait::async_trait;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    File,
    /// Exists but is a directory or something else that cannot be rendered.
    NotFile,
    Missing,
}

/// Existence check for a validated layout path. Errors other than
/// "not found" are returned as `Err`.
#[async_trait]
pub trait LayoutProbe {
    async fn stat(&self, path: &Path) -> io::Result<ProbeResult>;
}

pub type DynProbe = std::sync::Arc<dyn LayoutProbe + Send + Sync + 'static>;

pub struct FsProbe;

#[async_trait]
impl LayoutProbe for FsProbe {
    async fn stat(&self, path: &Path) -> io::Result<ProbeResult> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(ProbeResult::File),
            Ok(_) => Ok(ProbeResult::NotFile),
            // a file used as a directory, or an over-long name, cannot exist either
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename
                ) =>
            {
                Ok(ProbeResult::Missing)
            }
            Err(e) => Err(e),
        }
    }
}
