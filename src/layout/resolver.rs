use super::{
    probe::DynProbe, validate, EnvironmentMode, FsProbe, LayoutCache, LayoutRoot, ProbeResult,
    Rejected, ResolutionOutcome,
};
use crate::config::{canonical_root, Config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct LayoutResolver {
    root: LayoutRoot,
    default_layout: PathBuf,
    mode: EnvironmentMode,
    cache: LayoutCache,
    probe: DynProbe,
    stat_timeout: Duration,
}

impl LayoutResolver {
    pub fn new(
        root: LayoutRoot,
        default_layout: PathBuf,
        mode: EnvironmentMode,
        cache: LayoutCache,
        probe: DynProbe,
        stat_timeout: Duration,
    ) -> Self {
        Self { root, default_layout, mode, cache, probe, stat_timeout }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let root = LayoutRoot::new(&canonical_root(&cfg.views.root_dir)?, &cfg.views.extension)?;
        let default_layout = dunce::canonicalize(&cfg.views.default_layout)?;
        Ok(Self::new(
            root,
            default_layout,
            cfg.effective_mode(),
            LayoutCache::new(),
            Arc::new(FsProbe),
            Duration::from_millis(cfg.views.stat_timeout_ms),
        ))
    }

    pub fn root(&self) -> &LayoutRoot { &self.root }
    pub fn mode(&self) -> EnvironmentMode { self.mode }
    pub fn cache(&self) -> &LayoutCache { &self.cache }

    /// Turn an optional, untrusted layout identifier into the layout to render.
    ///
    /// Validation always happens before any filesystem access. Only layouts
    /// found on disk are cached; missing layouts fall back to the default and
    /// are probed again next time, and probe failures are never remembered.
    pub async fn resolve(&self, layout_id: Option<&str>) -> ResolutionOutcome {
        let Some(raw) = layout_id else {
            return ResolutionOutcome::UseDefault(self.default_layout.clone());
        };

        let validated = match validate(raw, &self.root) {
            Ok(p) => p,
            Err(reason) => {
                warn!(mode = %self.mode, "layout identifier rejected: escapes views root");
                return ResolutionOutcome::Rejected(reason);
            }
        };

        if self.cache.contains(self.mode, &validated) {
            return ResolutionOutcome::UseValidated(validated);
        }

        let probed = tokio::time::timeout(self.stat_timeout, self.probe.stat(validated.as_path())).await;
        match probed {
            Ok(Ok(ProbeResult::File)) => {
                self.cache.insert_found(self.mode, validated.clone());
                ResolutionOutcome::UseValidated(validated)
            }
            Ok(Ok(ProbeResult::Missing | ProbeResult::NotFile)) => {
                debug!(mode = %self.mode, "layout not found, using default");
                ResolutionOutcome::UseDefault(self.default_layout.clone())
            }
            Ok(Err(e)) => {
                warn!(kind = ?e.kind(), "layout stat failed");
                ResolutionOutcome::Rejected(Rejected::FilesystemError)
            }
            Err(_) => {
                warn!(timeout_ms = self.stat_timeout.as_millis() as u64, "layout stat timed out");
                ResolutionOutcome::Rejected(Rejected::FilesystemError)
            }
        }
    }
}
