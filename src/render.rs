//! Page rendering on top of the resolved layout.

use crate::errors::{AppError, AppResult};
use crate::layout::{validate, EnvironmentMode, LayoutRoot};
use minijinja::{context, AutoEscape, Environment, Value};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Template sources keyed by absolute path. When `keep` is set (production)
/// each file is read from disk once; otherwise every lookup re-reads it.
#[derive(Debug, Default)]
pub struct SourceCache {
    keep: bool,
    sources: RwLock<HashMap<PathBuf, Arc<str>>>,
    #[cfg(test)]
    disk_reads: RwLock<HashMap<PathBuf, usize>>,
}

impl SourceCache {
    pub fn new(mode: EnvironmentMode) -> Self {
        Self { keep: mode.caches_sources(), ..Default::default() }
    }

    pub async fn load(&self, path: &Path) -> io::Result<Arc<str>> {
        if self.keep {
            let hit = self.sources.read().unwrap_or_else(|e| e.into_inner()).get(path).cloned();
            if let Some(src) = hit {
                return Ok(src);
            }
        }
        let src: Arc<str> = tokio::fs::read_to_string(path).await?.into();
        #[cfg(test)]
        {
            *self
                .disk_reads
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .entry(path.to_path_buf())
                .or_insert(0) += 1;
        }
        if self.keep {
            self.sources
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(path.to_path_buf(), src.clone());
        }
        Ok(src)
    }

    /// How many times `path` was successfully read from disk.
    #[cfg(test)]
    pub fn disk_reads(&self, path: &Path) -> usize {
        self.disk_reads.read().unwrap_or_else(|e| e.into_inner()).get(path).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn tracked_paths(&self) -> usize {
        self.disk_reads.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct Renderer {
    pages: LayoutRoot,
    default_layout: PathBuf,
    sources: SourceCache,
    env: Environment<'static>,
}

impl Renderer {
    pub fn new(pages: LayoutRoot, default_layout: PathBuf, mode: EnvironmentMode) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self { pages, default_layout, sources: SourceCache::new(mode), env }
    }

    #[cfg(test)]
    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    /// Render `page` (a name under the views root) inside the layout at
    /// `layout`, which must already have been resolved. A resolved layout
    /// that has since been deleted renders with the default layout.
    pub async fn render(&self, page: &str, layout: &Path, title: Option<&str>) -> AppResult<String> {
        let page_path = validate(page, &self.pages).map_err(AppError::from)?;
        let page_src = self.sources.load(page_path.as_path()).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AppError::NotFound
            } else {
                warn!(kind = ?e.kind(), "page read failed");
                AppError::FilesystemError
            }
        })?;
        let layout_src = match self.sources.load(layout).await {
            Ok(src) => src,
            Err(e) if e.kind() == io::ErrorKind::NotFound && layout != self.default_layout.as_path() => {
                debug!("resolved layout disappeared, using default");
                self.sources.load(&self.default_layout).await.map_err(|e| {
                    warn!(kind = ?e.kind(), "default layout read failed");
                    AppError::FilesystemError
                })?
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "layout read failed");
                return Err(AppError::FilesystemError);
            }
        };

        let title = title.unwrap_or_default();
        let body = self
            .env
            .render_str(&page_src, context! { title => title })
            .map_err(template_error)?;
        self.env
            .render_str(&layout_src, context! { title => title, body => Value::from_safe_string(body) })
            .map_err(template_error)
    }
}

fn template_error(e: minijinja::Error) -> AppError {
    warn!(kind = ?e.kind(), "template rendering failed");
    AppError::Template(e.to_string())
}
