use crate::layout::EnvironmentMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MODE_ENV_VAR: &str = "LINTEL_ENV";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mode: EnvironmentMode,
    pub server: Server,
    pub views: Views,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub bind_addr: String,
    pub port: u16,
    #[serde(default = "default_max_request_kb")]
    pub max_request_kb: usize,
}
fn default_max_request_kb() -> usize { 64 }

#[derive(Debug, Deserialize, Clone)]
pub struct Views {
    pub root_dir: PathBuf,
    pub default_layout: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_stat_timeout_ms")]
    pub stat_timeout_ms: u64,
}
fn default_extension() -> String { "html".to_string() }
fn default_stat_timeout_ms() -> u64 { 2000 }

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.views.root_dir.is_dir() {
            anyhow::bail!("root_dir does not exist or is not a directory: {}", self.views.root_dir.display());
        }
        if !self.views.default_layout.is_file() {
            anyhow::bail!("default_layout is not a file: {}", self.views.default_layout.display());
        }
        let root = canonical_root(&self.views.root_dir)?;
        let default_layout = dunce::canonicalize(&self.views.default_layout)?;
        if !default_layout.starts_with(&root) {
            anyhow::bail!("default_layout must live under root_dir");
        }
        let ext = self.views.extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            anyhow::bail!("extension must be a bare file extension");
        }
        if self.views.stat_timeout_ms == 0 { anyhow::bail!("stat_timeout_ms must be > 0"); }
        if self.server.max_request_kb == 0 { anyhow::bail!("max_request_kb must be > 0"); }
        Ok(())
    }

    /// Mode from the config file unless `LINTEL_ENV` names a different one.
    pub fn effective_mode(&self) -> EnvironmentMode {
        match std::env::var(MODE_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => v.parse().unwrap_or(EnvironmentMode::Other),
            _ => self.mode,
        }
    }
}

pub fn canonical_root(root: &Path) -> anyhow::Result<PathBuf> {
    let c = dunce::canonicalize(root)?;
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_views(dir: &Path) {
        fs::create_dir_all(dir.join("views/layout")).unwrap();
        fs::write(dir.join("views/layout/default.html"), "{{ body }}").unwrap();
    }

    #[test]
    fn loads_toml_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_views(tmp.path());
        let cfg_path = tmp.path().join("lintel.toml");
        let body = format!(
            "mode = \"production\"\n[server]\nbind_addr = \"127.0.0.1\"\nport = 0\n[views]\nroot_dir = {:?}\ndefault_layout = {:?}\n",
            tmp.path().join("views"),
            tmp.path().join("views/layout/default.html"),
        );
        fs::write(&cfg_path, body).unwrap();
        let cfg = Config::load(&cfg_path).unwrap();
        assert_eq!(cfg.mode, EnvironmentMode::Production);
        assert_eq!(cfg.views.extension, "html");
        assert_eq!(cfg.views.stat_timeout_ms, 2000);
        assert_eq!(cfg.server.max_request_kb, 64);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_default_layout_outside_root() {
        let tmp = tempfile::tempdir().unwrap();
        write_views(tmp.path());
        fs::write(tmp.path().join("stray.html"), "x").unwrap();
        let cfg = Config {
            mode: EnvironmentMode::Development,
            server: Server { bind_addr: "127.0.0.1".into(), port: 0, max_request_kb: 64 },
            views: Views {
                root_dir: tmp.path().join("views"),
                default_layout: tmp.path().join("stray.html"),
                extension: "html".into(),
                stat_timeout_ms: 100,
            },
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("under root_dir"));
    }
}
