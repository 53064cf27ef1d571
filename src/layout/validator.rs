use super::Rejected;
use std::path::{Component, Path, PathBuf};

/// The views directory every layout must live under, plus the template
/// extension appended to bare identifiers.
#[derive(Debug, Clone)]
pub struct LayoutRoot {
    dir: PathBuf,
    extension: String,
}

impl LayoutRoot {
    pub fn new(dir: &Path, extension: &str) -> anyhow::Result<Self> {
        if !dir.is_absolute() {
            anyhow::bail!("views root must be absolute: {}", dir.display());
        }
        let mut normalized = PathBuf::new();
        for c in dir.components() {
            match c {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        Ok(Self { dir: normalized, extension: extension.trim_start_matches('.').to_string() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Absolute, lexically normalized path proven to sit inside a [`LayoutRoot`].
/// Only [`validate`] produces one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedLayoutPath(PathBuf);

impl ValidatedLayoutPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Confine `raw` to `root` without touching the filesystem.
///
/// `raw` is always appended below the root: leading separators are ignored,
/// `/` and `\` both split segments, `.` is dropped and `..` pops one segment.
/// Popping above the root, control characters, and segments the platform
/// would read as a root or drive prefix are rejected as [`Rejected::PathEscape`].
pub fn validate(raw: &str, root: &LayoutRoot) -> Result<ValidatedLayoutPath, Rejected> {
    if raw.chars().any(char::is_control) {
        return Err(Rejected::PathEscape);
    }

    let mut segments: Vec<&str> = Vec::new();
    for seg in raw.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Rejected::PathEscape);
                }
            }
            s => {
                let mut comps = Path::new(s).components();
                match (comps.next(), comps.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(s),
                    _ => return Err(Rejected::PathEscape),
                }
            }
        }
    }

    let mut path = root.dir.clone();
    for s in &segments {
        path.push(s);
    }
    if let Some(last) = segments.last() {
        let suffix = format!(".{}", root.extension);
        if !last.ends_with(&suffix) {
            path.set_file_name(format!("{last}{suffix}"));
        }
    }

    if !path.starts_with(&root.dir) {
        return Err(Rejected::PathEscape);
    }
    Ok(ValidatedLayoutPath(path))
}
