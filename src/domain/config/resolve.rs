//! Effective option resolution

use std::path::{Component, Path, PathBuf};

use super::{PartialRecorderConfig, RecorderConfig};

/// Resolve the effective configuration.
///
/// `target` is the base layer (the defaults when `None`), `source` is
/// layered on top of it. The output directory gets `~` expanded against
/// `home` and is normalized lexically.
pub fn resolve_options(
    target: Option<&RecorderConfig>,
    source: &PartialRecorderConfig,
    home: Option<&Path>,
) -> RecorderConfig {
    let base = target.cloned().unwrap_or_else(RecorderConfig::defaults);
    let mut merged = base.merge(source.clone());
    merged.file.dir = normalize_path(&expand_home(&merged.file.dir, home));
    merged
}

/// Replace a leading `~` component with the home directory.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };

    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Collapse `.`, `..` and repeated separators without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
