//! Relpath resolution against a root directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{validation::validate_relpath, AppError, AppResult};

/// Resolves `relpath` below `root_dir`.
///
/// Absolute paths are rejected, and so is anything that ends up outside the
/// root, lexically or after symlinks are resolved. The returned path is the
/// lexical one, so a symlink inside the root resolves to the link itself and
/// not to its target. The target does not have to exist.
pub fn resolve(root_dir: &Path, relpath: &str) -> AppResult<PathBuf> {
    validate_relpath(relpath)?;
    let rel = Path::new(relpath);
    if rel.has_root() || rel.is_absolute() || matches!(rel.components().next(), Some(Component::Prefix(_))) {
        return Err(AppError::BadRequest("Absolute paths are not allowed".to_string()));
    }

    let base = root_dir.canonicalize().unwrap_or_else(|_| normalize(root_dir));
    let joined = base.join(rel);
    let lexical = normalize(&joined);
    let canonical = joined.canonicalize().unwrap_or_else(|_| lexical.clone());
    if !lexical.starts_with(&base) || !canonical.starts_with(&base) {
        return Err(AppError::BadRequest("Path traversal detected".to_string()));
    }
    Ok(lexical)
}

/// POSIX relpath of `path` below `root_dir`, or `None` if it is not below it.
pub fn to_relpath(root_dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root_dir).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Lexical `.`/`..` folding. Leading `..` that would climb above the first
/// component are dropped, which can only shorten the path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.png"), b"x").unwrap();

        let base = dir.path().canonicalize().unwrap();
        assert_eq!(resolve(dir.path(), "sub/a.png").unwrap(), base.join("sub/a.png"));
        assert_eq!(resolve(dir.path(), "sub/missing.png").unwrap(), base.join("sub/missing.png"));
        assert_eq!(resolve(dir.path(), "sub/../sub/a.png").unwrap(), base.join("sub/a.png"));
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(resolve(dir.path(), "../etc/passwd"), Err(AppError::BadRequest(_))));
        assert!(matches!(resolve(dir.path(), "a/../../x"), Err(AppError::BadRequest(_))));
        assert!(matches!(resolve(dir.path(), "/etc/passwd"), Err(AppError::BadRequest(_))));
        assert!(resolve(dir.path(), "").is_err());
        assert!(resolve(dir.path(), "a\0b").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_leaving_the_root() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.png"), b"x").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.png"), root.path().join("link.png")).unwrap();
        assert!(resolve(root.path(), "link.png").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_inside_the_root_resolve_to_the_link() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("real.png"), b"x").unwrap();
        std::os::unix::fs::symlink(root.path().join("real.png"), root.path().join("link.png")).unwrap();

        let base = root.path().canonicalize().unwrap();
        assert_eq!(resolve(root.path(), "link.png").unwrap(), base.join("link.png"));
    }

    #[test]
    fn relpaths_use_forward_slashes() {
        let root = Path::new("/data/output");
        assert_eq!(to_relpath(root, &root.join("a").join("b.png")), Some("a/b.png".to_string()));
        assert_eq!(to_relpath(root, root), None);
        assert_eq!(to_relpath(root, Path::new("/elsewhere/x.png")), None);
    }
}
