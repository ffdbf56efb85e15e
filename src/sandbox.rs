//! Path sandbox — every caller-supplied path is resolved against a fixed root
//! and rejected if the result escapes it.
//!
//! Containment is checked component-wise with [`Path::starts_with`], so a
//! root of `/srv/data` never accepts `/srv/data-other`.
//!
//! A symlink swapped between [`Sandbox::resolve`] and the subsequent read is
//! not detected (TOCTOU); the read itself is not re-checked.

use std::path::{Component, Path, PathBuf};

use crate::error::{FileServerError, FileServerResult};

/// The sandbox root, canonicalized once at startup.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Canonicalize `root` and build a sandbox around it.
    ///
    /// Fails if the root does not exist or is not a directory.
    pub fn new(root: &Path) -> FileServerResult<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| FileServerError::from_io(root, e))?;
        if !root.is_dir() {
            return Err(FileServerError::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "root is not a directory",
                ),
                path: root,
            });
        }
        Ok(Self { root })
    }

    /// Canonical absolute root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `input` (relative to the root, or absolute) to a canonical
    /// absolute path inside the root.
    ///
    /// Paths that do not exist yet are resolved through their deepest
    /// existing ancestor, so the caller can still report "not found".
    pub fn resolve(&self, input: &str) -> FileServerResult<PathBuf> {
        if input.contains('\0') {
            return Err(FileServerError::AccessDenied {
                path: input.replace('\0', "\\0"),
            });
        }

        let joined = self.root.join(input);
        let resolved = canonicalize_lenient(&joined);

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(FileServerError::AccessDenied {
                path: input.to_owned(),
            })
        }
    }

    /// Path of `abs` relative to the root, if it lies inside it.
    pub fn relative<'a>(&self, abs: &'a Path) -> Option<&'a Path> {
        abs.strip_prefix(&self.root).ok()
    }

    /// `file://` URI for a path relative to the root.
    pub fn uri_for(&self, relative: &Path) -> String {
        format!("file://{}", self.root.join(relative).display())
    }
}

/// Canonicalize `path` as far as the filesystem allows.
///
/// When the full path cannot be canonicalized (missing, not a directory,
/// unreadable, symlink loop), the deepest ancestor that can be is used and
/// the remaining components are applied lexically. The result is only a
/// containment candidate; errors for paths inside the root surface later,
/// when the path is actually opened.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }

    for ancestor in path.ancestors().skip(1) {
        let Ok(base) = ancestor.canonicalize() else {
            continue;
        };
        let Ok(tail) = path.strip_prefix(ancestor) else {
            continue;
        };
        return apply_lexically(base, tail);
    }

    apply_lexically(PathBuf::new(), path)
}

fn apply_lexically(mut resolved: PathBuf, tail: &Path) -> PathBuf {
    for component in tail.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::RootDir | Component::Prefix(_) => resolved.push(component),
            Component::CurDir => {}
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, Sandbox) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("data");
        std::fs::create_dir_all(root.join("sub")).expect("mkdir");
        std::fs::write(root.join("a.txt"), "a").expect("write");
        let sandbox = Sandbox::new(&root).expect("sandbox");
        (dir, sandbox)
    }

    #[test]
    fn test_resolve_inside() {
        let (_dir, sb) = setup();
        let p = sb.resolve("a.txt").expect("resolve");
        assert_eq!(p, sb.root().join("a.txt"));
        assert_eq!(sb.resolve("").expect("root"), sb.root());
        assert_eq!(sb.resolve(".").expect("dot"), sb.root());
        assert_eq!(sb.resolve("sub/../a.txt").expect("dotdot"), sb.root().join("a.txt"));
    }

    #[test]
    fn test_resolve_absolute_inside() {
        let (_dir, sb) = setup();
        let abs = sb.root().join("sub");
        let p = sb.resolve(abs.to_str().expect("utf8")).expect("resolve");
        assert_eq!(p, abs);
    }

    #[test]
    fn test_resolve_missing_inside_is_allowed() {
        let (_dir, sb) = setup();
        let p = sb.resolve("missing/nested.txt").expect("resolve");
        assert_eq!(p, sb.root().join("missing/nested.txt"));
    }

    #[test]
    fn test_reject_parent_escape() {
        let (_dir, sb) = setup();
        let err = sb.resolve("../outside.txt").expect_err("must deny");
        assert!(matches!(err, FileServerError::AccessDenied { .. }));
        assert!(sb.resolve("missing/../../x").is_err());
        assert!(sb.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_reject_sibling_with_shared_prefix() {
        let (dir, sb) = setup();
        let sibling = dir.path().join("data-other");
        std::fs::create_dir_all(&sibling).expect("mkdir");
        std::fs::write(sibling.join("secret.txt"), "s").expect("write");

        let err = sb
            .resolve(sibling.join("secret.txt").to_str().expect("utf8"))
            .expect_err("must deny");
        assert!(matches!(err, FileServerError::AccessDenied { .. }));
        assert!(sb.resolve("../data-other/secret.txt").is_err());
    }

    #[test]
    fn test_reject_path_through_outside_file() {
        let (dir, sb) = setup();
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, "s").expect("write");

        let err = sb.resolve("../secret.txt/x").expect_err("must deny");
        assert!(matches!(err, FileServerError::AccessDenied { .. }), "got {err:?}");

        let err = sb
            .resolve(secret.join("x").to_str().expect("utf8"))
            .expect_err("must deny");
        assert!(matches!(err, FileServerError::AccessDenied { .. }), "got {err:?}");
    }

    #[test]
    fn test_path_through_inside_file_stays_inside() {
        let (_dir, sb) = setup();
        let p = sb.resolve("a.txt/x").expect("inside root");
        assert_eq!(p, sb.root().join("a.txt/x"));
    }

    #[test]
    fn test_reject_null_byte() {
        let (_dir, sb) = setup();
        assert!(sb.resolve("a.txt\0.png").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_reject_symlink_escape() {
        let (dir, sb) = setup();
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, "o").expect("write");
        std::os::unix::fs::symlink(&outside, sb.root().join("link.txt")).expect("symlink");

        assert!(sb.resolve("link.txt").is_err());
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Sandbox::new(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_uri_for() {
        let (_dir, sb) = setup();
        let uri = sb.uri_for(Path::new("sub/x.json"));
        assert_eq!(uri, format!("file://{}/sub/x.json", sb.root().display()));
    }
}
