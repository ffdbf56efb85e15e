//! Resource catalog — every regular file under the root is a resource.
//!
//! Listing walks the tree depth-first with entries sorted by file name, so
//! repeated listings of an unchanged tree are identical. Symlinks are neither
//! followed nor listed.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::error::{FileServerError, FileServerResult};
use crate::protocol::{Resource, ResourceBody, ResourceContent};
use crate::sandbox::Sandbox;
use crate::util::mime::mime_type;

/// URI scheme accepted and produced for resources.
pub const FILE_SCHEME: &str = "file://";

/// List every regular file under the root.
pub fn list(sandbox: &Sandbox) -> FileServerResult<Vec<Resource>> {
    let mut resources = Vec::new();
    walk_files(sandbox.root(), &mut |relative: &Path| {
        let name = relative.display().to_string();
        resources.push(Resource {
            uri: sandbox.uri_for(relative),
            description: format!("File: {name}"),
            mime_type: mime_type(relative).to_owned(),
            name,
        });
    })?;
    debug!(count = resources.len(), "listed resources");
    Ok(resources)
}

/// Read the resource addressed by a `file://` URI.
pub fn read(sandbox: &Sandbox, uri: &str) -> FileServerResult<ResourceContent> {
    let Some(raw_path) = uri.strip_prefix(FILE_SCHEME) else {
        return Err(FileServerError::InvalidUri {
            uri: uri.to_owned(),
        });
    };

    let path = sandbox.resolve(raw_path)?;
    let bytes = std::fs::read(&path).map_err(|e| FileServerError::from_io(&path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "read resource");

    let body = match String::from_utf8(bytes) {
        Ok(text) => ResourceBody::Text(text),
        Err(e) => ResourceBody::Blob(BASE64.encode(e.into_bytes())),
    };

    Ok(ResourceContent {
        uri: uri.to_owned(),
        mime_type: mime_type(&path).to_owned(),
        body,
    })
}

/// Visit every regular file under `root` in deterministic order, passing its
/// path relative to `root`.
///
/// Any directory that cannot be read aborts the walk with
/// [`FileServerError::Io`], even when it has disappeared.
pub fn walk_files(root: &Path, visit: &mut dyn FnMut(&Path)) -> FileServerResult<()> {
    walk_inner(root, PathBuf::new(), visit)
}

fn walk_inner(root: &Path, relative: PathBuf, visit: &mut dyn FnMut(&Path)) -> FileServerResult<()> {
    let dir = root.join(&relative);
    let mut entries = std::fs::read_dir(&dir)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|source| FileServerError::Io {
            path: dir.clone(),
            source,
        })?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        // Use entry.file_type() which does NOT follow symlinks.
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        let child = relative.join(entry.file_name());
        if ft.is_dir() {
            walk_inner(root, child, visit)?;
        } else if ft.is_file() {
            visit(&child);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (tempfile::TempDir, Sandbox) {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("x.txt"), "hello").expect("write");
        std::fs::create_dir_all(dir.path().join("d/empty")).expect("mkdir");
        std::fs::write(dir.path().join("d/y.json"), "{}").expect("write");
        let sandbox = Sandbox::new(dir.path()).expect("sandbox");
        (dir, sandbox)
    }

    #[test]
    fn test_list_is_sorted_and_stable() {
        let (_dir, sb) = tree();
        let first = list(&sb).expect("list");
        let names: Vec<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["d/y.json", "x.txt"]);
        assert_eq!(first[0].mime_type, "application/json");
        assert_eq!(first[1].description, "File: x.txt");
        assert_eq!(list(&sb).expect("list"), first);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_symlinks() {
        let (dir, sb) = tree();
        let outside = tempfile::tempdir().expect("tempdir");
        std::fs::write(outside.path().join("secret.txt"), "s").expect("write");
        std::os::unix::fs::symlink(dir.path().join("x.txt"), dir.path().join("alias.txt"))
            .expect("symlink");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).expect("symlink");

        let names: Vec<String> = list(&sb).expect("list").into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["d/y.json", "x.txt"]);
    }

    #[test]
    fn test_walk_failure_is_internal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("root");
        std::fs::create_dir_all(&root).expect("mkdir");
        let sb = Sandbox::new(&root).expect("sandbox");
        std::fs::remove_dir_all(&root).expect("remove");

        let err = list(&sb).expect_err("walk must fail");
        assert!(matches!(err, FileServerError::Io { .. }), "got {err:?}");
        assert_eq!(err.code(), crate::protocol::ErrorCode::InternalError);
    }

    #[test]
    fn test_read_through_outside_file_is_denied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("root");
        std::fs::create_dir_all(&root).expect("mkdir");
        std::fs::write(dir.path().join("secret.txt"), "s").expect("write");
        let sb = Sandbox::new(&root).expect("sandbox");

        let uri = format!("{FILE_SCHEME}{}", sb.root().join("../secret.txt/x").display());
        let err = read(&sb, &uri).expect_err("must deny");
        assert!(matches!(err, FileServerError::AccessDenied { .. }), "got {err:?}");
        assert_eq!(err.code(), crate::protocol::ErrorCode::InvalidParams);
    }

    #[test]
    fn test_uris_strip_to_relative_paths() {
        let (_dir, sb) = tree();
        let prefix = format!("{FILE_SCHEME}{}/", sb.root().display());
        for resource in list(&sb).expect("list") {
            assert_eq!(resource.uri.strip_prefix(&prefix), Some(resource.name.as_str()));
        }
    }

    #[test]
    fn test_read_text() {
        let (_dir, sb) = tree();
        let uri = sb.uri_for(Path::new("x.txt"));
        let content = read(&sb, &uri).expect("read");
        assert_eq!(content.uri, uri);
        assert_eq!(content.mime_type, "text/plain");
        assert_eq!(content.body, ResourceBody::Text("hello".to_owned()));
    }

    #[test]
    fn test_read_binary_as_blob() {
        let (dir, sb) = tree();
        std::fs::write(dir.path().join("img.bin"), [0xff_u8, 0x00, 0x01]).expect("write");
        let content = read(&sb, &sb.uri_for(Path::new("img.bin"))).expect("read");
        assert_eq!(content.mime_type, "application/octet-stream");
        assert_eq!(content.body, ResourceBody::Blob("/wAB".to_owned()));
    }

    #[test]
    fn test_read_errors() {
        let (_dir, sb) = tree();
        assert!(matches!(
            read(&sb, "http://example.com/x.txt"),
            Err(FileServerError::InvalidUri { .. })
        ));
        assert!(matches!(
            read(&sb, &sb.uri_for(Path::new("nope.txt"))),
            Err(FileServerError::NotFound { .. })
        ));
        assert!(matches!(
            read(&sb, "file:///etc/passwd"),
            Err(FileServerError::AccessDenied { .. })
        ));
    }
}
