//! core::paths
//!
//! Centralized path routing for sidecar storage locations.
//!
//! # Storage Layout
//!
//! A sidecar for `/photos/2024/beach.jpg` can live in one of two places:
//! - local: `/photos/2024/.metadata/beach.jpg.gqv`
//! - cache: `<cache root>/metadata/photos/2024/beach.jpg.gqv`
//!
//! The cache location mirrors the absolute directory of the image below the
//! cache root, so every image maps to exactly one cache path.
//!
//! **Hard rule:** no code outside this module joins `.metadata` or
//! `metadata/` onto a path. All sidecar paths go through [`SidecarPaths`].
//!
//! # Example
//!
//! ```
//! use imgmeta::core::paths::SidecarPaths;
//! use std::path::{Path, PathBuf};
//!
//! let paths = SidecarPaths::new(PathBuf::from("/home/me/.cache/imgmeta"));
//! let image = Path::new("/photos/2024/beach.jpg");
//!
//! assert_eq!(
//!     paths.local_path(image),
//!     Some(PathBuf::from("/photos/2024/.metadata/beach.jpg.gqv"))
//! );
//! assert_eq!(
//!     paths.cache_path(image),
//!     Some(PathBuf::from("/home/me/.cache/imgmeta/metadata/photos/2024/beach.jpg.gqv"))
//! );
//! ```

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Extension appended to the image file name to form the sidecar name.
pub const SIDECAR_EXTENSION: &str = ".gqv";

/// Directory next to the image that holds local sidecars.
pub const LOCAL_DIR_NAME: &str = ".metadata";

/// Directory below the cache root that holds cached sidecars.
pub const CACHE_SUBDIR: &str = "metadata";

/// Path routing for sidecar files.
///
/// # Invariants
///
/// - Image paths passed in are expected to be absolute; relative paths are
///   routed as if rooted at `/`.
/// - Cache paths never escape `cache_root`: `..` components are resolved
///   lexically before mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarPaths {
    /// Root of the per-user cache (e.g. `~/.cache/imgmeta`).
    pub cache_root: PathBuf,
}

impl SidecarPaths {
    /// Create path routing below `cache_root`.
    pub fn new(cache_root: PathBuf) -> Self {
        Self { cache_root }
    }

    /// Sidecar file name for an image: `<name>.gqv`.
    ///
    /// Returns `None` if the path has no file name.
    pub fn sidecar_name(image: &Path) -> Option<OsString> {
        let mut name = image.file_name()?.to_os_string();
        name.push(SIDECAR_EXTENSION);
        Some(name)
    }

    /// Directory for local sidecars of images in the same directory as `image`.
    pub fn local_dir(&self, image: &Path) -> Option<PathBuf> {
        let parent = image.parent()?;
        Some(parent.join(LOCAL_DIR_NAME))
    }

    /// Local sidecar path for `image`.
    pub fn local_path(&self, image: &Path) -> Option<PathBuf> {
        Some(self.local_dir(image)?.join(Self::sidecar_name(image)?))
    }

    /// Cache directory mirroring the directory of `image`.
    pub fn cache_dir(&self, image: &Path) -> Option<PathBuf> {
        let parent = image.parent()?;
        let mut dir = self.cache_root.join(CACHE_SUBDIR);
        for part in normalized_components(parent) {
            dir.push(part);
        }
        Some(dir)
    }

    /// Cache sidecar path for `image`.
    pub fn cache_path(&self, image: &Path) -> Option<PathBuf> {
        Some(self.cache_dir(image)?.join(Self::sidecar_name(image)?))
    }

    /// Candidate sidecar paths in lookup order (local first).
    pub fn candidates(&self, image: &Path) -> Vec<PathBuf> {
        [self.local_path(image), self.cache_path(image)]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Normal components of `path` with `.` dropped and `..` applied lexically.
fn normalized_components(path: &Path) -> Vec<OsString> {
    let mut parts: Vec<OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> SidecarPaths {
        SidecarPaths::new(PathBuf::from("/cache"))
    }

    #[test]
    fn sidecar_name_appends_extension() {
        assert_eq!(
            SidecarPaths::sidecar_name(Path::new("/a/b/photo.JPG")),
            Some(OsString::from("photo.JPG.gqv"))
        );
    }

    #[test]
    fn sidecar_name_requires_file_name() {
        assert_eq!(SidecarPaths::sidecar_name(Path::new("/")), None);
    }

    #[test]
    fn local_path_next_to_image() {
        assert_eq!(
            paths().local_path(Path::new("/a/b/photo.jpg")),
            Some(PathBuf::from("/a/b/.metadata/photo.jpg.gqv"))
        );
    }

    #[test]
    fn cache_path_mirrors_directory() {
        assert_eq!(
            paths().cache_path(Path::new("/a/b/photo.jpg")),
            Some(PathBuf::from("/cache/metadata/a/b/photo.jpg.gqv"))
        );
    }

    #[test]
    fn cache_path_cannot_escape_root() {
        assert_eq!(
            paths().cache_path(Path::new("/a/../../../etc/photo.jpg")),
            Some(PathBuf::from("/cache/metadata/etc/photo.jpg.gqv"))
        );
    }

    #[test]
    fn cache_path_skips_cur_dir() {
        assert_eq!(
            paths().cache_path(Path::new("/a/./b/photo.jpg")),
            Some(PathBuf::from("/cache/metadata/a/b/photo.jpg.gqv"))
        );
    }

    #[test]
    fn candidates_local_first() {
        let candidates = paths().candidates(Path::new("/a/photo.jpg"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/a/.metadata/photo.jpg.gqv"),
                PathBuf::from("/cache/metadata/a/photo.jpg.gqv"),
            ]
        );
    }
}
