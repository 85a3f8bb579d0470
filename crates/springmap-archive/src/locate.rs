//! Locating conventional map files in an extracted archive tree.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::Result;

/// The files of interest found in an extracted map archive.
///
/// Spring archives conventionally hold exactly one `.smf` and one `.smt`
/// (under `maps/`), an optional legacy `.smd`, an optional `mapinfo.lua`
/// at the root, and optional image resources. Only the first match of
/// each kind is kept; resource images are collected in walk order.
#[derive(Debug, Default)]
pub struct MapFiles {
    /// The SMF map file.
    pub smf: Option<PathBuf>,
    /// The SMT tile file.
    pub smt: Option<PathBuf>,
    /// Legacy SMD metadata.
    pub smd: Option<PathBuf>,
    /// Modern mapinfo.lua metadata.
    pub mapinfo: Option<PathBuf>,
    /// DDS resources (skybox candidates).
    pub dds: Vec<PathBuf>,
    /// Other image resources (.png/.jpg/.tga).
    pub images: Vec<PathBuf>,
}

impl MapFiles {
    /// Resolve a resource file name case-insensitively against the
    /// collected image and DDS paths.
    pub fn find_resource(&self, name: &str) -> Option<&Path> {
        let matches_name = |p: &&PathBuf| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        };
        self.dds
            .iter()
            .find(matches_name)
            .or_else(|| self.images.iter().find(matches_name))
            .map(PathBuf::as_path)
    }
}

/// Walk an extracted archive tree and classify its contents.
pub fn locate_map_files(root: &Path) -> Result<MapFiles> {
    let mut files = MapFiles::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match (file_name.as_str(), extension.as_str()) {
            ("mapinfo.lua", _) => {
                files.mapinfo.get_or_insert_with(|| path.to_path_buf());
            }
            (_, "smf") => {
                files.smf.get_or_insert_with(|| path.to_path_buf());
            }
            (_, "smt") => {
                files.smt.get_or_insert_with(|| path.to_path_buf());
            }
            (_, "smd") => {
                files.smd.get_or_insert_with(|| path.to_path_buf());
            }
            (_, "dds") => files.dds.push(path.to_path_buf()),
            (_, "png" | "jpg" | "jpeg" | "tga") => files.images.push(path.to_path_buf()),
            _ => {}
        }
    }

    debug!(
        smf = ?files.smf,
        smt = ?files.smt,
        dds = files.dds.len(),
        "located archive contents"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_locates_conventional_layout() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("maps/red_comet.smf"));
        touch(&root.join("maps/red_comet.smt"));
        touch(&root.join("maps/red_comet.smd"));
        touch(&root.join("mapinfo.lua"));
        touch(&root.join("maps/skybox.dds"));
        touch(&root.join("maps/detail.PNG"));

        let files = locate_map_files(root).unwrap();
        assert!(files.smf.unwrap().ends_with("maps/red_comet.smf"));
        assert!(files.smt.is_some());
        assert!(files.smd.is_some());
        assert!(files.mapinfo.is_some());
        assert_eq!(files.dds.len(), 1);
        assert_eq!(files.images.len(), 1);
    }

    #[test]
    fn test_find_resource_case_insensitive() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("maps/SkyBox.dds"));

        let files = locate_map_files(root).unwrap();
        let found = files.find_resource("skybox.dds").unwrap();
        assert!(found.ends_with("maps/SkyBox.dds"));
        assert!(files.find_resource("other.dds").is_none());
    }

    #[test]
    fn test_missing_files_are_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = locate_map_files(dir.path()).unwrap();
        assert!(files.smf.is_none());
        assert!(files.smt.is_none());
    }
}
