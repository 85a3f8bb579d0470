//! Archive extraction into a scoped temporary directory.

use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::sdz::SdzArchive;
use crate::{Error, Result};

/// The two recognized archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.sd7`: a 7z container.
    SevenZip,
    /// `.sdz`: a ZIP container.
    Zip,
}

impl ArchiveKind {
    /// Classify a path by its suffix (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match suffix.as_deref() {
            Some("sd7") => Ok(Self::SevenZip),
            Some("sdz") => Ok(Self::Zip),
            _ => Err(Error::UnrecognizedSuffix(suffix)),
        }
    }
}

/// An archive unpacked into a temporary directory.
///
/// The directory is owned by this value: dropping it removes the tree,
/// which is what guarantees cleanup on early returns, surfaced errors and
/// panics alike. Call [`close`](Self::close) to remove it eagerly and
/// observe (log) any cleanup failure.
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: TempDir,
    kind: ArchiveKind,
}

impl ExtractedArchive {
    /// Root of the extracted tree.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The container kind the archive was classified as.
    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Remove the temporary directory now. Removal failures are logged
    /// and swallowed; they must never mask a parse result.
    pub fn close(self) {
        if let Err(e) = self.dir.close() {
            warn!("temporary directory cleanup failed: {e}");
        }
    }
}

/// Extract a map archive into a fresh temporary directory.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<ExtractedArchive> {
    let path = path.as_ref();
    let kind = ArchiveKind::from_path(path)?;
    let dir = TempDir::with_prefix("springmap-")?;
    debug!(archive = %path.display(), dest = %dir.path().display(), ?kind, "extracting");

    match kind {
        ArchiveKind::Zip => {
            let archive = SdzArchive::open(path)?;
            archive.extract_all(dir.path())?;
        }
        ArchiveKind::SevenZip => {
            sevenz_rust::decompress_file(path, dir.path())
                .map_err(|e| Error::SevenZip(e.to_string()))?;
        }
    }

    Ok(ExtractedArchive { dir, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdz::testdata::build_zip;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ArchiveKind::from_path(Path::new("a/red_comet.sd7")).unwrap(),
            ArchiveKind::SevenZip
        );
        assert_eq!(
            ArchiveKind::from_path(Path::new("TROPICAL-V2.SDZ")).unwrap(),
            ArchiveKind::Zip
        );
        assert!(matches!(
            ArchiveKind::from_path(Path::new("map.zip")),
            Err(Error::UnrecognizedSuffix(Some(s))) if s == "zip"
        ));
        assert!(matches!(
            ArchiveKind::from_path(Path::new("noext")),
            Err(Error::UnrecognizedSuffix(None))
        ));
    }

    #[test]
    fn test_extract_sdz_and_cleanup() {
        let file = tempfile::Builder::new()
            .suffix(".sdz")
            .tempfile()
            .unwrap();
        std::fs::write(
            file.path(),
            build_zip(&[("maps/mini.smd", b"Gravity=130;", true)]),
        )
        .unwrap();

        let extracted = extract(file.path()).unwrap();
        let root = extracted.path().to_path_buf();
        assert_eq!(extracted.kind(), ArchiveKind::Zip);
        assert_eq!(
            std::fs::read(root.join("maps/mini.smd")).unwrap(),
            b"Gravity=130;"
        );

        extracted.close();
        assert!(!root.exists());
    }

    #[test]
    fn test_cleanup_on_drop() {
        let file = tempfile::Builder::new()
            .suffix(".sdz")
            .tempfile()
            .unwrap();
        std::fs::write(file.path(), build_zip(&[("a", b"x", false)])).unwrap();

        let root = {
            let extracted = extract(file.path()).unwrap();
            extracted.path().to_path_buf()
        };
        assert!(!root.exists());
    }
}
