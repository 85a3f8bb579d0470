//! `.sdz` (standard ZIP) archive reader.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::DeflateDecoder;
use memmap2::Mmap;
use springmap_common::BinaryReader;
use tracing::debug;

use crate::zip::{CentralDirectoryHeader, CompressionMethod, EocdRecord, LocalFileHeader};
use crate::{Error, Result};

/// A single archive entry, described by the central directory.
#[derive(Debug, Clone)]
pub struct SdzEntry {
    /// Entry path within the archive ('/'-separated).
    pub name: String,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Uncompressed size in bytes.
    pub uncompressed_size: u64,
    /// Compression method.
    pub compression_method: CompressionMethod,
    /// Offset of the local file header.
    pub local_header_offset: u64,
}

impl SdzEntry {
    /// Directory entries carry no data.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Memory-mapped `.sdz` archive reader.
pub struct SdzArchive {
    mmap: Mmap,
    entries: Vec<SdzEntry>,
}

impl SdzArchive {
    /// Open an archive and parse its central directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        let entries = parse_entries(&mmap)?;
        debug!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "opened sdz archive"
        );
        Ok(Self { mmap, entries })
    }

    /// The parsed entries.
    pub fn entries(&self) -> &[SdzEntry] {
        &self.entries
    }

    /// Read and decompress one entry.
    pub fn read(&self, entry: &SdzEntry) -> Result<Vec<u8>> {
        read_entry(&self.mmap, entry)
    }

    /// Extract every file entry below `dest`, creating directories as
    /// needed. Entry paths are sanitized; an entry that would escape
    /// `dest` fails the extraction.
    pub fn extract_all(&self, dest: &Path) -> Result<()> {
        for entry in &self.entries {
            if entry.is_dir() {
                continue;
            }
            let relative = sanitize_entry_path(&entry.name)?;
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let data = self.read(entry)?;
            std::fs::write(&target, data)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SdzArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdzArchive")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Turn an archive entry name into a safe relative path.
fn sanitize_entry_path(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(Error::UnsafeEntryPath(name.to_string())),
        }
    }
    if out.as_os_str().is_empty() {
        return Err(Error::UnsafeEntryPath(name.to_string()));
    }
    Ok(out)
}

/// Locate the EOCD record by scanning backwards from the end of the file.
fn find_eocd(data: &[u8]) -> Result<usize> {
    let search_start = data.len().saturating_sub(EocdRecord::MAX_SEARCH);
    let window = &data[search_start..];

    window
        .windows(4)
        .rposition(|w| w == EocdRecord::MAGIC)
        .map(|pos| search_start + pos)
        .ok_or(Error::EocdNotFound)
}

/// Parse the central directory into entry records.
fn parse_entries(data: &[u8]) -> Result<Vec<SdzEntry>> {
    let eocd_offset = find_eocd(data)?;
    let mut reader = BinaryReader::new_at(data, eocd_offset + 4);
    let eocd: EocdRecord = reader.read_struct()?;

    let count = eocd.central_dir_count_total as usize;
    let mut entries = Vec::with_capacity(count);

    let mut reader = BinaryReader::new_at(data, eocd.central_dir_offset as usize);
    for _ in 0..count {
        let sig = reader.read_u32()?;
        if sig != CentralDirectoryHeader::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: CentralDirectoryHeader::SIGNATURE,
                actual: sig,
            });
        }

        let header: CentralDirectoryHeader = reader.read_struct()?;
        let name_bytes = reader.read_bytes(header.file_name_length as usize)?;
        let name = String::from_utf8_lossy(name_bytes).replace('\\', "/");
        reader.advance(header.extra_field_length as usize + header.file_comment_length as usize);

        let compression_method = CompressionMethod::try_from(header.compression_method)
            .map_err(Error::UnsupportedCompression)?;

        entries.push(SdzEntry {
            name,
            compressed_size: header.compressed_size as u64,
            uncompressed_size: header.uncompressed_size as u64,
            compression_method,
            local_header_offset: header.local_header_offset as u64,
        });
    }

    Ok(entries)
}

/// Read one entry's bytes, walking its local header for the data offset.
fn read_entry(data: &[u8], entry: &SdzEntry) -> Result<Vec<u8>> {
    if entry.uncompressed_size == 0 {
        return Ok(Vec::new());
    }

    let offset = entry.local_header_offset as usize;
    let mut reader = BinaryReader::new_at(data, offset);

    let sig = reader.read_u32()?;
    if sig != LocalFileHeader::SIGNATURE {
        return Err(Error::InvalidSignature {
            expected: LocalFileHeader::SIGNATURE,
            actual: sig,
        });
    }

    let local: LocalFileHeader = reader.read_struct()?;
    reader.advance(local.variable_data_size());

    let compressed = reader.read_bytes(entry.compressed_size as usize)?;

    match entry.compression_method {
        CompressionMethod::Store => {
            if compressed.len() != entry.uncompressed_size as usize {
                return Err(Error::Decompression(format!(
                    "stored entry size mismatch: expected {}, got {}",
                    entry.uncompressed_size,
                    compressed.len()
                )));
            }
            Ok(compressed.to_vec())
        }
        CompressionMethod::Deflate => {
            let mut output = Vec::with_capacity(entry.uncompressed_size as usize);
            DeflateDecoder::new(compressed)
                .read_to_end(&mut output)
                .map_err(|e| Error::Decompression(e.to_string()))?;
            Ok(output)
        }
    }
}

/// Synthetic archive fixtures shared with downstream crate tests.
#[doc(hidden)]
pub mod testdata {
    use super::*;

    /// Build a minimal valid ZIP buffer with the given entries.
    ///
    /// `deflate` selects the compression method per entry. CRCs are left
    /// zero; the reader does not verify them.
    pub fn build_zip(entries: &[(&str, &[u8], bool)]) -> Vec<u8> {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut data = Vec::new();
        let mut central = Vec::new();

        for (name, content, deflate) in entries {
            let local_offset = data.len() as u32;
            let (method, payload) = if *deflate {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(content).unwrap();
                (8u16, encoder.finish().unwrap())
            } else {
                (0u16, content.to_vec())
            };

            // Local file header.
            data.extend_from_slice(&LocalFileHeader::SIGNATURE.to_le_bytes());
            data.extend_from_slice(&20u16.to_le_bytes()); // version needed
            data.extend_from_slice(&0u16.to_le_bytes()); // flags
            data.extend_from_slice(&method.to_le_bytes());
            data.extend_from_slice(&0u32.to_le_bytes()); // mtime
            data.extend_from_slice(&0u32.to_le_bytes()); // crc
            data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            data.extend_from_slice(&(content.len() as u32).to_le_bytes());
            data.extend_from_slice(&(name.len() as u16).to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes()); // extra len
            data.extend_from_slice(name.as_bytes());
            data.extend_from_slice(&payload);

            // Central directory header.
            central.extend_from_slice(&CentralDirectoryHeader::SIGNATURE.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes()); // made by
            central.extend_from_slice(&20u16.to_le_bytes()); // needed
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&method.to_le_bytes());
            central.extend_from_slice(&0u32.to_le_bytes()); // mtime
            central.extend_from_slice(&0u32.to_le_bytes()); // crc
            central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            central.extend_from_slice(&(content.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // extra len
            central.extend_from_slice(&0u16.to_le_bytes()); // comment len
            central.extend_from_slice(&0u16.to_le_bytes()); // disk
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central.extend_from_slice(&local_offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let central_offset = data.len() as u32;
        data.extend_from_slice(&central);

        // EOCD.
        data.extend_from_slice(&EocdRecord::SIGNATURE.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes()); // disk
        data.extend_from_slice(&0u16.to_le_bytes()); // cd disk
        data.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        data.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        data.extend_from_slice(&(central.len() as u32).to_le_bytes());
        data.extend_from_slice(&central_offset.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes()); // comment len

        data
    }
}
