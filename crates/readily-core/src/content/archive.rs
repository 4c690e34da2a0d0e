//! In-memory ZIP reader for EPUB containers.
//!
//! Only what the extractor needs: the central directory listing (in archive
//! order) and whole-entry reads for stored and deflated members.

use log::debug;
use miniz_oxide::inflate::decompress_to_vec_with_limit;
use thiserror::Error;

use super::ArchiveDecoder;

const ZIP_EOCD_SIG: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const ZIP_CDIR_SIG: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];
const ZIP_LOCAL_SIG: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EOCD_MIN_BYTES: usize = 22;
const ZIP_EOCD_MAX_COMMENT: usize = u16::MAX as usize;
const ZIP_CDIR_HEADER_BYTES: usize = 46;
const ZIP_LOCAL_HEADER_BYTES: usize = 30;
const ZIP_METHOD_STORED: u16 = 0;
const ZIP_METHOD_DEFLATED: u16 = 8;
const ZIP_MAX_CDIR_ENTRIES: usize = 65_535;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("not a zip archive")]
    NotZip,
    #[error("central directory is truncated")]
    TruncatedDirectory,
    #[error("entry `{0}` not found")]
    MissingEntry(String),
    #[error("entry `{name}` has a corrupt local header")]
    CorruptEntry { name: String },
    #[error("entry `{name}` uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },
    #[error("entry `{name}` failed to inflate")]
    DecodeFailed { name: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ZipEntryRef {
    compression: u16,
    compressed_size: u32,
    uncompressed_size: u32,
    local_header_offset: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct ZipEntry {
    name: String,
    location: ZipEntryRef,
}

/// Parsed view over the bytes of a ZIP file.
#[derive(Debug, Clone)]
pub struct ZipArchive<'a> {
    bytes: &'a [u8],
    entries: Vec<ZipEntry>,
}

impl<'a> ZipArchive<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        let (cdir_offset, cdir_entries) = cdir_info(bytes)?;

        let mut entries = Vec::with_capacity(cdir_entries.min(1024));
        let mut cursor = cdir_offset;
        for _ in 0..cdir_entries.min(ZIP_MAX_CDIR_ENTRIES) {
            let header = bytes
                .get(cursor..cursor + ZIP_CDIR_HEADER_BYTES)
                .ok_or(ArchiveError::TruncatedDirectory)?;
            if !header.starts_with(&ZIP_CDIR_SIG) {
                return Err(ArchiveError::TruncatedDirectory);
            }

            let compression = read_u16_le(header, 10);
            let compressed_size = read_u32_le(header, 20);
            let uncompressed_size = read_u32_le(header, 24);
            let name_len = read_u16_le(header, 28) as usize;
            let extra_len = read_u16_le(header, 30) as usize;
            let comment_len = read_u16_le(header, 32) as usize;
            let local_header_offset = read_u32_le(header, 42);

            let name_start = cursor + ZIP_CDIR_HEADER_BYTES;
            let name_bytes = bytes
                .get(name_start..name_start + name_len)
                .ok_or(ArchiveError::TruncatedDirectory)?;

            entries.push(ZipEntry {
                name: String::from_utf8_lossy(name_bytes).into_owned(),
                location: ZipEntryRef {
                    compression,
                    compressed_size,
                    uncompressed_size,
                    local_header_offset,
                },
            });

            cursor = name_start + name_len + extra_len + comment_len;
        }

        debug!(
            "zip: parsed central directory entries={} cdir_offset={}",
            entries.len(),
            cdir_offset
        );

        Ok(Self { bytes, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in central directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ArchiveError::MissingEntry(name.to_owned()))?;
        self.read_entry(entry)
    }

    fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>, ArchiveError> {
        let corrupt = || ArchiveError::CorruptEntry {
            name: entry.name.clone(),
        };
        let location = entry.location;

        let data_offset = entry_data_offset(self.bytes, location).ok_or_else(corrupt)?;
        let data = self
            .bytes
            .get(data_offset..data_offset + location.compressed_size as usize)
            .ok_or_else(corrupt)?;

        match location.compression {
            ZIP_METHOD_STORED => Ok(data.to_vec()),
            ZIP_METHOD_DEFLATED => {
                // One spare byte so a stream ending exactly at the declared size reports Done.
                let limit = (location.uncompressed_size as usize).saturating_add(1);
                decompress_to_vec_with_limit(data, limit).map_err(|_| {
                    ArchiveError::DecodeFailed {
                        name: entry.name.clone(),
                    }
                })
            }
            method => Err(ArchiveError::UnsupportedCompression {
                name: entry.name.clone(),
                method,
            }),
        }
    }
}

impl ArchiveDecoder for ZipArchive<'_> {
    type Error = ArchiveError;

    fn entry_names(&self) -> Vec<String> {
        self.names().map(str::to_owned).collect()
    }

    fn read_text(&self, name: &str) -> Result<String, Self::Error> {
        let raw = self.read(name)?;
        Ok(match String::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }
}

fn cdir_info(bytes: &[u8]) -> Result<(usize, usize), ArchiveError> {
    if bytes.len() < ZIP_EOCD_MIN_BYTES {
        return Err(ArchiveError::NotZip);
    }

    let search_floor = bytes
        .len()
        .saturating_sub(ZIP_EOCD_MIN_BYTES + ZIP_EOCD_MAX_COMMENT);
    let last_start = bytes.len() - ZIP_EOCD_MIN_BYTES;
    let eocd_pos = (search_floor..=last_start)
        .rev()
        .find(|idx| bytes[*idx..].starts_with(&ZIP_EOCD_SIG))
        .ok_or(ArchiveError::NotZip)?;

    let cdir_entries = read_u16_le(bytes, eocd_pos + 10) as usize;
    let cdir_offset = read_u32_le(bytes, eocd_pos + 16) as usize;
    if cdir_offset > eocd_pos {
        return Err(ArchiveError::TruncatedDirectory);
    }

    Ok((cdir_offset, cdir_entries))
}

fn entry_data_offset(bytes: &[u8], entry: ZipEntryRef) -> Option<usize> {
    let start = entry.local_header_offset as usize;
    let local = bytes.get(start..start + ZIP_LOCAL_HEADER_BYTES)?;
    if !local.starts_with(&ZIP_LOCAL_SIG) {
        return None;
    }

    let name_len = read_u16_le(local, 26) as usize;
    let extra_len = read_u16_le(local, 28) as usize;
    start
        .checked_add(ZIP_LOCAL_HEADER_BYTES)
        .and_then(|value| value.checked_add(name_len))
        .and_then(|value| value.checked_add(extra_len))
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
