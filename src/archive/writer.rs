//! Archive container boundary.
//!
//! The assembler drives an [`ArchiveWriter`] with ordered entry writes and a
//! final `finish`. The shipped container is a deterministic ZIP file whose
//! `zimmap.json` manifest carries what ZIP itself cannot express: MIME types,
//! the home entry, aliases and metadata.

use std::io::{Seek, Write};

use serde::Serialize;
use serde_json::{Map, Value};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{ArchiveMetadata, AssemblyError};
use crate::utils::mime;

/// Manifest entry path.
pub const MANIFEST_PATH: &str = "zimmap.json";
/// Illustration entry path.
pub const ILLUSTRATION_PATH: &str = "illustration_48x48.png";

/// One content entry.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub path: &'a str,
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
    pub is_home: bool,
}

/// Ordered entry sink. Calls arrive as: metadata, entries/aliases, finish.
pub trait ArchiveWriter {
    type Output;

    /// Paths the container claims for itself.
    fn reserved_paths(&self) -> &[&'static str] {
        &[]
    }

    fn set_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<(), AssemblyError>;

    fn add_entry(&mut self, entry: Entry<'_>) -> Result<(), AssemblyError>;

    /// Make `path` resolve to the earlier entry `target`.
    fn add_alias(&mut self, path: &str, target: &str) -> Result<(), AssemblyError>;

    /// Complete the container; nothing may be written afterwards.
    fn finish(self) -> Result<Self::Output, AssemblyError>;
}

#[derive(Debug, Default, Serialize)]
struct Manifest {
    home: Option<String>,
    created: Option<String>,
    metadata: Map<String, Value>,
    mime_types: Map<String, Value>,
    aliases: Map<String, Value>,
}

/// Deterministic ZIP container: fixed 1980-01-01 timestamps, deflate for
/// compressible payloads, stored for already-compressed ones.
pub struct ZipArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    manifest: Manifest,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        // DateTime::default() is 1980-01-01 00:00:00
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        Self {
            zip: ZipWriter::new(inner),
            manifest: Manifest::default(),
            options,
        }
    }

    fn write_file(&mut self, path: &str, bytes: &[u8], mime_type: &str) -> Result<(), AssemblyError> {
        let options = if mime::is_precompressed(mime_type) {
            self.options.compression_method(CompressionMethod::Stored)
        } else {
            self.options
        };
        self.zip.start_file(path, options)?;
        self.zip
            .write_all(bytes)
            .map_err(|e| AssemblyError::Io(path.into(), e))?;
        Ok(())
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    type Output = W;

    fn reserved_paths(&self) -> &[&'static str] {
        &[MANIFEST_PATH, ILLUSTRATION_PATH]
    }

    fn set_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<(), AssemblyError> {
        self.manifest.created = Some(metadata.created.to_rfc3339());
        for (key, value) in metadata.entries() {
            self.manifest.metadata.insert(key.to_string(), Value::String(value));
        }
        self.manifest.metadata.insert(
            "Illustration_48x48@1".to_string(),
            Value::String(ILLUSTRATION_PATH.to_string()),
        );
        self.write_file(ILLUSTRATION_PATH, &metadata.illustration, mime::types::PNG)
    }

    fn add_entry(&mut self, entry: Entry<'_>) -> Result<(), AssemblyError> {
        if entry.is_home {
            self.manifest.home = Some(entry.path.to_string());
        }
        self.manifest
            .mime_types
            .insert(entry.path.to_string(), Value::String(entry.mime_type.to_string()));
        self.write_file(entry.path, entry.bytes, entry.mime_type)
    }

    fn add_alias(&mut self, path: &str, target: &str) -> Result<(), AssemblyError> {
        self.manifest
            .aliases
            .insert(path.to_string(), Value::String(target.to_string()));
        Ok(())
    }

    fn finish(mut self) -> Result<W, AssemblyError> {
        let manifest = serde_json::to_vec_pretty(&self.manifest)?;
        self.write_file(MANIFEST_PATH, &manifest, mime::types::JSON)?;
        Ok(self.zip.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::metadata::tests::{sample_fields, sample_png};
    use crate::utils::date::DateTimeUtc;
    use std::io::{Cursor, Read};

    fn metadata() -> ArchiveMetadata {
        ArchiveMetadata::new(sample_fields(), &sample_png(), DateTimeUtc::from_ymd(2024, 6, 1))
            .unwrap()
    }

    fn write_sample() -> Vec<u8> {
        let mut writer = ZipArchiveWriter::new(Cursor::new(Vec::new()));
        writer.set_metadata(&metadata()).unwrap();
        writer
            .add_entry(Entry {
                path: "index.html",
                bytes: b"<html></html>",
                mime_type: mime::types::HTML,
                is_home: true,
            })
            .unwrap();
        writer
            .add_entry(Entry {
                path: "0/0/0.pbf",
                bytes: b"tile",
                mime_type: mime::types::PROTOBUF,
                is_home: false,
            })
            .unwrap();
        writer.add_alias("1/0/0.pbf", "0/0/0.pbf").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_zip_contains_entries_and_manifest() {
        let bytes = write_sample();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"index.html".to_string()));
        assert!(names.contains(&ILLUSTRATION_PATH.to_string()));
        assert!(!names.contains(&"1/0/0.pbf".to_string()));

        let mut manifest = String::new();
        archive
            .by_name(MANIFEST_PATH)
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        let manifest: Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["home"], "index.html");
        assert_eq!(manifest["created"], "2024-06-01T00:00:00Z");
        assert_eq!(manifest["mime_types"]["0/0/0.pbf"], mime::types::PROTOBUF);
        assert_eq!(manifest["aliases"]["1/0/0.pbf"], "0/0/0.pbf");
        assert_eq!(manifest["metadata"]["Title"], "Monaco Map");
    }

    #[test]
    fn test_zip_is_byte_identical_across_runs() {
        assert_eq!(write_sample(), write_sample());
    }
}
