//! Archive metadata validation and illustration normalization.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use thiserror::Error;

use crate::utils::date::DateTimeUtc;

pub const MAX_TITLE_CHARS: usize = 30;
pub const MAX_DESCRIPTION_CHARS: usize = 80;
pub const MAX_LONG_DESCRIPTION_CHARS: usize = 4000;

/// Edge of the square archive illustration.
pub const ILLUSTRATION_SIZE: u32 = 48;
/// Edge of the square favicon derived from it.
pub const FAVICON_SIZE: u32 = 32;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata `{0}` must not be empty")]
    Empty(&'static str),

    #[error("metadata `{field}` is {len} characters long, at most {max} allowed")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("long description must differ from the description")]
    LongDescriptionDuplicate,

    #[error("language `{0}` is not a 3-letter ISO 639-3 code")]
    Language(String),

    #[error("illustration is not a decodable raster image")]
    Illustration(#[source] image::ImageError),
}

/// Caller-supplied metadata before validation.
#[derive(Debug, Clone, Default)]
pub struct MetadataFields {
    pub name: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub creator: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub language: String,
}

/// Validated metadata, written once by the assembler.
#[derive(Debug, Clone)]
pub struct ArchiveMetadata {
    pub fields: MetadataFields,
    /// 48x48 PNG.
    pub illustration: Vec<u8>,
    /// 32x32 ICO.
    pub favicon: Vec<u8>,
    pub created: DateTimeUtc,
}

impl ArchiveMetadata {
    /// Validate `fields` and normalize the raw illustration bytes.
    pub fn new(
        fields: MetadataFields,
        illustration: &[u8],
        created: DateTimeUtc,
    ) -> Result<Self, MetadataError> {
        validate_fields(&fields)?;
        let image = image::load_from_memory(illustration).map_err(MetadataError::Illustration)?;
        Ok(Self {
            illustration: encode(&image, ILLUSTRATION_SIZE, ImageFormat::Png)?,
            favicon: encode(&image, FAVICON_SIZE, ImageFormat::Ico)?,
            fields,
            created,
        })
    }

    /// Flat key/value view, stable order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let f = &self.fields;
        let mut entries = vec![
            ("Name", f.name.clone()),
            ("Title", f.title.clone()),
            ("Description", f.description.clone()),
        ];
        if let Some(long) = &f.long_description {
            entries.push(("LongDescription", long.clone()));
        }
        entries.extend([
            ("Creator", f.creator.clone()),
            ("Publisher", f.publisher.clone()),
            ("Language", f.language.clone()),
            ("Date", self.created.to_date()),
        ]);
        if !f.tags.is_empty() {
            entries.push(("Tags", f.tags.join(";")));
        }
        entries.push((
            "Scraper",
            concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION")).to_string(),
        ));
        entries
    }
}

fn validate_fields(f: &MetadataFields) -> Result<(), MetadataError> {
    for (field, value) in [
        ("name", &f.name),
        ("title", &f.title),
        ("description", &f.description),
        ("creator", &f.creator),
        ("publisher", &f.publisher),
    ] {
        if value.trim().is_empty() {
            return Err(MetadataError::Empty(field));
        }
    }

    check_len("title", &f.title, MAX_TITLE_CHARS)?;
    check_len("description", &f.description, MAX_DESCRIPTION_CHARS)?;
    if let Some(long) = &f.long_description {
        check_len("long_description", long, MAX_LONG_DESCRIPTION_CHARS)?;
        if long.trim() == f.description.trim() {
            return Err(MetadataError::LongDescriptionDuplicate);
        }
    }

    let lang = &f.language;
    if lang.len() != 3 || !lang.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(MetadataError::Language(lang.clone()));
    }
    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), MetadataError> {
    let len = value.chars().count();
    if len > max {
        return Err(MetadataError::TooLong { field, len, max });
    }
    Ok(())
}

fn encode(image: &DynamicImage, size: u32, format: ImageFormat) -> Result<Vec<u8>, MetadataError> {
    let resized = image.resize_to_fill(size, size, FilterType::Lanczos3);
    let resized = DynamicImage::ImageRgba8(resized.to_rgba8());
    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(MetadataError::Illustration)?;
    Ok(out.into_inner())
}
