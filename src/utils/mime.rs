//! MIME type lookup by file extension.
//!
//! The table is closed: generated tiles with an extension that is not listed
//! fail the build instead of being served with a guessed type.

use std::path::Path;

/// MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html";
    pub const PLAIN: &str = "text/plain";
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "text/javascript";
    pub const JSON: &str = "application/json";
    pub const GEOJSON: &str = "application/geo+json";
    pub const XML: &str = "application/xml";

    // Binary
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const PROTOBUF: &str = "application/x-protobuf";
    pub const WASM: &str = "application/wasm";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
}

/// Look up the MIME type of a path. `None` for unknown extensions.
pub fn from_path(path: &Path) -> Option<&'static str> {
    from_extension(path.extension().and_then(|e| e.to_str())?)
}

/// Look up the MIME type of an extension (case-insensitive).
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => types::HTML,
        "css" => types::CSS,
        "js" | "mjs" => types::JAVASCRIPT,
        "json" | "map" => types::JSON,
        "geojson" => types::GEOJSON,
        "xml" => types::XML,
        "txt" => types::PLAIN,

        // Vector tiles and glyph ranges, gzip-compressed or not
        "pbf" | "mvt" => types::PROTOBUF,
        "wasm" => types::WASM,

        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "webp" => types::WEBP,
        "avif" => types::AVIF,
        "svg" => types::SVG,
        "ico" => types::ICO,

        "woff" => types::WOFF,
        "woff2" => types::WOFF2,
        "ttf" => types::TTF,
        "otf" => types::OTF,

        _ => return None,
    };
    Some(mime)
}

/// Lenient lookup for trusted static bundles.
pub fn from_path_or_octet(path: &Path) -> &'static str {
    from_path(path).unwrap_or(types::OCTET_STREAM)
}

/// Payloads that are already compressed and gain nothing from deflate.
pub fn is_precompressed(mime: &str) -> bool {
    matches!(
        mime,
        types::PNG | types::JPEG | types::GIF | types::WEBP | types::AVIF | types::WOFF2
    )
}
