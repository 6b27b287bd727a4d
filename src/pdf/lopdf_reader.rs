//! `MetadataReader` backed by lopdf.
//!
//! Only the trailer `/Info` dictionary is consulted (the XMP stream is not).
//! Text strings are decoded per PDF rules: UTF-16BE with a BOM, UTF-8 with a
//! BOM, otherwise PDFDocEncoding, approximated here as Latin-1.

use lopdf::{Dictionary, Document, Object};
use std::path::Path;
use tracing::trace;

use super::{DocumentInfo, MetadataError, MetadataReader};

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfReader;

impl LopdfReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataReader for LopdfReader {
    fn read_info(&self, path: &Path) -> Result<Option<DocumentInfo>, MetadataError> {
        // The document is owned by this frame; the file is closed when it drops.
        let doc = Document::load(path).map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(dict) = info_dictionary(&doc) else {
            trace!(path = %path.display(), "no /Info dictionary");
            return Ok(None);
        };

        let mut info = DocumentInfo::new();
        for (key, value) in dict.iter() {
            let value = match value {
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(obj) => obj,
                    Err(_) => continue,
                },
                other => other,
            };
            if let Ok(bytes) = value.as_str() {
                info.insert(String::from_utf8_lossy(key), decode_text_string(bytes));
            }
        }
        if info.is_empty() {
            return Ok(None);
        }
        Ok(Some(info))
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decode a PDF text string.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
