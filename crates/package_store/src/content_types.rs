//! [Content_Types].xml parsing and maintenance
//!
//! The content-type part declares a media type for every part in the
//! package, either by extension (`Default`) or by part name (`Override`).
//! Parts copied in from another package may introduce extensions the
//! template never declared; those get a `Default` entry appended.

use crate::error::{PackageError, PackageResult};
use crate::xml::{escape_xml_attr, XmlParser};
use quick_xml::events::Event;
use std::collections::HashMap;

/// Content types declared by a package
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Default content types by extension (e.g., "png" -> "image/png")
    defaults: HashMap<String, String>,
    /// Override content types by part name (e.g., "/word/document.xml" -> "...")
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Parse [Content_Types].xml
    pub fn parse(content: &str) -> PackageResult<Self> {
        let mut result = Self::default();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Default") {
                        if let (Some(ext), Some(ct)) = (
                            XmlParser::get_attribute(e, b"Extension"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            result.defaults.insert(ext.to_ascii_lowercase(), ct);
                        }
                    } else if XmlParser::matches_element(name.as_ref(), "Override") {
                        if let (Some(part), Some(ct)) = (
                            XmlParser::get_attribute(e, b"PartName"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            result.overrides.insert(part, ct);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PackageError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Whether an extension already has a Default entry
    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_ascii_lowercase())
    }

    /// Content type declared for a part path, Override first
    pub fn content_type_for(&self, path: &str) -> Option<&str> {
        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        if let Some(ct) = self.overrides.get(&normalized) {
            return Some(ct);
        }
        crate::paths::extension(path)
            .and_then(|ext| self.defaults.get(&ext))
            .map(String::as_str)
    }
}

/// Splice new Default entries into an existing [Content_Types].xml
///
/// The original text is preserved byte-for-byte apart from the inserted
/// elements, which land immediately before the closing tag.
pub fn append_defaults(
    original_xml: &str,
    new_defaults: &[(String, String)],
) -> PackageResult<String> {
    if new_defaults.is_empty() {
        return Ok(original_xml.to_string());
    }
    let close = original_xml.rfind("</Types>").ok_or_else(|| {
        PackageError::InvalidStructure("content-type part has no closing element".into())
    })?;

    let mut xml = String::with_capacity(original_xml.len() + new_defaults.len() * 64);
    xml.push_str(&original_xml[..close]);
    for (extension, content_type) in new_defaults {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            escape_xml_attr(extension),
            escape_xml_attr(content_type)
        ));
    }
    xml.push_str(&original_xml[close..]);
    Ok(xml)
}

/// Media content type for a file extension
pub fn media_content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "bin" => "application/vnd.openxmlformats-officedocument.oleObject",
        _ => "application/octet-stream",
    }
}
