//! OOXML package reading and rebuilding
//!
//! A word-processing package is a ZIP archive of named parts. `OpcPackage`
//! buffers every part in memory, preserving archive order, and rebuilds the
//! archive with selective part replacement.

use crate::error::{PackageError, PackageResult};
use crate::paths;
use crate::relationships::{relationship_types, Relationships};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Path of the content-type part
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Path of the package-level relationship part
pub const ROOT_RELS_PATH: &str = "_rels/.rels";

/// One named entry inside a package
#[derive(Debug, Clone)]
pub struct Part {
    /// Part path within the archive (no leading slash)
    pub path: String,
    /// Raw part bytes
    pub data: Vec<u8>,
}

/// An OOXML package buffered in memory
#[derive(Debug, Clone)]
pub struct OpcPackage {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
}

impl OpcPackage {
    /// Open a package from raw bytes
    ///
    /// Fails when the bytes are not a ZIP container or the mandatory main
    /// document part is absent.
    pub fn open(bytes: &[u8]) -> PackageResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut index = HashMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let path = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            if index.contains_key(&path) {
                // Paths are unique within a package; the first entry wins.
                continue;
            }
            index.insert(path.clone(), parts.len());
            parts.push(Part { path, data });
        }

        let package = Self { parts, index };
        package.document_path()?;
        tracing::debug!(parts = package.parts.len(), "opened OOXML package");
        Ok(package)
    }

    /// Look up a part's bytes
    pub fn part(&self, path: &str) -> PackageResult<&[u8]> {
        self.part_opt(path)
            .ok_or_else(|| PackageError::PartNotFound(path.to_string()))
    }

    /// Look up a part's bytes, `None` when absent
    pub fn part_opt(&self, path: &str) -> Option<&[u8]> {
        self.index.get(path).map(|&i| self.parts[i].data.as_slice())
    }

    /// Look up a part as UTF-8 text
    pub fn part_str(&self, path: &str) -> PackageResult<&str> {
        Ok(std::str::from_utf8(self.part(path)?)?)
    }

    /// Whether a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// All part paths in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.path.as_str())
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the package holds no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Path of the main document part
    ///
    /// Resolved through the package-level relationship part; falls back to
    /// the conventional `word/document.xml` when the root relationships are
    /// absent.
    pub fn document_path(&self) -> PackageResult<String> {
        if let Some(data) = self.part_opt(ROOT_RELS_PATH) {
            let xml = std::str::from_utf8(data)?;
            let rels = Relationships::parse(xml)?;
            if let Some(rel) = rels.get_by_type(relationship_types::DOCUMENT) {
                let path = rel.target.trim_start_matches('/').to_string();
                if self.contains(&path) {
                    return Ok(path);
                }
                return Err(PackageError::MissingPart(path));
            }
        }
        if self.contains("word/document.xml") {
            return Ok("word/document.xml".to_string());
        }
        Err(PackageError::MissingPart("word/document.xml".to_string()))
    }

    /// Path of the relationship part owned by the main document part
    pub fn document_rels_path(&self) -> PackageResult<String> {
        Ok(paths::rels_path_for(&self.document_path()?))
    }

    /// Main document XML text
    pub fn document_xml(&self) -> PackageResult<&str> {
        self.part_str(&self.document_path()?)
    }

    /// Relationship table of the main document part; empty when the part
    /// has no .rels part
    pub fn document_rels(&self) -> PackageResult<Relationships> {
        match self.part_opt(&self.document_rels_path()?) {
            Some(data) => Relationships::parse(std::str::from_utf8(data)?),
            None => Ok(Relationships::new()),
        }
    }

    /// Rebuild the package with selective part replacement
    ///
    /// Every original part is written back verbatim unless `replacements`
    /// names it. `additions` are appended only when the path is not already
    /// present; an existing part always wins over an addition.
    pub fn rebuild(
        &self,
        replacements: &HashMap<String, Vec<u8>>,
        additions: &[(String, Vec<u8>)],
    ) -> PackageResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for part in &self.parts {
            let data = replacements
                .get(&part.path)
                .map(Vec::as_slice)
                .unwrap_or(&part.data);
            write_entry(&mut zip, &part.path, data)?;
        }

        let mut appended: HashSet<&str> = HashSet::new();
        for (path, data) in additions {
            if self.contains(path) || !appended.insert(path) {
                continue;
            }
            write_entry(&mut zip, path, data)?;
        }

        let cursor = zip.finish()?;
        let bytes = cursor.into_inner();
        tracing::debug!(bytes = bytes.len(), "rebuilt OOXML package");
        Ok(bytes)
    }
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    data: &[u8],
) -> PackageResult<()> {
    let method = if paths::is_xml_part(path) {
        CompressionMethod::Deflated
    } else {
        // Media is usually already compressed; store it as-is.
        CompressionMethod::Stored
    };
    let options = SimpleFileOptions::default().compression_method(method);
    zip.start_file(path, options)?;
    zip.write_all(data)?;
    Ok(())
}
