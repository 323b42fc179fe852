//! Part path conventions
//!
//! Path arithmetic implied by the package format: the relationship part
//! that belongs to a part, and relationship targets resolved relative to
//! the owning part's directory.

/// Relationship part path for a given part
///
/// `word/document.xml` owns `word/_rels/document.xml.rels`; a root-level
/// part owns `_rels/<name>.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target against the owning part's directory
///
/// Targets starting with `/` are package-absolute. `..` segments step out
/// of the base directory.
pub fn resolve_target(owner_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match owner_path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Whether a part path holds XML (deflated on rebuild) rather than binary
/// media (stored uncompressed)
pub fn is_xml_part(path: &str) -> bool {
    path.ends_with(".xml") || path.ends_with(".rels")
}

/// File extension of a part path, lower-cased
pub fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}
