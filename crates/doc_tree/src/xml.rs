//! Low-level XML scanning utilities
//!
//! The tree model works on verbatim byte spans of the original document, so
//! these helpers deal in reader positions rather than reconstructed events.

use crate::error::{TreeError, TreeResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Local part of a possibly-prefixed element name
pub(crate) fn local_name(name: &[u8]) -> &str {
    let s = std::str::from_utf8(name).unwrap_or("");
    match s.rfind(':') {
        Some(i) => &s[i + 1..],
        None => s,
    }
}

/// Check if an element name matches with an optional namespace prefix
pub(crate) fn name_is(name: &[u8], expected: &str) -> bool {
    local_name(name) == expected
}

/// Consume events until the element whose start tag was just read is closed;
/// returns the reader position just past its end tag
pub(crate) fn skip_element(reader: &mut Reader<&[u8]>) -> TreeResult<usize> {
    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Err(e) => return Err(TreeError::XmlMalformed(e.to_string())),
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(reader.buffer_position() as usize);
                }
            }
            Ok(Event::Eof) => {
                return Err(TreeError::XmlMalformed(
                    "unexpected end of fragment".to_string(),
                ))
            }
            Ok(_) => {}
        }
    }
}

/// Escape XML text content
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Resolve predefined and numeric character references in XML text
pub(crate) fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let resolved = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            ch.map(|c| (c, semi))
        });
        match resolved {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
