//! Paragraphs and runs
//!
//! A paragraph keeps its verbatim XML plus a decomposition into runs, each
//! with its decoded text and verbatim formatting properties. The flattened
//! text (run texts concatenated in document order) is what placeholder
//! search operates on; byte offsets into it translate back into run-level
//! edits when a paragraph has to be split around a match.

use crate::error::{TreeError, TreeResult};
use crate::xml;
use quick_xml::events::Event;
use quick_xml::Reader;

/// The smallest text-bearing unit inside a paragraph
///
/// Formatting properties are opaque to the engine: copied verbatim, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    xml: String,
    props_xml: Option<String>,
    text: String,
}

impl Run {
    /// Verbatim run XML
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Decoded text content of the run
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Verbatim run-properties XML, if any
    pub fn props_xml(&self) -> Option<&str> {
        self.props_xml.as_deref()
    }
}

/// A block-level paragraph with decomposed runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    xml: String,
    props_xml: Option<String>,
    runs: Vec<Run>,
}

/// Subtrees that carry their own run/text model (DrawingML `a:r`/`a:t`,
/// VML, embedded objects). Their text must not leak into the paragraph's
/// flattened text, and their inner runs are never splittable.
fn is_embedded_container(name: &[u8]) -> bool {
    matches!(
        xml::local_name(name),
        "drawing" | "pict" | "object" | "AlternateContent"
    )
}

impl Paragraph {
    /// Parse a paragraph from its verbatim XML
    pub fn parse(raw: &str) -> TreeResult<Self> {
        let mut reader = Reader::from_str(raw);
        let mut props_xml: Option<String> = None;
        let mut runs = Vec::new();

        loop {
            let pos = reader.buffer_position() as usize;
            match reader.read_event() {
                Err(e) => return Err(TreeError::XmlMalformed(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if xml::name_is(name.as_ref(), "pPr")
                        && props_xml.is_none()
                        && runs.is_empty()
                    {
                        let end = xml::skip_element(&mut reader)?;
                        props_xml = Some(raw[pos..end].to_string());
                    } else if is_embedded_container(name.as_ref()) {
                        xml::skip_element(&mut reader)?;
                    } else if xml::name_is(name.as_ref(), "r") {
                        let end = xml::skip_element(&mut reader)?;
                        runs.push(parse_run(&raw[pos..end])?);
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    let end = reader.buffer_position() as usize;
                    if xml::name_is(name.as_ref(), "pPr")
                        && props_xml.is_none()
                        && runs.is_empty()
                    {
                        props_xml = Some(raw[pos..end].to_string());
                    } else if xml::name_is(name.as_ref(), "r") {
                        runs.push(Run {
                            xml: raw[pos..end].to_string(),
                            props_xml: None,
                            text: String::new(),
                        });
                    }
                }
                Ok(_) => {}
            }
        }

        Ok(Self { xml: raw.to_string(), props_xml, runs })
    }

    /// Verbatim paragraph XML
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Verbatim paragraph-properties XML, if any
    pub fn props_xml(&self) -> Option<&str> {
        self.props_xml.as_deref()
    }

    /// Runs in document order
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Flattened text: run texts concatenated in document order
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Formatting properties of the run whose text spans `offset`
    pub fn run_props_at(&self, offset: usize) -> Option<&str> {
        let mut pos = 0usize;
        for run in &self.runs {
            let end = pos + run.text.len();
            if offset >= pos && offset < end {
                return run.props_xml.as_deref();
            }
            pos = end;
        }
        None
    }

    /// Run fragments covering the flattened text strictly before `boundary`
    ///
    /// Fully-covered runs are copied verbatim (drawings, breaks and other
    /// textless runs included); a run straddling the boundary is rebuilt
    /// with only its leading text, keeping its formatting properties.
    pub fn runs_before(&self, boundary: usize) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut offset = 0usize;
        for run in &self.runs {
            let start = offset;
            let end = offset + run.text.len();
            offset = end;
            if end <= boundary {
                pieces.push(run.xml.clone());
            } else if start < boundary {
                pieces.push(text_run_xml(run.props_xml.as_deref(), &run.text[..boundary - start]));
            }
        }
        pieces
    }

    /// Run fragments covering the flattened text from `boundary` onward
    pub fn runs_after(&self, boundary: usize) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut offset = 0usize;
        for run in &self.runs {
            let start = offset;
            let end = offset + run.text.len();
            offset = end;
            if start >= boundary {
                pieces.push(run.xml.clone());
            } else if end > boundary {
                pieces.push(text_run_xml(run.props_xml.as_deref(), &run.text[boundary - start..]));
            }
        }
        pieces
    }

    /// Rebuild this paragraph with a new run sequence
    ///
    /// The original start tag (with its attributes) and paragraph
    /// properties are kept.
    pub fn with_runs(&self, pieces: &[String]) -> TreeResult<Paragraph> {
        let (open, close) = self.tags();
        let mut xml = String::with_capacity(
            open.len() + close.len() + pieces.iter().map(String::len).sum::<usize>() + 64,
        );
        xml.push_str(open);
        if let Some(props) = &self.props_xml {
            xml.push_str(props);
        }
        for piece in pieces {
            xml.push_str(piece);
        }
        xml.push_str(&close);
        Paragraph::parse(&xml)
    }

    /// Replace every occurrence of `token` in the flattened text with the
    /// literal `value`
    ///
    /// Each replacement run takes the formatting of the run in which the
    /// occurrence starts; runs outside the occurrence survive verbatim.
    /// Returns the rebuilt paragraph and the occurrence count, or `None`
    /// when the token does not occur.
    pub fn replace_text(&self, token: &str, value: &str) -> TreeResult<Option<(Paragraph, usize)>> {
        if token.is_empty() {
            return Ok(None);
        }
        let mut para = self.clone();
        let mut search_from = 0usize;
        let mut count = 0usize;
        loop {
            let text = para.text();
            let Some(found) = text[search_from..].find(token) else {
                break;
            };
            let start = search_from + found;
            let end = start + token.len();

            let mut pieces = para.runs_before(start);
            pieces.push(text_run_xml(para.run_props_at(start), value));
            pieces.extend(para.runs_after(end));
            para = para.with_runs(&pieces)?;

            // Resume past the inserted value so a value containing the
            // token cannot loop forever.
            search_from = start + value.len();
            count += 1;
        }
        if count == 0 {
            Ok(None)
        } else {
            Ok(Some((para, count)))
        }
    }

    /// Original start tag and the matching end tag
    fn tags(&self) -> (&str, String) {
        match self.xml.find('>') {
            Some(i) if !self.xml[..i].ends_with('/') => {
                let name = self.xml[1..i]
                    .split(char::is_whitespace)
                    .next()
                    .unwrap_or("w:p");
                (&self.xml[..=i], format!("</{}>", name))
            }
            _ => ("<w:p>", "</w:p>".to_string()),
        }
    }
}

/// Build a plain text run carrying the given formatting properties
pub fn text_run_xml(props_xml: Option<&str>, text: &str) -> String {
    let mut run = String::from("<w:r>");
    if let Some(props) = props_xml {
        run.push_str(props);
    }
    // xml:space keeps leading and trailing whitespace through consumers.
    run.push_str(r#"<w:t xml:space="preserve">"#);
    run.push_str(&xml::escape_xml(text));
    run.push_str("</w:t></w:r>");
    run
}

fn parse_run(raw: &str) -> TreeResult<Run> {
    let mut reader = Reader::from_str(raw);
    let mut props_xml: Option<String> = None;
    let mut text = String::new();
    let mut text_start: Option<usize> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Err(e) => return Err(TreeError::XmlMalformed(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                if xml::name_is(name.as_ref(), "rPr") && props_xml.is_none() {
                    let end = xml::skip_element(&mut reader)?;
                    props_xml = Some(raw[pos..end].to_string());
                } else if is_embedded_container(name.as_ref()) {
                    xml::skip_element(&mut reader)?;
                } else if xml::name_is(name.as_ref(), "t") {
                    text_start = Some(reader.buffer_position() as usize);
                }
            }
            Ok(Event::End(ref e)) => {
                if xml::name_is(e.name().as_ref(), "t") {
                    if let Some(start) = text_start.take() {
                        text.push_str(&xml::unescape_xml(&raw[start..pos]));
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if xml::name_is(e.name().as_ref(), "rPr") && props_xml.is_none() {
                    props_xml = Some(raw[pos..reader.buffer_position() as usize].to_string());
                }
            }
            Ok(_) => {}
        }
    }

    Ok(Run { xml: raw.to_string(), props_xml, text })
}
