//! Block-level body elements

use crate::error::{TreeError, TreeResult};
use crate::paragraph::Paragraph;
use crate::xml;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One block-level element of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph with decomposed runs
    Paragraph(Paragraph),
    /// A table, kept verbatim
    Table(Table),
    /// The section-properties terminator encoding page layout
    SectionMarker(SectionMarker),
    /// Any other body-level construct (structured document tags, bookmark
    /// markers, inter-element whitespace), kept verbatim
    Opaque(String),
}

/// A table block, opaque to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    xml: String,
}

impl Table {
    /// Verbatim table XML
    pub fn xml(&self) -> &str {
        &self.xml
    }
}

/// A section-properties block, opaque to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarker {
    xml: String,
}

impl SectionMarker {
    /// Verbatim section-properties XML
    pub fn xml(&self) -> &str {
        &self.xml
    }
}

impl Block {
    /// Classify and parse one body-level element from its verbatim XML
    pub fn parse(raw: &str) -> TreeResult<Self> {
        let name = first_element_name(raw)?;
        Self::from_named(&name, raw)
    }

    /// Build a block whose element name is already known
    pub(crate) fn from_named(local_name: &str, raw: &str) -> TreeResult<Self> {
        match local_name {
            "p" => Ok(Block::Paragraph(Paragraph::parse(raw)?)),
            "tbl" => Ok(Block::Table(Table { xml: raw.to_string() })),
            "sectPr" => Ok(Block::SectionMarker(SectionMarker { xml: raw.to_string() })),
            _ => Ok(Block::Opaque(raw.to_string())),
        }
    }

    /// Verbatim XML of the block
    pub fn xml(&self) -> &str {
        match self {
            Block::Paragraph(p) => p.xml(),
            Block::Table(t) => t.xml(),
            Block::SectionMarker(s) => s.xml(),
            Block::Opaque(raw) => raw,
        }
    }

    /// The paragraph inside, if this block is one
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this block is a section-properties terminator
    pub fn is_section_marker(&self) -> bool {
        matches!(self, Block::SectionMarker(_))
    }
}

fn first_element_name(raw: &str) -> TreeResult<String> {
    let mut reader = Reader::from_str(raw);
    loop {
        match reader.read_event() {
            Err(e) => return Err(TreeError::XmlMalformed(e.to_string())),
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return Ok(xml::local_name(e.name().as_ref()).to_string());
            }
            Ok(Event::Eof) => {
                return Err(TreeError::XmlMalformed("empty block fragment".to_string()));
            }
            Ok(_) => {}
        }
    }
}
