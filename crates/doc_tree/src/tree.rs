//! Document tree parsing and serialization
//!
//! The tree keeps three verbatim pieces of the original part: everything up
//! to and including the opening body tag (prolog), the ordered body blocks,
//! and everything from the closing body tag onward (epilog). Serialization
//! concatenates them, so a parsed-but-unmutated part round-trips
//! byte-for-byte, namespaces included.

use crate::block::Block;
use crate::error::{TreeError, TreeResult};
use crate::paragraph::Paragraph;
use crate::xml;
use quick_xml::events::Event;
use quick_xml::Reader;

/// An ordered sequence of block elements belonging to one document body
#[derive(Debug, Clone)]
pub struct DocumentTree {
    prolog: String,
    epilog: String,
    blocks: Vec<Block>,
}

impl DocumentTree {
    /// Parse a main document part
    ///
    /// Fails on malformed XML or when no body element is present.
    pub fn parse(raw: &str) -> TreeResult<Self> {
        let mut reader = Reader::from_str(raw);
        let mut blocks = Vec::new();
        let mut content_start: Option<usize> = None;
        let mut body_end: Option<usize> = None;

        loop {
            let pos = reader.buffer_position() as usize;
            match reader.read_event() {
                Err(e) => return Err(TreeError::XmlMalformed(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(ref e)) => {
                    if content_start.is_none() {
                        if xml::name_is(e.name().as_ref(), "body") {
                            content_start = Some(reader.buffer_position() as usize);
                        }
                    } else if body_end.is_none() {
                        let name = xml::local_name(e.name().as_ref()).to_string();
                        let end = xml::skip_element(&mut reader)?;
                        blocks.push(Block::from_named(&name, &raw[pos..end])?);
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if content_start.is_none() {
                        if xml::name_is(e.name().as_ref(), "body") {
                            // A self-closed, empty body.
                            content_start = Some(reader.buffer_position() as usize);
                            body_end = content_start;
                        }
                    } else if body_end.is_none() {
                        let name = xml::local_name(e.name().as_ref()).to_string();
                        let end = reader.buffer_position() as usize;
                        blocks.push(Block::from_named(&name, &raw[pos..end])?);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if content_start.is_some()
                        && body_end.is_none()
                        && xml::name_is(e.name().as_ref(), "body")
                    {
                        body_end = Some(pos);
                    }
                }
                Ok(_) => {
                    if content_start.is_some() && body_end.is_none() {
                        // Inter-block whitespace and other non-element
                        // content stays in place verbatim.
                        let end = reader.buffer_position() as usize;
                        blocks.push(Block::Opaque(raw[pos..end].to_string()));
                    }
                }
            }
        }

        let content_start = content_start.ok_or(TreeError::MissingBody)?;
        let body_end = body_end.ok_or(TreeError::MissingBody)?;

        Ok(Self {
            prolog: raw[..content_start].to_string(),
            epilog: raw[body_end..].to_string(),
            blocks,
        })
    }

    /// Serialize the tree back to XML
    ///
    /// Round-trip property: `parse(x)?.to_xml()` is byte-equal to `x` for
    /// any well-formed part that was not further mutated.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(
            self.prolog.len()
                + self.epilog.len()
                + self.blocks.iter().map(|b| b.xml().len()).sum::<usize>(),
        );
        xml.push_str(&self.prolog);
        for block in &self.blocks {
            xml.push_str(block.xml());
        }
        xml.push_str(&self.epilog);
        xml
    }

    /// Ordered body blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Paragraph at a block index, if that block is one
    pub fn paragraph_at(&self, index: usize) -> Option<&Paragraph> {
        self.blocks.get(index).and_then(Block::as_paragraph)
    }

    /// Index of the first paragraph matching a predicate, in document order
    pub fn find_paragraph<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&Paragraph) -> bool,
    {
        self.blocks
            .iter()
            .position(|b| matches!(b, Block::Paragraph(p) if predicate(p)))
    }

    /// Remove the block at `index` and splice `replacement` at its former
    /// position, preserving the order of all other blocks
    pub fn replace_block(&mut self, index: usize, replacement: Vec<Block>) -> TreeResult<()> {
        if index >= self.blocks.len() {
            return Err(TreeError::BlockOutOfBounds(index));
        }
        self.blocks.splice(index..=index, replacement);
        Ok(())
    }

    /// Number of section-properties blocks in the body
    pub fn section_marker_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_section_marker()).count()
    }
}
