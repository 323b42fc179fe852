//! Integration tests for the composition engine
//!
//! These tests build complete packages in memory, run full composition
//! requests against them, and inspect the rebuilt output.

#[cfg(test)]
mod integration_tests {
    use crate::{compose, substitute_text, ComposeError, Degradation, FailureKind};
    use doc_tree::{Block, DocumentTree};
    use package_store::{OpcPackage, Relationships, CONTENT_TYPES_PATH};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn doc_rels_xml(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            entries
        )
    }

    fn build_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, data) in parts {
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            zip.start_file(*path, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// A minimal package: root rels, content types, one document part.
    fn docx(body: &str) -> Vec<u8> {
        let document = document_xml(body);
        build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
        ])
    }

    fn docx_with(body: &str, doc_rels: &str, extra: &[(&str, &[u8])]) -> Vec<u8> {
        let document = document_xml(body);
        let rels = doc_rels_xml(doc_rels);
        let mut parts: Vec<(&str, &[u8])> = vec![
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/_rels/document.xml.rels", rels.as_bytes()),
        ];
        parts.extend_from_slice(extra);
        build_package(&parts)
    }

    fn body_texts(bytes: &[u8]) -> Vec<String> {
        let package = OpcPackage::open(bytes).unwrap();
        let tree = DocumentTree::parse(package.document_xml().unwrap()).unwrap();
        tree.blocks()
            .iter()
            .filter_map(Block::as_paragraph)
            .map(|p| p.text())
            .collect()
    }

    const IMAGE_PARAGRAPH: &str = r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><pic:pic><pic:blipFill><a:blip r:embed="rId3"/></pic:blipFill></pic:pic></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;

    const IMAGE_REL: &str = r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>"#;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    #[test]
    fn test_scenario_split_paragraph_around_token() {
        let template = docx(r#"<w:p><w:r><w:t>Hello {{X}} world</w:t></w:r></w:p>"#);
        let source = docx(r#"<w:p><w:r><w:t>INSERTED</w:t></w:r></w:p>"#);

        let merged = compose(&template, &source, "{{X}}").unwrap();

        assert_eq!(body_texts(&merged.bytes), vec!["Hello ", "INSERTED", " world"]);
        assert!(merged.report.is_clean());

        let package = OpcPackage::open(&merged.bytes).unwrap();
        assert!(!package.document_xml().unwrap().contains("{{X}}"));
    }

    #[test]
    fn test_token_split_across_runs_is_replaced() {
        let template = docx(
            r#"<w:p><w:r><w:t>intro {{Con</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>te</w:t></w:r><w:r><w:t>nt}} outro</w:t></w:r></w:p>"#,
        );
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);

        let merged = compose(&template, &source, "{{Content}}").unwrap();
        assert_eq!(body_texts(&merged.bytes), vec!["intro ", "body", " outro"]);
    }

    #[test]
    fn test_token_spanning_paragraphs_is_not_found() {
        let template = docx(
            r#"<w:p><w:r><w:t>{{Con</w:t></w:r></w:p><w:p><w:r><w:t>tent}}</w:t></w:r></w:p>"#,
        );
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);

        let err = compose(&template, &source, "{{Content}}").unwrap_err();
        assert_eq!(err.kind(), FailureKind::PlaceholderNotFound);
    }

    #[test]
    fn test_scenario_media_carried_into_template_without_rels() {
        let template = docx(r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#);
        let source = docx_with(
            IMAGE_PARAGRAPH,
            IMAGE_REL,
            &[("word/media/image1.png", PNG_BYTES)],
        );

        let merged = compose(&template, &source, "{{X}}").unwrap();
        let package = OpcPackage::open(&merged.bytes).unwrap();

        // The image bytes rode along unchanged.
        assert_eq!(package.part("word/media/image1.png").unwrap(), PNG_BYTES);
        assert_eq!(merged.report.copied_parts, vec!["word/media/image1.png"]);

        // The template had no document rels; the fresh table starts at rId1
        // and the spliced reference was rewritten to it.
        let rels = Relationships::parse(package.part_str("word/_rels/document.xml.rels").unwrap()).unwrap();
        assert!(rels.contains("rId1"));
        assert!(package.document_xml().unwrap().contains(r#"r:embed="rId1""#));
        assert!(!package.document_xml().unwrap().contains(r#"r:embed="rId3""#));

        // The png extension got a content-type default.
        let ct = package.part_str(CONTENT_TYPES_PATH).unwrap();
        assert!(ct.contains(r#"Extension="png""#));
    }

    #[test]
    fn test_scenario_colliding_ids_are_remapped() {
        let template = docx_with(
            r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            &[("word/styles.xml", b"<w:styles/>".as_slice())],
        );
        let source = docx_with(
            r#"<w:p><w:r><w:drawing><a:blip r:embed="rId1"/></w:drawing></w:r></w:p>"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>"#,
            &[("word/media/image1.png", PNG_BYTES)],
        );

        let merged = compose(&template, &source, "{{X}}").unwrap();
        let package = OpcPackage::open(&merged.bytes).unwrap();

        let rels = Relationships::parse(package.part_str("word/_rels/document.xml.rels").unwrap()).unwrap();
        // No duplicate IDs: the source's rId1 landed on a fresh ID and the
        // template's rId1 still points at its styles part.
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target, "styles.xml");
        let remap = &merged.report.remapped[0];
        assert_eq!(remap.source_id, "rId1");
        assert_ne!(remap.merged_id, "rId1");
        assert_eq!(rels.get(&remap.merged_id).unwrap().target, "media/image1.png");
        assert!(package
            .document_xml()
            .unwrap()
            .contains(&format!(r#"r:embed="{}""#, remap.merged_id)));
    }

    #[test]
    fn test_scenario_missing_token_fails_without_output() {
        let template = docx(r#"<w:p><w:r><w:t>no token here</w:t></w:r></w:p>"#);
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);

        let err = compose(&template, &source, "{{X}}").unwrap_err();
        assert!(matches!(err, ComposeError::PlaceholderNotFound(_)));
    }

    #[test]
    fn test_scenario_missing_media_degrades_but_succeeds() {
        let template = docx(r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#);
        // The relationship is declared but the part itself is absent.
        let source = docx_with(IMAGE_PARAGRAPH, IMAGE_REL, &[]);

        let merged = compose(&template, &source, "{{X}}").unwrap();

        assert_eq!(
            merged.report.degradations,
            vec![Degradation::MissingSourcePart {
                relationship_id: "rId3".to_string(),
                target: "media/image1.png".to_string(),
            }]
        );
        let package = OpcPackage::open(&merged.bytes).unwrap();
        assert!(!package.contains("word/media/image1.png"));
        // The reference survives, remapped, pointing at the absent part.
        assert!(package.document_xml().unwrap().contains(r#"r:embed="rId1""#));
    }

    #[test]
    fn test_reconciliation_without_references_is_identity() {
        let doc_rels = r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#;
        let template = docx_with(
            r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#,
            doc_rels,
            &[("word/styles.xml", b"<w:styles/>".as_slice())],
        );
        let source = docx(r#"<w:p><w:r><w:t>plain text only</w:t></w:r></w:p>"#);

        let merged = compose(&template, &source, "{{X}}").unwrap();
        let package = OpcPackage::open(&merged.bytes).unwrap();

        // Relationship table and content types pass through byte-for-byte.
        assert_eq!(
            package.part_str("word/_rels/document.xml.rels").unwrap(),
            doc_rels_xml(doc_rels)
        );
        assert_eq!(package.part_str(CONTENT_TYPES_PATH).unwrap(), CONTENT_TYPES);
        assert!(merged.report.remapped.is_empty());
        assert!(merged.report.copied_parts.is_empty());
    }

    #[test]
    fn test_merged_body_keeps_single_section_marker() {
        let template = docx(
            r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#,
        );
        let source = docx(
            r#"<w:p><w:r><w:t>body</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
        );

        let merged = compose(&template, &source, "{{X}}").unwrap();
        let package = OpcPackage::open(&merged.bytes).unwrap();
        let tree = DocumentTree::parse(package.document_xml().unwrap()).unwrap();

        assert_eq!(tree.section_marker_count(), 1);
        assert!(package.document_xml().unwrap().contains(r#"w:w="11906""#));
    }

    #[test]
    fn test_untouched_parts_survive_byte_for_byte() {
        let styles = br#"<w:styles xmlns:w="urn:w"><w:style w:styleId="Heading1"/></w:styles>"#;
        let template = docx_with(
            r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            &[("word/styles.xml", styles.as_slice())],
        );
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);

        let merged = compose(&template, &source, "{{X}}").unwrap();
        let package = OpcPackage::open(&merged.bytes).unwrap();
        assert_eq!(package.part("word/styles.xml").unwrap(), styles.as_slice());
    }

    #[test]
    fn test_invalid_template_is_a_format_error() {
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);
        let err = compose(b"definitely not a zip", &source, "{{X}}").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Format);
    }

    #[test]
    fn test_source_without_body_is_a_structural_defect() {
        let template = docx(r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#);
        let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:headless/></w:document>"#;
        let source = build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("word/document.xml", document.as_bytes()),
        ]);

        let err = compose(&template, &source, "{{X}}").unwrap_err();
        assert_eq!(err.kind(), FailureKind::StructuralDefect);
    }

    #[test]
    fn test_substitute_text_end_to_end() {
        let template = docx(
            r#"<w:p><w:r><w:t>Dear {{Name}},</w:t></w:r></w:p><w:p><w:r><w:t>Bye {{Name}} ({{Ref}})</w:t></w:r></w:p>"#,
        );
        let substitutions = vec![
            ("{{Name}}".to_string(), "Ada".to_string()),
            ("{{Ref}}".to_string(), "42/2026".to_string()),
            ("{{Missing}}".to_string(), "never".to_string()),
        ];

        let merged = substitute_text(&template, &substitutions).unwrap();

        assert_eq!(body_texts(&merged.bytes), vec!["Dear Ada,", "Bye Ada (42/2026)"]);
        assert_eq!(
            merged.report.substitutions,
            vec![("{{Name}}".to_string(), 2), ("{{Ref}}".to_string(), 1)]
        );
        assert_eq!(
            merged.report.degradations,
            vec![Degradation::TokenNotFound { token: "{{Missing}}".to_string() }]
        );
    }

    #[test]
    fn test_output_reopens_from_disk() {
        let template = docx(r#"<w:p><w:r><w:t>{{X}}</w:t></w:r></w:p>"#);
        let source = docx(r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#);
        let merged = compose(&template, &source, "{{X}}").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.docx");
        std::fs::write(&path, &merged.bytes).unwrap();

        let reread = std::fs::read(&path).unwrap();
        assert_eq!(body_texts(&reread), vec!["body"]);
    }
}
