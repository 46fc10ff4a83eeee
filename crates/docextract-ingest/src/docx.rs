//! DOCX text extraction
//!
//! Body paragraphs and tables are emitted in document order, tables flattened
//! to one ` | `-joined line per row. Parsing is done by `docx-rs`; this module
//! only walks the typed body tree.

use crate::IngestError;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

/// Extract the body text of a DOCX file
pub fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| IngestError::Docx(format!("Failed to parse DOCX: {}", e)))?;

    let mut parts = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            DocumentChild::Table(table) => parts.extend(table_rows(table)),
            _ => {}
        }
    }

    Ok(parts.join("\n"))
}

/// Concatenate the runs of one paragraph
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}

/// One line per row; nested tables are not part of the outer cell text
fn table_rows(table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|row| {
            let TableChild::TableRow(row) = row;
            row.cells
                .iter()
                .map(|cell| {
                    let TableRowChild::TableCell(cell) = cell;
                    let paragraphs: Vec<String> = cell
                        .children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
                            _ => None,
                        })
                        .collect();
                    paragraphs.join("\n").trim().to_string()
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:v="urn:schemas-microsoft-com:vml"><w:body>{}</w:body></w:document>"#,
            body
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/document.xml", document.as_str()),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
    }

    fn cell(text: &str) -> String {
        format!("<w:tc><w:tcPr><w:tcW w:w=\"2000\" w:type=\"dxa\"/></w:tcPr>{}</w:tc>", para(text))
    }

    #[test]
    fn test_paragraphs_skip_empty() {
        let body = format!("{}<w:p/>{}{}", para("First"), para("   "), para("Second"));
        let text = extract_docx(&docx_with_body(&body)).unwrap();
        assert_eq!(text, "First\nSecond");
    }

    #[test]
    fn test_tables_flatten_in_document_order() {
        let table = format!(
            "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
            cell("Party"),
            cell("Role"),
            cell(" Acme "),
            cell("Payer")
        );
        let body = format!("{}{}{}", para("Before"), table, para("After"));

        let text = extract_docx(&docx_with_body(&body)).unwrap();
        assert_eq!(text, "Before\nParty | Role\nAcme | Payer\nAfter");
    }

    #[test]
    fn test_runs_tabs_and_entities() {
        let body = "<w:p><w:r><w:t>Smith &amp; Sons</w:t></w:r><w:r><w:tab/><w:t>&lt;Ltd&gt; &#261;</w:t></w:r></w:p>";
        let text = extract_docx(&docx_with_body(body)).unwrap();
        assert_eq!(text, "Smith & Sons\t<Ltd> ą");
    }

    #[test]
    fn test_tab_stop_definitions_are_not_text() {
        let body = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9360"/></w:tabs></w:pPr><w:r><w:t>Rent</w:t></w:r></w:p>"#;
        let text = extract_docx(&docx_with_body(body)).unwrap();
        assert_eq!(text, "Rent");
    }

    #[test]
    fn test_text_box_keeps_surrounding_runs() {
        let body = r#"<w:p><w:r><w:t xml:space="preserve">Before </w:t></w:r><w:r><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>Box</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></w:r><w:r><w:t>After</w:t></w:r></w:p>"#;
        let text = extract_docx(&docx_with_body(body)).unwrap();
        assert!(text.contains("Before"), "lost leading run: {:?}", text);
        assert!(text.contains("After"), "lost trailing run: {:?}", text);
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx(b"plain text, not a docx").unwrap_err();
        assert!(matches!(err, IngestError::Docx(_)));
    }
}
