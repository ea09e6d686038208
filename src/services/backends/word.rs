use std::io::Cursor;

use docx_rust::document::{
    BodyContent, Paragraph, ParagraphContent, Run, RunContent, Table, TableCellContent,
    TableRowContent,
};
use docx_rust::DocxFile;

use super::{BackendError, BackendResult, WordBackend};

/// Dedicated Word fallback: raw paragraph text through `docx-rust`.
pub struct DocxRawTextBackend;

impl DocxRawTextBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxRawTextBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WordBackend for DocxRawTextBackend {
    fn name(&self) -> &'static str {
        "docx-rust"
    }

    fn extract_raw_text(&self, bytes: &[u8]) -> BackendResult<String> {
        let file = DocxFile::from_reader(Cursor::new(bytes))
            .map_err(|e| BackendError::parse("word", format!("{}", e)))?;
        let docx = file
            .parse()
            .map_err(|e| BackendError::parse("word", format!("{}", e)))?;

        let mut out = String::new();
        for content in &docx.document.body.content {
            push_body_content(&mut out, content);
        }
        Ok(out)
    }
}

fn push_body_content(out: &mut String, content: &BodyContent) {
    match content {
        BodyContent::Paragraph(para) => {
            push_paragraph(out, para);
            out.push('\n');
        }
        BodyContent::Table(table) => push_table(out, table),
        BodyContent::Sdt(sdt) => {
            if let Some(ref sdt_content) = sdt.content {
                for item in &sdt_content.content {
                    push_body_content(out, item);
                }
            }
        }
        _ => {}
    }
}

fn push_paragraph(out: &mut String, para: &Paragraph) {
    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => push_run(out, run),
            ParagraphContent::Link(link) => {
                if let Some(ref run) = link.content {
                    push_run(out, run);
                }
            }
            _ => {}
        }
    }
}

fn push_run(out: &mut String, run: &Run) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => out.push_str(&t.text),
            RunContent::Break(_) => out.push('\n'),
            RunContent::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}

/// One line per row, cells separated by tabs.
fn push_table(out: &mut String, table: &Table) {
    for row in &table.rows {
        let mut cells = Vec::new();
        for cell_content in &row.cells {
            if let TableRowContent::TableCell(cell) = cell_content {
                let mut cell_text = String::new();
                for tc in &cell.content {
                    let TableCellContent::Paragraph(para) = tc;
                    if !cell_text.is_empty() {
                        cell_text.push(' ');
                    }
                    push_paragraph(&mut cell_text, para);
                }
                cells.push(cell_text.trim().to_string());
            }
        }
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
}
