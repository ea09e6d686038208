//! Generic multi-format backend.
//!
//! The container is detected from the bytes, not from the declared type:
//!
//! - `%PDF` goes through `pdf-extract`
//! - ZIP packages are told apart by their entries (DOCX, PPTX, XLSX, ODT,
//!   ODS, ODP)
//! - OLE compound files are handed to `calamine` (legacy Excel only)
//! - `{\rtf` is stripped of its control words

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use quick_xml::events::Event;
use zip::ZipArchive;

use super::{rtf, BackendError, BackendOutput, BackendResult, DocumentBackend};

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const ODF_TEXT: &str = "application/vnd.oasis.opendocument.text";
const ODF_SPREADSHEET: &str = "application/vnd.oasis.opendocument.spreadsheet";
const ODF_PRESENTATION: &str = "application/vnd.oasis.opendocument.presentation";

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Package {
    Docx,
    Pptx,
    Xlsx,
    Odt,
    Ods,
    Odp,
}

pub struct OfficeBackend {
    max_entry_bytes: u64,
}

impl OfficeBackend {
    pub fn new(max_entry_bytes: u64) -> Self {
        Self { max_entry_bytes }
    }

    fn extract_pdf(&self, bytes: &[u8]) -> BackendResult<String> {
        // pdf-extract panics on some malformed streams.
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| BackendError::parse("pdf", "parser panicked"))?
            .map_err(|e| BackendError::parse("pdf", e))
    }

    fn extract_package(&self, bytes: &[u8]) -> BackendResult<String> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| BackendError::parse("zip", e))?;

        let package = self.detect_package(&mut archive)?;
        tracing::debug!(package = ?package, entries = archive.len(), "Detected office package");

        match package {
            Package::Docx => {
                let xml = self.read_entry(&mut archive, "word/document.xml")?;
                ooxml_text(&xml, "docx")
            }
            Package::Pptx => self.extract_slides(&mut archive),
            Package::Odt | Package::Odp => {
                let xml = self.read_entry(&mut archive, "content.xml")?;
                odf_text(&xml)
            }
            Package::Xlsx | Package::Ods => {
                // calamine inflates entries itself, so bound them up front.
                self.check_entry_sizes(&mut archive)?;
                extract_workbook(bytes)
            }
        }
    }

    /// Inflates every entry through the bounded reader without keeping it.
    fn check_entry_sizes(&self, archive: &mut Archive<'_>) -> BackendResult<()> {
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| BackendError::parse("zip", e))?;
            let name = entry.name().to_string();

            let inflated = std::io::copy(&mut entry.take(self.max_entry_bytes + 1), &mut std::io::sink())
                .map_err(|e| BackendError::parse("zip", format!("{name}: {e}")))?;

            if inflated > self.max_entry_bytes {
                return Err(BackendError::EntryTooLarge {
                    name,
                    limit: self.max_entry_bytes,
                });
            }
        }
        Ok(())
    }

    fn detect_package(&self, archive: &mut Archive<'_>) -> BackendResult<Package> {
        let mut has_mimetype = false;
        for name in archive.file_names() {
            match name {
                "word/document.xml" => return Ok(Package::Docx),
                "xl/workbook.xml" => return Ok(Package::Xlsx),
                "mimetype" => has_mimetype = true,
                _ if name.starts_with("ppt/slides/slide") => return Ok(Package::Pptx),
                _ => {}
            }
        }

        if has_mimetype {
            let mimetype = self.read_entry(archive, "mimetype")?;
            return match String::from_utf8_lossy(&mimetype).trim() {
                ODF_TEXT => Ok(Package::Odt),
                ODF_SPREADSHEET => Ok(Package::Ods),
                ODF_PRESENTATION => Ok(Package::Odp),
                other => Err(BackendError::unsupported(
                    "opendocument",
                    format!("unknown package mimetype {other}"),
                )),
            };
        }

        Err(BackendError::UnrecognizedFormat)
    }

    fn extract_slides(&self, archive: &mut Archive<'_>) -> BackendResult<String> {
        let mut slides: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .map(str::to_string)
            .collect();
        slides.sort_by_key(|name| slide_number(name));

        let mut texts = Vec::with_capacity(slides.len());
        for name in slides {
            let xml = self.read_entry(archive, &name)?;
            let text = ooxml_text(&xml, "pptx")?;
            if !text.trim().is_empty() {
                texts.push(text);
            }
        }
        Ok(texts.join("\n"))
    }

    fn read_entry(&self, archive: &mut Archive<'_>, name: &str) -> BackendResult<Vec<u8>> {
        let entry = archive
            .by_name(name)
            .map_err(|e| BackendError::parse("zip", format!("{name}: {e}")))?;

        // Read one byte past the limit to tell "exactly at" from "over".
        let mut out = Vec::new();
        entry
            .take(self.max_entry_bytes + 1)
            .read_to_end(&mut out)
            .map_err(|e| BackendError::parse("zip", format!("{name}: {e}")))?;

        if out.len() as u64 > self.max_entry_bytes {
            return Err(BackendError::EntryTooLarge {
                name: name.to_string(),
                limit: self.max_entry_bytes,
            });
        }
        Ok(out)
    }
}

impl DocumentBackend for OfficeBackend {
    fn name(&self) -> &'static str {
        "office"
    }

    fn parse(&self, bytes: &[u8]) -> BackendResult<BackendOutput> {
        let text = if bytes.starts_with(PDF_MAGIC) {
            self.extract_pdf(bytes)?
        } else if bytes.starts_with(ZIP_MAGIC) {
            self.extract_package(bytes)?
        } else if bytes.starts_with(OLE_MAGIC) {
            extract_workbook(bytes).map_err(|e| {
                tracing::debug!(error = %e, "OLE container is not a workbook");
                BackendError::unsupported("ole", "legacy Word and PowerPoint files are not supported")
            })?
        } else if rtf::is_rtf(bytes) {
            rtf::rtf_to_text(bytes)?
        } else {
            return Err(BackendError::UnrecognizedFormat);
        };

        Ok(BackendOutput::Text(text))
    }
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

/// Text runs of a WordprocessingML or DrawingML part, one line per paragraph.
fn ooxml_text(xml: &[u8], format: &'static str) -> BackendResult<String> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;
    // Inside `<w:tabs>`, `<w:tab/>` declares a tab stop rather than a tab.
    let mut in_tab_stops = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tabs" => in_tab_stops = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| BackendError::parse(format, e))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::parse(format, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Paragraph and heading text of an OpenDocument `content.xml`.
fn odf_text(xml: &[u8]) -> BackendResult<String> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if matches!(e.local_name().as_ref(), b"p" | b"h") {
                    depth += 1;
                }
            }
            Ok(Event::Text(t)) if depth > 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| BackendError::parse("opendocument", e))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => {
                if matches!(e.local_name().as_ref(), b"p" | b"h") {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        out.push('\n');
                    }
                }
            }
            Ok(Event::Empty(e)) if depth > 0 => match e.local_name().as_ref() {
                b"s" => out.push(' '),
                b"tab" => out.push('\t'),
                b"line-break" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::parse("opendocument", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Every sheet as tab-separated rows, sheets separated by a blank line.
fn extract_workbook(bytes: &[u8]) -> BackendResult<String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| BackendError::parse("spreadsheet", e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| BackendError::parse("spreadsheet", format!("{name}: {e}")))?;

        let rows: Vec<String> = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(cell_to_string)
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .filter(|row| !row.is_empty())
            .collect();

        if !rows.is_empty() {
            sheets.push(rows.join("\n"));
        }
    }

    Ok(sheets.join("\n\n"))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        _ => cell.to_string(),
    }
}
