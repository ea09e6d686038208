//! Media-type resolution and display labels for uploaded documents.

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_PPT: &str = "application/vnd.ms-powerpoint";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_ODT: &str = "application/vnd.oasis.opendocument.text";
pub const MIME_ODS: &str = "application/vnd.oasis.opendocument.spreadsheet";
pub const MIME_ODP: &str = "application/vnd.oasis.opendocument.presentation";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_RTF: &str = "application/rtf";

/// Where a resolved media type came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    /// The upload carried a non-empty content type.
    Declared,
    /// Inferred from a recognised file extension.
    Extension,
    /// Nothing usable was available; `text/plain` was assumed.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub mime: String,
    pub source: TypeSource,
}

impl ResolvedType {
    /// Effective media type for an upload.
    ///
    /// A non-empty declared type always wins. Otherwise the extension decides,
    /// and anything unrecognised becomes `text/plain`.
    pub fn resolve(declared: &str, file_name: &str) -> Self {
        let essence = mime_essence(declared);
        if !essence.is_empty() {
            return Self {
                mime: essence,
                source: TypeSource::Declared,
            };
        }

        match mime_for_file_name(file_name) {
            Some(mime) => Self {
                mime: mime.to_string(),
                source: TypeSource::Extension,
            },
            None => Self {
                mime: MIME_TEXT.to_string(),
                source: TypeSource::Default,
            },
        }
    }

    pub fn is(&self, mime: &str) -> bool {
        self.mime == mime
    }

    pub fn display_name(&self) -> &'static str {
        display_name(&self.mime)
    }
}

/// Lowercased type without parameters: `Text/Plain; charset=utf-8` -> `text/plain`.
pub fn mime_essence(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Media type for a recognised extension, `None` otherwise.
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;

    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        "xls" => MIME_XLS,
        "xlsx" => MIME_XLSX,
        "ppt" => MIME_PPT,
        "pptx" => MIME_PPTX,
        "odt" => MIME_ODT,
        "ods" => MIME_ODS,
        "odp" => MIME_ODP,
        "txt" => MIME_TEXT,
        "rtf" => MIME_RTF,
        _ => return None,
    };
    Some(mime)
}

/// Human-readable label shown next to the document in the review UI.
pub fn display_name(mime: &str) -> &'static str {
    match mime {
        MIME_PDF => "PDF",
        MIME_DOC | MIME_DOCX => "Word Document",
        MIME_XLS | MIME_XLSX => "Excel Spreadsheet",
        MIME_PPT | MIME_PPTX => "PowerPoint Presentation",
        MIME_ODT => "OpenDocument Text",
        MIME_ODS => "OpenDocument Spreadsheet",
        MIME_ODP => "OpenDocument Presentation",
        MIME_TEXT => "Text Document",
        MIME_RTF => "RTF Document",
        _ => "Document",
    }
}
