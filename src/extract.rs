//! Plain-text extraction for indexed documents.
//!
//! Supported file types: `txt`, `pdf`, `docx`, `html`/`htm`. Callers go
//! through [`read_document_text`], which never fails: an unreadable or
//! malformed file is logged and indexed with an empty body.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts plain text from file bytes, dispatching on the lowercase
/// extension.
pub fn extract_text(bytes: &[u8], file_type: &str) -> Result<String, ExtractError> {
    match file_type {
        "txt" => Ok(decode_text(bytes)),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        "html" | "htm" => Ok(html_to_text(&decode_text(bytes))),
        other => Err(ExtractError::UnsupportedFileType(other.to_string())),
    }
}

/// Text of the document at `path`, or an empty string when it cannot be
/// read or parsed.
pub fn read_document_text(path: &Path, file_type: &str) -> String {
    let result = std::fs::read(path)
        .map_err(ExtractError::from)
        .and_then(|bytes| extract_text(&bytes, file_type));
    match result {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "text extraction failed; indexing empty body");
            String::new()
        }
    }
}

/// UTF-8, falling back to Latin-1 (every byte maps to one code point).
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    paragraphs_text(&doc_xml)
}

/// Concatenates `<w:t>` runs, one line per `<w:p>` paragraph.
fn paragraphs_text(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                if let Ok(Event::Text(te)) = reader.read_event_into(&mut buf) {
                    out.push_str(te.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => out.push('\n'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out.trim_end().to_string())
}

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid regex"));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Visible text of an HTML page: tags become spaces, script and style
/// bodies are dropped, common entities are decoded.
fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = COMMENT.replace_all(&text, " ");
    let text = TAG.replace_all(&text, " ");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let opts = zip::write::SimpleFileOptions::default();
            zip.start_file("word/document.xml", opts).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn unsupported_file_type_returns_error() {
        let err = extract_text(b"foo", "exe").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFileType(_)));
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_text(b"not a pdf", "pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = extract_text(b"not a zip", "docx").unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn docx_paragraphs_are_separated() {
        let bytes = docx_with_paragraphs(&["Réseaux de neurones", "Second &amp; last"]);
        let text = extract_text(&bytes, "docx").unwrap();
        assert_eq!(text, "Réseaux de neurones\nSecond & last");
    }

    #[test]
    fn latin1_text_is_decoded() {
        let bytes = b"caf\xe9 cr\xe8me";
        assert_eq!(extract_text(bytes, "txt").unwrap(), "café crème");
    }

    #[test]
    fn html_drops_markup_scripts_and_styles() {
        let html = r#"<html><head><title>Guide</title><style>body { color: red }</style>
            <script type="text/javascript">var hidden = "secret";</script></head>
            <body><!-- note --><h1>Deep&nbsp;Learning</h1><p>Tom &amp; Jerry</p></body></html>"#;
        let text = extract_text(html.as_bytes(), "htm").unwrap();
        assert_eq!(text, "Guide Deep Learning Tom & Jerry");
    }

    #[test]
    fn unreadable_file_gives_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_document_text(&dir.path().join("missing.txt"), "txt"), "");

        let broken = dir.path().join("broken.pdf");
        std::fs::write(&broken, b"not a pdf").unwrap();
        assert_eq!(read_document_text(&broken, "pdf"), "");
    }
}
