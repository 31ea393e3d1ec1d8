//! Per-file text extraction (plain text, PDF, EPUB).
//!
//! Dispatches on file extension and returns plain UTF-8 text. A failure here
//! is never fatal to a run: the aggregator skips the file and keeps going.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Maximum decompressed bytes to read from a single EPUB entry (zip-bomb
/// protection).
const MAX_EPUB_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: String, message: String },
    #[error("EPUB extraction failed for {path}: {message}")]
    Epub { path: String, message: String },
}

/// Extracts the textual content of a file. Markdown and plain text are read
/// as-is; PDF and EPUB go through format-specific extraction.
pub fn read_content(path: &Path) -> Result<String, ReadError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => extract_pdf(path),
        "epub" => extract_epub(path),
        _ => std::fs::read_to_string(path).map_err(|source| ReadError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn extract_pdf(path: &Path) -> Result<String, ReadError> {
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ReadError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// An EPUB is a zip of XHTML content documents. Entries are read in archive
/// name order, which follows the spine numbering in practice; full OPF spine
/// resolution is out of scope.
fn extract_epub(path: &Path) -> Result<String, ReadError> {
    let epub_err = |message: String| ReadError::Epub {
        path: path.display().to_string(),
        message,
    };

    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| epub_err(e.to_string()))?;

    let mut content_names: Vec<String> = archive
        .file_names()
        .filter(|n| {
            let lower = n.to_ascii_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
        .map(|s| s.to_string())
        .collect();
    content_names.sort();

    if content_names.is_empty() {
        return Err(epub_err("no XHTML content documents found".to_string()));
    }

    let mut out = String::new();
    for name in content_names {
        let entry = archive
            .by_name(&name)
            .map_err(|e| epub_err(e.to_string()))?;
        let mut xml = Vec::new();
        entry
            .take(MAX_EPUB_ENTRY_BYTES)
            .read_to_end(&mut xml)
            .map_err(|e| epub_err(e.to_string()))?;
        if xml.len() as u64 >= MAX_EPUB_ENTRY_BYTES {
            return Err(epub_err(format!(
                "entry {} exceeds size limit ({} bytes)",
                name, MAX_EPUB_ENTRY_BYTES
            )));
        }

        let text = extract_xhtml_text(&xml).map_err(|e| epub_err(e))?;
        if !out.is_empty() && !text.is_empty() {
            out.push('\n');
        }
        out.push_str(&text);
    }

    Ok(out)
}

/// Collects all text events from an XHTML document, separating them with
/// newlines so downstream line-based selection still works.
fn extract_xhtml_text(xml: &[u8]) -> Result<String, String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Text(te)) => {
                let text = te.unescape().unwrap_or_default();
                let text = text.trim();
                if !text.is_empty() {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_plain_text() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.md");
        fs::write(&path, "# Heading\n\nsome notes").unwrap();
        let content = read_content(&path).unwrap();
        assert!(content.contains("some notes"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_content(Path::new("/nonexistent/notes.txt")).unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn invalid_pdf_is_pdf_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        fs::write(&path, "not a pdf").unwrap();
        let err = read_content(&path).unwrap_err();
        assert!(matches!(err, ReadError::Pdf { .. }));
    }

    #[test]
    fn invalid_epub_is_epub_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.epub");
        fs::write(&path, "not a zip").unwrap();
        let err = read_content(&path).unwrap_err();
        assert!(matches!(err, ReadError::Epub { .. }));
    }

    #[test]
    fn extracts_text_from_epub_xhtml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("book.epub");

        let file = fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        use std::io::Write;
        writer.start_file("OEBPS/chapter1.xhtml", options).unwrap();
        writer
            .write_all(b"<html><body><p>First chapter text.</p></body></html>")
            .unwrap();
        writer.start_file("OEBPS/chapter2.xhtml", options).unwrap();
        writer
            .write_all(b"<html><body><p>Second chapter text.</p></body></html>")
            .unwrap();
        writer.finish().unwrap();

        let content = read_content(&path).unwrap();
        assert!(content.contains("First chapter text."));
        assert!(content.contains("Second chapter text."));
        let first = content.find("First").unwrap();
        let second = content.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn epub_without_content_documents_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("empty.epub");

        let file = fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        use std::io::Write;
        writer.start_file("mimetype", options).unwrap();
        writer.write_all(b"application/epub+zip").unwrap();
        writer.finish().unwrap();

        let err = read_content(&path).unwrap_err();
        assert!(matches!(err, ReadError::Epub { .. }));
    }
}
