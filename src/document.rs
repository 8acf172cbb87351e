use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

static TEXT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["txt", "text", "md", "markdown"].into_iter().collect()
});

/// Document formats the text extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF document
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// Legacy OLE compound document (unsupported, detected for diagnostics)
    Doc,
    /// Plain text or Markdown
    Text,
}

impl DocumentKind {
    /// Detects the document kind from the file extension.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            ext if TEXT_EXTENSIONS.contains(ext) => Some(Self::Text),
            _ => None,
        }
    }

    /// Detects the document kind from magic bytes.
    ///
    /// A ZIP container only counts as DOCX when it carries
    /// `word/document.xml`; other archives are not extractable here.
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        // DOCX is a ZIP file starting with PK\x03\x04
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            if let Ok(mut archive) = zip::ZipArchive::new(Cursor::new(bytes)) {
                if archive.by_name("word/document.xml").is_ok() {
                    return Some(Self::Docx);
                }
            }
            return None;
        }
        // Old DOC format (OLE Compound Document)
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Some(Self::Doc);
        }
        None
    }
}

/// Extracts best-effort plain text from a CV document.
///
/// Format is chosen by extension first, then by magic bytes, so misnamed
/// files still extract. The returned text is trimmed.
///
/// # Errors
///
/// Returns an extraction error if the file is unreadable, the format is
/// unsupported, or the extracted text is empty or whitespace-only.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

    let kind = DocumentKind::from_extension(path).or_else(|| DocumentKind::from_magic(&bytes));

    let text = match kind {
        Some(DocumentKind::Pdf) => pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| Error::extraction(path, e.to_string()))?,
        Some(DocumentKind::Docx) => docx_text(path, &bytes)?,
        Some(DocumentKind::Doc) => {
            return Err(Error::extraction(
                path,
                "legacy .doc (OLE) documents are not supported; convert to .docx or PDF",
            ));
        }
        Some(DocumentKind::Text) => String::from_utf8_lossy(&bytes).into_owned(),
        None => {
            if looks_binary(&bytes) {
                return Err(Error::extraction(
                    path,
                    "unrecognized binary format",
                ));
            }
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::extraction(path, "no text content extracted"));
    }

    Ok(text.to_string())
}

/// Extracts the text runs of `word/document.xml` from a DOCX container.
fn docx_text(path: &Path, bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::extraction(path, format!("not a valid DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::extraction(path, format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::extraction(path, e.to_string()))?;

    Ok(strip_document_xml(&xml))
}

/// Strips WordprocessingML markup, keeping character data with paragraph
/// breaks and tab stops.
fn strip_document_xml(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    let mut tag = String::new();
    let mut in_tag = false;

    for c in xml.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
                let name = tag.trim_end_matches('/').trim();
                if name == "/w:p" || name.starts_with("w:br") || name.starts_with("w:cr") {
                    out.push('\n');
                } else if name.starts_with("w:tab") {
                    out.push('\t');
                }
                tag.clear();
            } else {
                tag.push(c);
            }
        } else if c == '<' {
            in_tag = true;
        } else {
            out.push(c);
        }
    }

    decode_xml_entities(&out)
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Determines if content is likely binary.
///
/// Checks the first 8KB for null bytes, then the ratio of ASCII bytes.
fn looks_binary(bytes: &[u8]) -> bool {
    const SAMPLE_SIZE: usize = 8192;
    const ASCII_THRESHOLD: f64 = 0.85;

    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }

    if memchr::memchr(0, sample).is_some() {
        return true;
    }

    let ascii_count = sample.iter().filter(|&&b| b < 128).count();
    let ascii_ratio = ascii_count as f64 / sample.len() as f64;

    ascii_ratio < ASCII_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::io::Write;

    fn synth_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document><w:body>{body}</w:body></w:document>"
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(
            DocumentKind::from_extension(Path::new("cv.pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_extension(Path::new("cv.DOCX")),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_extension(Path::new("cv.doc")),
            Some(DocumentKind::Doc)
        );
        assert_eq!(
            DocumentKind::from_extension(Path::new("cv.txt")),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_extension(Path::new("cv.xyz")), None);
        assert_eq!(DocumentKind::from_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn test_from_magic_pdf() {
        assert_eq!(
            DocumentKind::from_magic(b"%PDF-1.7 rest of file"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_from_magic_docx() {
        let bytes = synth_docx(&["Hello"]);
        assert_eq!(DocumentKind::from_magic(&bytes), Some(DocumentKind::Docx));
    }

    #[test]
    fn test_from_magic_ole() {
        let bytes = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert_eq!(DocumentKind::from_magic(&bytes), Some(DocumentKind::Doc));
    }

    #[test]
    fn test_from_magic_plain_zip_is_not_docx() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"not a docx").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert_eq!(DocumentKind::from_magic(&bytes), None);
    }

    #[test]
    fn test_extract_plain_text() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.txt");
        file.write_str("  Alice Example\nSoftware Engineer  ").unwrap();

        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "Alice Example\nSoftware Engineer");
    }

    #[test]
    fn test_extract_whitespace_only_fails() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.txt");
        file.write_str("   \n\t  \n").unwrap();

        let err = extract_text(file.path()).unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn test_extract_docx_paragraphs() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.docx");
        file.write_binary(&synth_docx(&["Alice Example", "Skills: Rust &amp; SQL"]))
            .unwrap();

        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "Alice Example\nSkills: Rust & SQL");
    }

    #[test]
    fn test_extract_misnamed_docx_by_magic() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.bin");
        file.write_binary(&synth_docx(&["Hello"])).unwrap();

        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_extract_unknown_binary_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.xyz");
        file.write_binary(&[0u8; 256]).unwrap();

        let err = extract_text(file.path()).unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn test_extract_legacy_doc_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("cv.doc");
        file.write_binary(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
            .unwrap();

        let err = extract_text(file.path()).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_strip_document_xml_tabs_and_breaks() {
        let xml = "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>";
        assert_eq!(strip_document_xml(xml), "a\tb\nc\n");
    }

    #[test]
    fn test_looks_binary() {
        assert!(looks_binary(&[0u8; 100]));
        assert!(!looks_binary(b"plain old resume text"));
        assert!(!looks_binary(&[]));
    }
}
