use std::fs;
use std::path::Path;

use crate::error::IndexError;

/// Extraction capability selected per file extension. PDF support is a
/// compile-time capability: without the `pdf` feature the variant does not
/// exist and `.pdf` files are simply not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;

        if extension.eq_ignore_ascii_case("md")
            || extension.eq_ignore_ascii_case("markdown")
            || extension.eq_ignore_ascii_case("txt")
        {
            return Some(Self::Text);
        }

        #[cfg(feature = "pdf")]
        if extension.eq_ignore_ascii_case("pdf") {
            return Some(Self::Pdf);
        }

        None
    }
}

pub fn extract_text(path: &Path, kind: SourceKind) -> Result<String, IndexError> {
    match kind {
        SourceKind::Text => Ok(fs::read_to_string(path)?.trim().to_string()),
        #[cfg(feature = "pdf")]
        SourceKind::Pdf => extract_pdf_text(path),
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf_text(path: &Path) -> Result<String, IndexError> {
    let document =
        lopdf::Document::load(path).map_err(|error| IndexError::PdfParse(error.to_string()))?;

    let mut pages = Vec::new();
    for (page_no, _page_id) in document.get_pages() {
        let text = document
            .extract_text(&[page_no])
            .map_err(|error| IndexError::PdfParse(error.to_string()))?;

        let text = text.trim();
        if !text.is_empty() {
            pages.push(text.to_string());
        }
    }

    if pages.is_empty() {
        return Err(IndexError::PdfParse(format!(
            "no extractable page text: {}",
            path.display()
        )));
    }

    Ok(pages.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn kind_dispatch_matches_supported_extensions() {
        assert_eq!(
            SourceKind::from_path(Path::new("fever.md")),
            Some(SourceKind::Text)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("notes.TXT")),
            Some(SourceKind::Text)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("deep/nested/guide.markdown")),
            Some(SourceKind::Text)
        );
        assert_eq!(SourceKind::from_path(Path::new("image.png")), None);
        assert_eq!(SourceKind::from_path(Path::new("no_extension")), None);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_extension_is_recognized_when_capability_is_present() {
        assert_eq!(
            SourceKind::from_path(Path::new("guide.pdf")),
            Some(SourceKind::Pdf)
        );
    }

    #[test]
    fn plain_text_is_read_and_trimmed() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("hydration.md");
        File::create(&path)
            .and_then(|mut file| file.write_all(b"  Drink water for dehydration.\n\n"))?;

        let text = extract_text(&path, SourceKind::Text)?;
        assert_eq!(text, "Drink water for dehydration.");
        Ok(())
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn broken_pdf_reports_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = extract_text(&path, SourceKind::Pdf);
        assert!(matches!(result, Err(IndexError::PdfParse(_))));
        Ok(())
    }
}
