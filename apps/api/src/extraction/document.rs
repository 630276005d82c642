//! Document text extraction for uploaded resumes and job descriptions.
//!
//! PDF goes through `pdf-extract` on a blocking thread, DOCX is converted by a
//! `pandoc` subprocess reading a temp file, TXT is decoded as lossy UTF-8.

use std::io::Write;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}. Please use PDF, DOCX, or TXT files.")]
    Unsupported(String),

    #[error("Uploaded document is empty")]
    Empty,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Document conversion failed: {0}")]
    Convert(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Kind from the file extension, case-insensitive.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(ExtractionError::Unsupported(format!(".{ext}"))),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain",
        }
    }
}

/// Extracts plain text from an uploaded file.
pub async fn extract_text(data: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_filename(filename)?;
    if data.is_empty() {
        return Err(ExtractionError::Empty);
    }

    debug!(filename, ?kind, bytes = data.len(), "extracting document text");

    let text = match kind {
        DocumentKind::Txt => String::from_utf8_lossy(data).into_owned(),
        DocumentKind::Pdf => {
            let bytes = data.to_vec();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?
        }
        DocumentKind::Docx => convert_with_pandoc(data).await?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

async fn convert_with_pandoc(data: &[u8]) -> Result<String, ExtractionError> {
    let mut tmpfile = tempfile::Builder::new().suffix(".docx").tempfile()?;
    tmpfile.write_all(data)?;

    let output = tokio::time::timeout(
        CONVERT_TIMEOUT,
        Command::new("pandoc")
            .arg("-f")
            .arg("docx")
            .arg("-t")
            .arg("plain")
            .arg("--wrap=none")
            .arg(tmpfile.path())
            .output(),
    )
    .await
    .map_err(|_| {
        ExtractionError::Convert(format!(
            "pandoc timed out after {}s",
            CONVERT_TIMEOUT.as_secs()
        ))
    })??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Convert(format!(
            "pandoc failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("cv.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("a.b.docx").unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("jd.txt").unwrap(), DocumentKind::Txt);
        assert!(matches!(
            DocumentKind::from_filename("resume.odt"),
            Err(ExtractionError::Unsupported(ext)) if ext == ".odt"
        ));
        assert!(DocumentKind::from_filename("README").is_err());
    }

    #[tokio::test]
    async fn test_txt_is_decoded_lossily() {
        let text = extract_text(b"Ada Lovelace\n\xffAnalyst", "cv.txt").await.unwrap();
        assert!(text.starts_with("Ada Lovelace\n"));
        assert!(text.ends_with("Analyst"));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        assert!(matches!(
            extract_text(b"", "cv.txt").await,
            Err(ExtractionError::Empty)
        ));
        assert!(matches!(
            extract_text(b"   \n", "cv.txt").await,
            Err(ExtractionError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_checked_first() {
        assert!(matches!(
            extract_text(b"", "cv.rtf").await,
            Err(ExtractionError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_pdf_reports_pdf_error() {
        assert!(matches!(
            extract_text(b"not a pdf", "cv.pdf").await,
            Err(ExtractionError::Pdf(_))
        ));
    }
}
