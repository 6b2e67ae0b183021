use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::ClientError;
use crate::http::{ApiClient, HttpRequest, Method};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Pdf,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unsupported export format `{other}` (expected xlsx|pdf)")),
        }
    }
}

/// A file produced by the backend, ready to be written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Download {
    /// Writes the file into `dir`, creating it if needed, and returns its path.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, ClientError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!(
            event_name = "report.download.saved",
            path = %path.display(),
            bytes = self.bytes.len(),
            "download saved"
        );
        Ok(path)
    }
}

/// Extracts `filename` from a `Content-Disposition` header, dropping any
/// directory components.
pub fn disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
        .and_then(|name| name.rsplit(&['/', '\\'][..]).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}

pub struct ReportsService<'a> {
    api: &'a ApiClient,
}

impl<'a> ReportsService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn export(&self, report: &str, format: ReportFormat) -> Result<Download, ClientError> {
        let request = HttpRequest::new(Method::Get, format!("/reports/{report}/export"))
            .with_query("format", format);
        let response = self.api.execute(request).await?;

        let file_name = response
            .content_disposition
            .as_deref()
            .and_then(disposition_file_name)
            .unwrap_or_else(|| format!("{report}.{format}"));
        let content_type =
            response.content_type.unwrap_or_else(|| format.content_type().to_string());

        info!(
            event_name = "report.export.completed",
            report,
            format = %format,
            bytes = response.body.len(),
            "report exported"
        );
        Ok(Download { file_name, content_type, bytes: response.body })
    }
}

#[cfg(test)]
mod tests {
    use super::{disposition_file_name, ReportFormat};

    #[test]
    fn file_name_comes_from_content_disposition() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="payments-2026.xlsx""#),
            Some("payments-2026.xlsx".to_string())
        );
        assert_eq!(
            disposition_file_name("attachment; filename=../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(disposition_file_name("inline"), None);
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("XLSX".parse::<ReportFormat>(), Ok(ReportFormat::Xlsx));
        assert_eq!("pdf".parse::<ReportFormat>(), Ok(ReportFormat::Pdf));
        assert!("csv".parse::<ReportFormat>().is_err());
    }
}
