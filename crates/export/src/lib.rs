//! Export of proofing logs as a paginated EPUB book, or as a single XHTML
//! page when the output path asks for one.

pub mod epub;
pub mod layout;
pub mod template;
pub mod xhtml;

use std::io;
use std::path::{Path, PathBuf};

use scriptproof_core::{try_read_lines, write_atomic, ProofError};
use thiserror::Error;
use tracing::{error, info};

pub use epub::EpubMetadata;
pub use layout::{
    FixedLinePaginator, LayoutInput, LayoutSummary, LineRange, PageLayout, PaginationResult,
    Paginator,
};
pub use template::{
    Alignment, HeaderFooterContext, HeaderFooterTemplate, RenderedHeaderFooter, TemplateError,
    TemplateSegment, TemplateToken,
};
pub use xhtml::{SourceInfo, XhtmlRenderer};

/// Extension given to the export when no output path is supplied.
pub const DEFAULT_EXTENSION: &str = "epub";

/// Container written for an output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Epub,
    /// Bare XHTML page, chosen by an `.xhtml`, `.html` or `.htm` output path.
    Xhtml,
}

impl ExportFormat {
    pub fn for_path(path: &Path) -> Self {
        let is_page = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ["xhtml", "html", "htm"]
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_page {
            ExportFormat::Xhtml
        } else {
            ExportFormat::Epub
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Log(#[from] ProofError),
    #[error("log {} has no lines to export", path.display())]
    EmptyLog { path: PathBuf },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("failed to build XHTML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to render XHTML: {0}")]
    Render(String),
    #[error("failed to build EPUB archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write export {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub title: String,
    pub author: String,
    /// BCP 47 tag written to `lang`.
    pub language: String,
    pub lines_per_page: usize,
    pub header: String,
    pub footer: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Log Export".to_string(),
            author: "Unknown".to_string(),
            language: "ko".to_string(),
            lines_per_page: 40,
            header: "&l&t&r&a".to_string(),
            footer: "&c&p / &P".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub output: PathBuf,
    pub format: ExportFormat,
    pub lines: usize,
    pub pages: usize,
}

/// `log` with its extension replaced by [`DEFAULT_EXTENSION`].
pub fn default_output_path(log: &Path) -> PathBuf {
    log.with_extension(DEFAULT_EXTENSION)
}

/// Reads the non-empty lines of `log_path` and writes them as an EPUB book,
/// or as one XHTML page when `output` has a page extension.
pub fn export_log(
    log_path: impl AsRef<Path>,
    output: Option<&Path>,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    let log_path = log_path.as_ref();
    let renderer = XhtmlRenderer::new(options)?;

    let lines = try_read_lines(log_path)?;
    if lines.is_empty() {
        error!(log = %log_path.display(), "no lines to export");
        return Err(ExportError::EmptyLog {
            path: log_path.to_path_buf(),
        });
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(log_path));
    let file_name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_path = log_path.display().to_string();
    let source = SourceInfo {
        file_name: &file_name,
        file_path: &file_path,
    };
    let (xhtml, summary) = renderer.render(&lines, source)?;

    let format = ExportFormat::for_path(&output);
    let payload = match format {
        ExportFormat::Xhtml => xhtml.into_bytes(),
        ExportFormat::Epub => {
            let modified = epub::modified_now();
            let metadata = EpubMetadata {
                identifier: &file_name,
                title: &options.title,
                author: &options.author,
                language: &options.language,
                modified: &modified,
            };
            epub::package(&metadata, &xhtml, summary.total_pages)?
        }
    };
    write_atomic(&output, &payload).map_err(|source| ExportError::Write {
        path: output.clone(),
        source,
    })?;

    info!(
        output = %output.display(),
        format = ?format,
        lines = summary.total_lines,
        pages = summary.total_pages,
        "log exported"
    );
    Ok(ExportReport {
        output,
        format,
        lines: summary.total_lines,
        pages: summary.total_pages,
    })
}
