//! Broken-link CSV report
//!
//! One row per broken URL, with the referring pages joined by commas in a
//! single field:
//!
//! ```text
//! url,referrers
//! https://example.com/gone,"https://example.com/,https://example.com/a"
//! ```

use crate::crawler::CrawlResult;
use crate::output::{OutputError, OutputResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Characters that are not allowed in report file names
const FORBIDDEN_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces characters that cannot appear in a file name with `_`
///
/// # Example
///
/// ```
/// use broken_links::output::sanitize_report_title;
///
/// assert_eq!(sanitize_report_title("a/b: c?"), "a_b_ c_");
/// ```
pub fn sanitize_report_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Returns `<dir>/<sanitized title>.csv`
pub fn report_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.csv", sanitize_report_title(title)))
}

/// Writes the report rows to any writer
pub fn write_csv<W: Write>(result: &CrawlResult, writer: W) -> OutputResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["url", "referrers"])?;

    for (url, referrers) in result {
        let joined = referrers
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",");
        csv_writer.write_record([url.as_str(), joined.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the report file, creating the report directory if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - The directory or file could not be written
pub fn write_csv_report(result: &CrawlResult, dir: &Path, title: &str) -> OutputResult<PathBuf> {
    if sanitize_report_title(title).is_empty() {
        return Err(OutputError::Format(
            "report title is empty after sanitizing".to_string(),
        ));
    }

    fs::create_dir_all(dir)?;
    let path = report_path(dir, title);
    let file = fs::File::create(&path)?;
    write_csv(result, file)?;

    tracing::info!("Wrote {} broken links to {}", result.len(), path.display());
    Ok(path)
}
