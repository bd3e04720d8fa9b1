use std::io;
use std::path::Path;

/// Number of trailing lines served by `/logs`.
pub const LOG_TAIL_LINES: usize = 100;

/// Returns the last `limit` lines of the file, each keeping its line terminator.
///
/// A missing file surfaces as [`io::ErrorKind::NotFound`].
pub async fn tail_lines(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    let bytes = tokio::fs::read(path).await?;
    let content = String::from_utf8_lossy(&bytes);

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let start = lines.len().saturating_sub(limit);

    Ok(lines[start..].iter().map(|line| line.to_string()).collect())
}
