use std::path::Path;

use crate::error::FormatError;

/// Parse `key: value` lines with RFC 822 style continuations.
///
/// A line starting with a space or tab continues the previous value; it is
/// appended after a `\n` with its leading whitespace kept, so the writer can
/// reproduce it. Blank lines are skipped.
pub(crate) fn parse_key_values(path: &Path, text: &str) -> Result<Vec<(String, String)>, FormatError> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;

        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let (_, value) = pairs.last_mut().ok_or_else(|| FormatError::Indentation {
                path: path.to_path_buf(),
                line: number,
            })?;
            value.push('\n');
            value.push_str(line);
            continue;
        }

        let (key, value) = line.split_once(':').ok_or_else(|| FormatError::MissingSeparator {
            path: path.to_path_buf(),
            line: number,
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(FormatError::MissingSeparator {
                path: path.to_path_buf(),
                line: number,
            });
        }

        pairs.push((key.to_string(), value.trim().to_string()));
    }

    Ok(pairs)
}

/// Inverse of [`parse_key_values`] for one pair, with a trailing newline.
pub(crate) fn format_key_value(key: &str, value: &str) -> String {
    let mut lines = value.split('\n');
    let mut out = format!("{key}: {}\n", lines.next().unwrap_or_default());
    for continuation in lines {
        if !continuation.starts_with([' ', '\t']) {
            out.push_str("  ");
        }
        out.push_str(continuation);
        out.push('\n');
    }
    out
}
