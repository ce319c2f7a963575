use std::path::Path;

use url::Url;

use super::manifest::split_field;
use crate::data::FetchItem;
use crate::error::{Error, FormatError};
use crate::sanitize::{relative_to, resolve_declared_path};

/// Parse `fetch.txt`: `<url> <length or -> <path>` per line.
pub(crate) fn parse_fetch(path: &Path, bag_root: &Path, text: &str) -> Result<Vec<FetchItem>, Error> {
    let mut items = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let malformed = || FormatError::FetchLine {
            path: path.to_path_buf(),
            line: number,
        };
        let (url, rest) = split_field(line).ok_or_else(malformed)?;
        let (length, declared) = split_field(rest).ok_or_else(malformed)?;

        let url = Url::parse(url).map_err(|source| FormatError::FetchUrl {
            path: path.to_path_buf(),
            line: number,
            value: url.to_string(),
            source,
        })?;

        let length = match length {
            "-" => None,
            value => Some(value.parse::<u64>().map_err(|_| FormatError::FetchLength {
                path: path.to_path_buf(),
                line: number,
                value: value.to_string(),
            })?),
        };

        let physical = resolve_declared_path(bag_root, declared)?;
        let relative = relative_to(bag_root, &physical);

        items.push(FetchItem::new(url, length, physical, relative));
    }

    Ok(items)
}
