use std::path::Path;

use super::key_value::parse_key_values;
use crate::data::Version;
use crate::encoding::TagEncoding;
use crate::error::FormatError;

pub(crate) const VERSION_KEY: &str = "BagIt-Version";
pub(crate) const ENCODING_KEY: &str = "Tag-File-Character-Encoding";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Version and tag file encoding declared by `bagit.txt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub version: Version,
    pub encoding: TagEncoding,
}

/// Parse `bagit.txt`, which is always UTF-8 and must not start with a BOM.
pub(crate) fn parse_declaration(path: &Path, bytes: &[u8]) -> Result<Declaration, FormatError> {
    if bytes.starts_with(UTF8_BOM) {
        return Err(FormatError::ByteOrderMark(path.to_path_buf()));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| FormatError::Encoding {
        path: path.to_path_buf(),
        encoding: TagEncoding::Utf8.name().to_string(),
    })?;

    let mut version = None;
    let mut encoding = None;

    for (key, value) in parse_key_values(path, text)? {
        if key.eq_ignore_ascii_case(VERSION_KEY) {
            version = Some(Version::parse(&value)?);
        } else if key.eq_ignore_ascii_case(ENCODING_KEY) {
            encoding = Some(value.parse::<TagEncoding>()?);
        } else {
            tracing::warn!(path = %path.display(), key = %key, "unexpected key in bag declaration");
        }
    }

    let version = version.ok_or_else(|| FormatError::MissingKey {
        path: path.to_path_buf(),
        key: VERSION_KEY,
    })?;
    let encoding = encoding.ok_or_else(|| FormatError::MissingKey {
        path: path.to_path_buf(),
        key: ENCODING_KEY,
    })?;

    if !Version::SUPPORTED.contains(&version) {
        tracing::warn!(%version, "bag declares an unknown BagIt version");
    }

    Ok(Declaration { version, encoding })
}

/// Contents of `bagit.txt` for a bag.
pub(crate) fn format_declaration(version: Version, encoding: TagEncoding) -> String {
    format!("{VERSION_KEY}: {version}\n{ENCODING_KEY}: {encoding}\n")
}
