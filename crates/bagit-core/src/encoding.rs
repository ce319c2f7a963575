use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Character encoding declared by `Tag-File-Character-Encoding`.
///
/// Applies to every tag file except `bagit.txt`, which is always UTF-8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TagEncoding {
    #[default]
    Utf8,
    /// Byte order taken from the BOM, big-endian without one. Written with a BOM.
    Utf16,
    Utf16Be,
    Utf16Le,
    Latin1,
    Ascii,
}

impl TagEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Decode tag file bytes, dropping a leading BOM. `None` if the bytes are invalid.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).ok()
            }
            Self::Utf16 => {
                if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
                    decode_utf16(rest, u16::from_le_bytes)
                } else {
                    let rest = bytes.strip_prefix(UTF16_BE_BOM).unwrap_or(bytes);
                    decode_utf16(rest, u16::from_be_bytes)
                }
            }
            Self::Utf16Be => {
                let rest = bytes.strip_prefix(UTF16_BE_BOM).unwrap_or(bytes);
                decode_utf16(rest, u16::from_be_bytes)
            }
            Self::Utf16Le => {
                let rest = bytes.strip_prefix(UTF16_LE_BOM).unwrap_or(bytes);
                decode_utf16(rest, u16::from_le_bytes)
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Encode text for a tag file. `None` if a character has no representation.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::Utf16 => {
                let mut out = UTF16_BE_BOM.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                Some(out)
            }
            Self::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Self::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Self::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
            Self::Ascii => text.is_ascii().then(|| text.as_bytes().to_vec()),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

impl FromStr for TagEncoding {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', "-");
        match normalized.as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "UTF-16" | "UTF16" => Ok(Self::Utf16),
            "UTF-16BE" | "UTF16BE" => Ok(Self::Utf16Be),
            "UTF-16LE" | "UTF16LE" => Ok(Self::Utf16Le),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            "US-ASCII" | "ASCII" => Ok(Self::Ascii),
            _ => Err(FormatError::UnsupportedEncoding(s.trim().to_string())),
        }
    }
}

impl fmt::Display for TagEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}
