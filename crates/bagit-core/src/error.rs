use std::fmt;
use std::io;
use std::path::PathBuf;

/// Malformed tag files. Always fatal to the current parse.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("'{0}' starts with a byte order mark")]
    ByteOrderMark(PathBuf),

    #[error("'{path}' is not valid {encoding}")]
    Encoding { path: PathBuf, encoding: String },

    #[error("'{path}' contains text that cannot be encoded as {encoding}")]
    Unencodable { path: PathBuf, encoding: String },

    #[error("unsupported tag file character encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("'{path}' is missing required key '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("unparsable bagit version '{0}'")]
    UnparsableVersion(String),

    #[error("'{path}' line {line}: missing ':' between key and value")]
    MissingSeparator { path: PathBuf, line: usize },

    #[error("'{path}' line {line}: indented continuation line has no preceding key")]
    Indentation { path: PathBuf, line: usize },

    #[error("'{path}' line {line}: expected '<checksum> <path>'")]
    ManifestLine { path: PathBuf, line: usize },

    #[error("'{path}' line {line}: expected '<url> <length> <path>'")]
    FetchLine { path: PathBuf, line: usize },

    #[error("'{path}' line {line}: invalid fetch length '{value}'")]
    FetchLength {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("'{path}' line {line}: invalid url '{value}': {source}")]
    FetchUrl {
        path: PathBuf,
        line: usize,
        value: String,
        source: url::ParseError,
    },
}

/// Declared paths that cannot be trusted. Treated as adversarial input.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("'{0}' uses '\\' as a path separator")]
    Backslash(String),

    #[error("'{0}' refers to a home directory")]
    HomeDirectory(String),

    #[error("'{declared}' resolves to '{resolved}', outside the bag root")]
    Traversal { declared: String, resolved: PathBuf },

    #[error("'{0}' is not a resolvable file uri")]
    FileUri(String),

    #[error("declared path '{0}' does not name a file inside the bag")]
    Empty(String),
}

/// Structural problems found by the completeness check.
#[derive(Debug, thiserror::Error)]
pub enum CompletenessError {
    #[error("fetch item '{0}' has not been downloaded")]
    MissingFetchItem(PathBuf),

    #[error("bag declaration '{0}' does not exist")]
    MissingBagitFile(PathBuf),

    #[error("payload directory '{0}' does not exist")]
    MissingPayloadDirectory(PathBuf),

    #[error("bag '{0}' has no payload manifest")]
    MissingPayloadManifest(PathBuf),

    #[error("'{path}' is listed in {manifest} but does not exist")]
    FileNotInPayloadDirectory { manifest: String, path: PathBuf },

    #[error("payload file '{path}' is not listed in {}", .manifest.as_deref().unwrap_or("any payload manifest"))]
    FileNotInManifest {
        path: PathBuf,
        manifest: Option<String>,
    },
}

/// Quick verification failures.
#[derive(Debug, thiserror::Error)]
pub enum OxumError {
    #[error("bag has no Payload-Oxum")]
    Missing,

    #[error("malformed Payload-Oxum '{0}'")]
    Malformed(String),

    #[error("Payload-Oxum byte count mismatch: expected {expected}, found {actual}")]
    ByteCount { expected: u64, actual: u64 },

    #[error("Payload-Oxum file count mismatch: expected {expected}, found {actual}")]
    FileCount { expected: u64, actual: u64 },
}

/// One file whose recomputed digest differs from its manifest entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub path: PathBuf,
    pub algorithm: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' should have {} checksum {} but was {}",
            self.path.display(),
            self.algorithm,
            self.expected,
            self.actual
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Incomplete(#[from] CompletenessError),

    #[error("{}", describe_mismatches(.0))]
    CorruptChecksum(Vec<ChecksumMismatch>),

    #[error(transparent)]
    Checksum(#[from] bagit_checksum::Error),

    #[error(transparent)]
    Oxum(#[from] OxumError),

    #[error(transparent)]
    Fs(#[from] bagit_fs::Error),

    #[error("i/o error on '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

fn describe_mismatches(mismatches: &[ChecksumMismatch]) -> String {
    match mismatches {
        [] => "checksum verification failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more corrupt files)", rest.len()),
    }
}
