use crate::data::{Bag, PayloadOxum};
use crate::error::{CompletenessError, OxumError, Result};

pub(crate) fn can_quickly_verify(bag: &Bag) -> bool { bag.metadata.payload_oxum().is_ok() }

/// Compare `Payload-Oxum` with a walk of the payload directory. No hashing.
/// The byte count is checked before the file count.
pub(crate) fn check_quick(bag: &Bag) -> Result<()> {
    let expected = bag.metadata.payload_oxum()?;

    let data_dir = bag.data_dir();
    if !data_dir.is_dir() {
        return Err(CompletenessError::MissingPayloadDirectory(data_dir).into());
    }
    let actual = PayloadOxum::compute(&data_dir)?;

    if expected.total_bytes != actual.total_bytes {
        return Err(OxumError::ByteCount {
            expected: expected.total_bytes,
            actual: actual.total_bytes,
        }
        .into());
    }
    if expected.file_count != actual.file_count {
        return Err(OxumError::FileCount {
            expected: expected.file_count,
            actual: actual.file_count,
        }
        .into());
    }

    tracing::debug!(root = %bag.root_dir.display(), %actual, "payload oxum matches");
    Ok(())
}
