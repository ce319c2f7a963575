//! Filesystem primitives shared by the BagIt reader, writer and verifier.
//!
//! - `walk.rs` - one generic directory walk with hidden-file and ignore filters
//! - `stats.rs` - byte and file counts over a tree (Payload-Oxum input)
//! - `write.rs` - per-file atomic writes for tag files
//! - `copy.rs` - payload copy and move helpers

mod copy;
mod error;
mod stats;
mod walk;
mod write;

pub use copy::{copy_file, move_entries};
pub use error::{Error, Result};
pub use stats::{DirStats, directory_stats};
pub use walk::{EntryKind, IgnoreFn, Visit, WalkEntry, WalkOptions, is_hidden, list_files, walk};
pub use write::{AtomicWriteOptions, atomic_write, create_dir_all};
