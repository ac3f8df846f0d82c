//! Read, test and extract RAR archives.
//!
//! `rarfile-core` drives the native UnRAR decoder through a small state
//! machine: a [`Session`] opens one native handle, walks the member-header
//! stream and issues one action (skip, test or extract) per member, and
//! always closes the handle again. On top of that sit the immutable
//! [`Catalog`] built by a listing pass and the [`RarFile`] object that
//! answers metadata queries and runs extraction and test passes.
//!
//! # Examples
//!
//! ```no_run
//! use rarfile_core::RarFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = RarFile::open("backup.rar")?;
//! for entry in archive.infolist() {
//!     println!("{} {} {}", entry.filename, entry.modified_at, entry.uncompressed_size);
//! }
//!
//! if let Some(failure) = archive.testrar()? {
//!     eprintln!("corrupted member: {}", failure.name);
//! }
//!
//! archive.extractall(Some("/tmp/output".as_ref()), None, None)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extraction;
pub mod header;
pub mod native;
pub mod report;
pub mod session;
pub mod test_utils;

// Re-export main API types
pub use api::extract_archive;
pub use api::is_valid_archive;
pub use api::is_valid_archive_with;
pub use api::list_archive;
pub use api::test_archive;
pub use archive::RarFile;
pub use archive::RarFileBuilder;
pub use catalog::Catalog;
pub use config::ArchiveConfig;
pub use config::Password;
pub use error::ErrorKind;
pub use error::RarError;
pub use error::Result;
pub use extraction::MemberSelection;
pub use extraction::TestFailure;
pub use header::DosDateTime;
pub use header::Entry;
pub use header::EntryFlags;
pub use header::HostOs;
pub use header::decode_dos_timestamp;
pub use native::Action;
pub use native::Decoder;
pub use native::OpenMode;
pub use native::ResultCode;
pub use native::UnrarDecoder;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use session::Session;
pub use session::SessionState;
pub use session::Step;
