//! Immutable member catalog built by one listing pass.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::RarError;
use crate::Result;
use crate::config::ArchiveConfig;
use crate::extraction::MemberSelection;
use crate::header::Entry;
use crate::native::Action;
use crate::native::Decoder;
use crate::session::Session;

/// Ordered list of archive members plus a name index.
///
/// Built once by [`Catalog::load`]; every query afterwards is answered from
/// memory without touching the native decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<Entry>,
    index: HashMap<String, Vec<usize>>,
    comment: Option<String>,
}

impl Catalog {
    /// Lists `path` with `decoder`.
    ///
    /// The archive is opened in `config.listing_mode`, every member is
    /// skipped, and the session default password (if any) is applied so
    /// archives with encrypted headers can be listed.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::ArchiveOpen`] if the archive cannot be opened and
    /// [`RarError::BadArchive`] if the header stream breaks; no partial
    /// catalog is returned.
    pub fn load<D: Decoder + ?Sized>(
        decoder: &D,
        path: &Path,
        config: &ArchiveConfig,
    ) -> Result<Self> {
        let mut session = Session::open(
            decoder,
            path,
            config.listing_mode,
            config.password.as_ref(),
            config.comment_capacity,
        )?;
        let comment = session.take_comment();

        let mut entries = Vec::new();
        session
            .run(|_| Action::Skip, None, |step| entries.push(step.entry))
            .map_err(RarError::into_bad_archive)?;

        debug!(archive = %path.display(), members = entries.len(), "catalog loaded");
        Ok(Self::from_entries(entries, comment))
    }

    /// Builds a catalog from already decoded entries.
    #[must_use]
    pub fn from_entries(entries: Vec<Entry>, comment: Option<String>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.entry(entry.filename.clone()).or_default().push(position);
        }
        Self {
            entries,
            index,
            comment,
        }
    }

    /// Member names in archive order, duplicates included.
    #[must_use]
    pub fn namelist(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.filename.as_str()).collect()
    }

    /// Member entries in archive order, duplicates included.
    #[must_use]
    pub fn infolist(&self) -> &[Entry] {
        &self.entries
    }

    /// Looks up a member by name.
    ///
    /// When the name occurs more than once the last occurrence wins, which
    /// is the entry a full extraction leaves on disk.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::NotFound`] if no member has this name.
    pub fn getinfo(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .and_then(|positions| positions.last())
            .map(|&position| &self.entries[position])
            .ok_or_else(|| RarError::NotFound {
                name: name.to_string(),
            })
    }

    /// Every member with this name, in archive order. Empty if none.
    #[must_use]
    pub fn getinfo_all(&self, name: &str) -> Vec<&Entry> {
        self.index
            .get(name)
            .map(|positions| positions.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if a member with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of headers in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the archive has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archive comment, present only when it was read completely.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Number of headers an extraction pass over `selection` extracts.
    #[must_use]
    pub fn count_selected(&self, selection: &MemberSelection) -> usize {
        self.entries
            .iter()
            .filter(|e| selection.contains(&e.filename))
            .count()
    }

    /// Sum of the uncompressed sizes of all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.uncompressed_size))
    }
}
