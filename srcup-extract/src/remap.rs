//! Renumbering of the file ids a single contract references.

use crate::{artifacts::FileTable, sourcemap::FileId};
use std::collections::{BTreeMap, BTreeSet};

/// Maps global (compilation unit wide) file ids to the dense local ids of one contract.
///
/// * [`FileId::NONE`] always maps to itself.
/// * Known ids get `0..k` in ascending order of their global id.
/// * Ids that are neither `-1` nor known map to `-1` and do not take a local index, so local
///   index `i` always names the `i`-th entry of [`FileRemapping::assigned`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRemapping {
    mapping: BTreeMap<FileId, FileId>,
    assigned: Vec<FileId>,
}

impl FileRemapping {
    /// Builds the remapping for the referenced ids `refs`, in any order and with duplicates.
    pub fn new<I>(refs: I, is_known: impl Fn(FileId) -> bool) -> Self
    where
        I: IntoIterator<Item = FileId>,
    {
        let mut mapping = BTreeMap::new();
        let mut assigned = Vec::new();

        // sorted iteration fixes the local numbering
        for id in refs.into_iter().collect::<BTreeSet<_>>() {
            let local = if id.is_none() {
                FileId::NONE
            } else if is_known(id) {
                let local = FileId(assigned.len() as i64);
                assigned.push(id);
                local
            } else {
                tracing::debug!(file_id = %id, "source map references an unknown file");
                FileId::NONE
            };
            mapping.insert(id, local);
        }

        FileRemapping { mapping, assigned }
    }

    /// Builds the remapping against the files of a compilation unit
    pub fn for_table<I>(refs: I, files: &FileTable) -> Self
    where
        I: IntoIterator<Item = FileId>,
    {
        Self::new(refs, |id| files.contains(id))
    }

    /// Returns the local id of `global`, `None` if `global` was not among the referenced ids.
    pub fn get(&self, global: FileId) -> Option<FileId> {
        self.mapping.get(&global).copied()
    }

    /// The known global ids in local order, i.e. `assigned()[i]` has local id `i`
    pub fn assigned(&self) -> &[FileId] {
        &self.assigned
    }

    /// Iterates over all `(global, local)` pairs, sorted by global id
    pub fn iter(&self) -> impl Iterator<Item = (FileId, FileId)> + '_ {
        self.mapping.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of local indices handed out
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
