//! Per-name version storage.
//!
//! A [`SlotSequence`] holds the versions stored under one name: a sparse,
//! 0-indexed list of slots (slot `0` is version `1`), a map of labels, and
//! optional metadata covering the sequence as a whole.
//!
//! # Examples
//!
//! ```
//! use afs_core::VFile;
//! use afs_files::AFile;
//! use afs_vfs::{SlotSequence, Version};
//!
//! let mut seq = SlotSequence::new();
//! seq.append(Some(AFile::new("a", "v1").into_ref()));
//! seq.append(Some(AFile::new("a", "v2").into_ref()));
//!
//! let latest = seq.get(Some(&Version::Latest)).unwrap().unwrap();
//! assert_eq!(latest.name(), "a");
//! assert_eq!(seq.len(), 2);
//! ```

use crate::version::{Resolved, Version, resolve};
use afs_core::{Error, FileRef, Metadata, Result};
use afs_files::{AFile, Data};
use std::collections::BTreeMap;

/// Versions and labels stored under one name.
#[derive(Debug, Clone, Default)]
pub struct SlotSequence {
    slots: BTreeMap<usize, FileRef>,
    len: usize,
    labels: BTreeMap<String, FileRef>,
    metadata: Option<Metadata>,
}

impl SlotSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence from consecutive versions starting at version 1.
    #[must_use]
    pub fn from_files(files: impl IntoIterator<Item = FileRef>) -> Self {
        let mut seq = Self::new();
        for file in files {
            seq.append(Some(file));
        }
        seq
    }

    /// Builds a sequence holding `file` under each of `versions`.
    ///
    /// With no versions the file is stored as version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if a version cannot be assigned (for example `0`).
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_files::AFile;
    /// use afs_vfs::{SlotSequence, Version};
    ///
    /// let file = AFile::new("cfg", "x").into_ref();
    /// let seq = SlotSequence::with_versions(&file, &[Version::Index(2), "prod".into()])?;
    ///
    /// assert_eq!(seq.len(), 2);
    /// assert!(seq.get(Some(&Version::Index(1)))?.is_none());
    /// assert!(seq.get(Some(&"prod".into()))?.is_some());
    /// # Ok::<(), afs_core::Error>(())
    /// ```
    pub fn with_versions(file: &FileRef, versions: &[Version]) -> Result<Self> {
        let mut seq = Self::new();
        if versions.is_empty() {
            seq.set(&Version::Index(1), Some(file.clone()))?;
        }
        for version in versions {
            seq.set(version, Some(file.clone()))?;
        }
        Ok(seq)
    }

    /// Builds a single-version sequence around a new [`AFile`].
    ///
    /// The sequence metadata carries the name and the file's content type.
    #[must_use]
    pub fn file(name: &str, data: impl Into<Data>) -> Self {
        let file = AFile::new(name, data);
        let metadata = Metadata::new(name).with_content_type(file.content_type());
        Self::from_files([file.into_ref()]).with_metadata(metadata)
    }

    /// Like [`SlotSequence::file`], with extra metadata and explicit versions.
    ///
    /// # Errors
    ///
    /// Returns an error if a version cannot be assigned.
    pub fn file_with(
        name: &str,
        data: impl Into<Data>,
        metadata: Metadata,
        versions: &[Version],
    ) -> Result<Self> {
        let file = AFile::with_metadata(name, data, metadata.clone());
        let mut sequence_metadata = metadata;
        sequence_metadata.name = Some(name.to_string());
        sequence_metadata.content_type = Some(file.content_type().to_string());
        Ok(Self::with_versions(&file.into_ref(), versions)?.with_metadata(sequence_metadata))
    }

    /// Attaches metadata covering every version.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the sequence-level metadata.
    #[must_use]
    pub const fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Number of slots, including holes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no slots.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over label names.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Returns the file stored at `version`; `None` means latest.
    ///
    /// # Errors
    ///
    /// Returns an error for [`Version::All`].
    pub fn get(&self, version: Option<&Version>) -> Result<Option<FileRef>> {
        let version = version.unwrap_or(&Version::Index(-1));
        Ok(match resolve(version, self.len())? {
            Resolved::Slot(index) => self.slots.get(&index).cloned(),
            Resolved::Label(label) => self.labels.get(&label).cloned(),
            Resolved::Absent => None,
        })
    }

    /// Stores `file` at `version`, extending the slots with holes as needed.
    ///
    /// Holes take no space, so a large version number only moves the end.
    ///
    /// Storing `None` clears the slot or removes the label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersionAssignment`] if the version resolves
    /// to no slot, or [`Error::IllegalVersion`] for [`Version::All`].
    pub fn set(&mut self, version: &Version, file: Option<FileRef>) -> Result<()> {
        match resolve(version, self.len())? {
            Resolved::Slot(index) => {
                let end = index
                    .checked_add(1)
                    .ok_or_else(|| Error::InvalidVersionAssignment {
                        version: version.to_string(),
                    })?;
                self.len = self.len.max(end);
                self.put(index, file);
            }
            Resolved::Label(label) => match file {
                Some(file) => {
                    self.labels.insert(label, file);
                }
                None => {
                    self.labels.remove(&label);
                }
            },
            Resolved::Absent => {
                return Err(Error::InvalidVersionAssignment {
                    version: version.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Adds `file` as a new version after the last slot.
    pub fn append(&mut self, file: Option<FileRef>) {
        let index = self.len;
        self.len += 1;
        self.put(index, file);
    }

    fn put(&mut self, index: usize, file: Option<FileRef>) {
        match file {
            Some(file) => {
                self.slots.insert(index, file);
            }
            None => {
                self.slots.remove(&index);
            }
        }
    }

    /// Deletes `version`.
    ///
    /// [`Version::All`] drops every slot and label but keeps the sequence
    /// metadata. A slot becomes a hole, so later versions keep their
    /// numbers. Deleting an absent version does nothing.
    pub fn delete(&mut self, version: &Version) {
        if *version == Version::All {
            self.slots.clear();
            self.len = 0;
            self.labels.clear();
            return;
        }
        // `resolve` only fails for `All`
        match resolve(version, self.len()) {
            Ok(Resolved::Slot(index)) => {
                self.slots.remove(&index);
            }
            Ok(Resolved::Label(label)) => {
                self.labels.remove(&label);
            }
            Ok(Resolved::Absent) | Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afs_core::same_file;

    fn files(n: usize) -> Vec<FileRef> {
        (1..=n)
            .map(|i| AFile::new(format!("v{i}"), format!("data{i}")).into_ref())
            .collect()
    }

    fn same(a: Option<FileRef>, b: Option<FileRef>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => same_file(&a, &b),
            (None, None) => true,
            _ => false,
        }
    }

    #[test]
    fn test_positive_negative_symmetry() {
        for len in 1..=5 {
            let seq = SlotSequence::from_files(files(len));
            let len_i = i64::try_from(len).unwrap();
            for k in 1..=len_i {
                let forward = seq.get(Some(&Version::Index(k))).unwrap();
                let backward = seq.get(Some(&Version::Index(-(len_i - k + 1)))).unwrap();
                assert!(forward.is_some());
                assert!(same(forward, backward), "len={len} k={k}");
            }
        }
    }

    #[test]
    fn test_keywords_match_indices() {
        let seq = SlotSequence::from_files(files(3));
        assert!(same(
            seq.get(Some(&Version::Latest)).unwrap(),
            seq.get(Some(&Version::Index(-1))).unwrap()
        ));
        assert!(same(
            seq.get(Some(&Version::Earliest)).unwrap(),
            seq.get(Some(&Version::Index(1))).unwrap()
        ));
        assert!(same(
            seq.get(None).unwrap(),
            seq.get(Some(&Version::Latest)).unwrap()
        ));
    }

    #[test]
    fn test_version_zero_is_absent() {
        for len in 0..3 {
            let seq = SlotSequence::from_files(files(len));
            assert!(seq.get(Some(&Version::Index(0))).unwrap().is_none());
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut seq = SlotSequence::new();
        let file = AFile::new("x", "x").into_ref();

        seq.set(&Version::Index(3), Some(file.clone())).unwrap();

        assert_eq!(seq.len(), 3);
        assert!(seq.get(Some(&Version::Index(1))).unwrap().is_none());
        assert!(same(seq.get(Some(&Version::Index(3))).unwrap(), Some(file)));
    }

    #[test]
    fn test_huge_version_stays_sparse() {
        let mut seq = SlotSequence::new();
        let file = AFile::new("x", "x").into_ref();

        seq.set(&Version::Index(i64::MAX), Some(file.clone())).unwrap();

        let len = usize::try_from(i64::MAX).unwrap();
        assert_eq!(seq.len(), len);
        assert!(same(seq.get(None).unwrap(), Some(file.clone())));
        assert!(same(seq.get(Some(&Version::Index(i64::MAX))).unwrap(), Some(file)));
        assert!(seq.get(Some(&Version::Index(1))).unwrap().is_none());
        assert!(seq.get(Some(&Version::Index(-2))).unwrap().is_none());

        seq.delete(&Version::Latest);
        assert_eq!(seq.len(), len);
        assert!(seq.get(None).unwrap().is_none());
    }

    #[test]
    fn test_clearing_a_slot_past_the_end_extends() {
        let mut seq = SlotSequence::from_files(files(1));

        seq.set(&Version::Index(4), None).unwrap();
        seq.append(None);

        assert_eq!(seq.len(), 5);
        assert!(seq.get(Some(&Version::Index(1))).unwrap().is_some());
        assert!(seq.get(None).unwrap().is_none());
    }

    #[test]
    fn test_set_absent_version_fails() {
        let mut seq = SlotSequence::new();
        let file = AFile::new("x", "x").into_ref();

        let err = seq.set(&Version::Index(0), Some(file.clone())).unwrap_err();
        assert!(matches!(err, Error::InvalidVersionAssignment { ref version } if version == "0"));

        let err = seq.set(&Version::Index(-1), Some(file.clone())).unwrap_err();
        assert!(err.is_invalid_version());

        assert!(seq.set(&Version::All, Some(file)).unwrap_err().is_invalid_version());
    }

    #[test]
    fn test_labels_point_at_files() {
        let mut seq = SlotSequence::from_files(files(2));
        let first = seq.get(Some(&Version::Index(1))).unwrap();
        seq.set(&"stable".into(), first.clone()).unwrap();
        seq.append(Some(AFile::new("v3", "3").into_ref()));

        assert!(same(seq.get(Some(&"stable".into())).unwrap(), first));
        assert_eq!(seq.labels().collect::<Vec<_>>(), ["stable"]);

        seq.set(&"stable".into(), None).unwrap();
        assert!(seq.get(Some(&"stable".into())).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let mut seq = SlotSequence::from_files(files(3)).with_metadata(Metadata::new("seq"));
        let second = seq.get(Some(&Version::Index(2))).unwrap();
        seq.set(&"tag".into(), second).unwrap();

        seq.delete(&Version::Index(2));
        assert_eq!(seq.len(), 3);
        assert!(seq.get(Some(&Version::Index(2))).unwrap().is_none());
        assert!(seq.get(Some(&"tag".into())).unwrap().is_some());

        seq.delete(&"tag".into());
        assert!(seq.get(Some(&"tag".into())).unwrap().is_none());

        seq.delete(&Version::Index(0));
        seq.delete(&Version::Index(10));
        assert_eq!(seq.len(), 3);

        seq.delete(&Version::All);
        assert!(seq.is_empty());
        assert_eq!(seq.labels().count(), 0);
        assert_eq!(seq.metadata().and_then(|m| m.name.as_deref()), Some("seq"));
    }

    #[test]
    fn test_with_versions_default() {
        let file = AFile::new("x", "x").into_ref();
        let seq = SlotSequence::with_versions(&file, &[]).unwrap();

        assert_eq!(seq.len(), 1);
        assert!(same(seq.get(None).unwrap(), Some(file)));
    }

    #[test]
    fn test_file_helper_metadata() {
        let seq = SlotSequence::file("table", serde_json::json!([1, 2]));
        let meta = seq.metadata().unwrap();

        assert_eq!(meta.name.as_deref(), Some("table"));
        assert_eq!(meta.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_file_with_versions_and_metadata() {
        let seq = SlotSequence::file_with(
            "notes",
            "hi",
            Metadata::default().with_extra("owner", "ops"),
            &[Version::Index(1), "draft".into()],
        )
        .unwrap();
        let meta = seq.metadata().unwrap();

        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.extra["owner"], "ops");
        assert!(same(
            seq.get(Some(&Version::Index(1))).unwrap(),
            seq.get(Some(&"draft".into())).unwrap()
        ));
    }
}
