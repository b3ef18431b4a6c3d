//! Change-stream events emitted by repository watchers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One observed change to a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent<T> {
    pub kind: ChangeKind,
    /// Storage key of the record, independent of any id field it carries.
    pub key: String,
    /// `false` once the record has been removed.
    pub exists: bool,
    pub data: Option<T>,
}

impl<T> ChangeEvent<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ChangeEvent<U> {
        ChangeEvent {
            kind: self.kind,
            key: self.key,
            exists: self.exists,
            data: self.data.map(f),
        }
    }
}
