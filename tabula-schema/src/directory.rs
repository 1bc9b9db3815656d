//! Member lookup for people columns.

use std::collections::HashSet;

/// Source of valid member ids for people columns.
pub trait MemberDirectory: Send + Sync {
    fn contains(&self, member_id: &str) -> bool;
}

/// In-memory member set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDirectory {
    members: HashSet<String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, member_id: impl Into<String>) {
        self.members.insert(member_id.into());
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StaticDirectory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl MemberDirectory for StaticDirectory {
    fn contains(&self, member_id: &str) -> bool {
        self.members.contains(member_id)
    }
}
