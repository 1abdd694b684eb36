//! Append-only table with soft scope masking.

use std::marker::PhantomData;

use super::{BodyId, EntryId, Scopes, TableError};

/// One table row.
#[derive(Clone, Debug)]
pub struct Entry<T> {
    pub value: T,
    /// Owning body; `None` is globally visible.
    pub body: Option<BodyId>,
    /// Soft deletion flag. Set when the owning body is left or the name
    /// is undefined; the row itself stays.
    pub out_of_scope: bool,
    /// Global definition order across all tables.
    pub seq: u64,
}

/// Rows of one symbol kind, addressed by `I`.
#[derive(Clone, Debug)]
pub struct Table<I, T> {
    entries: Vec<Entry<T>>,
    _id: PhantomData<I>,
}

impl<I: EntryId, T> Table<I, T> {
    pub fn new() -> Self {
        Table {
            entries: Vec::new(),
            _id: PhantomData,
        }
    }

    pub(crate) fn push(&mut self, value: T, body: Option<BodyId>, seq: u64) -> Result<I, TableError> {
        self.entries.try_reserve(1)?;
        let id = I::from_index(self.entries.len());
        self.entries.push(Entry {
            value,
            body,
            out_of_scope: false,
            seq,
        });
        Ok(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The payload of an entry.
    ///
    /// Ids are only minted by `push` and rows are never removed, so every
    /// id handed out by this table is in bounds.
    #[inline]
    pub fn get(&self, id: I) -> &T {
        &self.entries[id.index()].value
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.entries[id.index()].value
    }

    #[inline]
    pub fn entry(&self, id: I) -> &Entry<T> {
        &self.entries[id.index()]
    }

    /// Most recent visible entry satisfying `pred`.
    pub fn find(
        &self,
        scopes: &Scopes,
        current: Option<BodyId>,
        mut pred: impl FnMut(&T) -> bool,
    ) -> Option<I> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| {
                !entry.out_of_scope && pred(&entry.value) && scopes.can_access(entry.body, current)
            })
            .map(|(idx, _)| I::from_index(idx))
    }

    /// All visible entries, most recent first.
    pub fn visible<'a>(
        &'a self,
        scopes: &'a Scopes,
        current: Option<BodyId>,
    ) -> impl Iterator<Item = I> + 'a {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .filter(move |(_, entry)| !entry.out_of_scope && scopes.can_access(entry.body, current))
            .map(|(idx, _)| I::from_index(idx))
    }

    /// Mark every entry owned by exactly `body` out of scope.
    pub fn clear_scope(&mut self, body: BodyId) -> usize {
        let mut cleared = 0;
        for entry in &mut self.entries {
            if entry.body == Some(body) && !entry.out_of_scope {
                entry.out_of_scope = true;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn mark_out_of_scope(&mut self, id: I) {
        self.entries[id.index()].out_of_scope = true;
    }

    /// Every row with its id, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &Entry<T>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (I::from_index(idx), entry))
    }
}

impl<I: EntryId, T> Default for Table<I, T> {
    fn default() -> Self {
        Self::new()
    }
}
