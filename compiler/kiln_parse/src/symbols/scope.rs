//! Lexical body arena.

use super::{BodyId, EntryId, TableError};

/// Parent links of every body ever opened. Bodies are never removed, so
/// ids stay valid for the whole parse.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    parents: Vec<Option<BodyId>>,
}

impl Scopes {
    /// Open a body nested in `parent` (`None` for a top-level body).
    pub fn new_body(&mut self, parent: Option<BodyId>) -> Result<BodyId, TableError> {
        self.parents.try_reserve(1)?;
        let id = BodyId::from_index(self.parents.len());
        self.parents.push(parent);
        Ok(id)
    }

    pub fn parent(&self, body: BodyId) -> Option<BodyId> {
        self.parents.get(body.index()).copied().flatten()
    }

    /// Whether an entry owned by `target` is visible from `current`:
    /// global entries always are, others when `target` is `current` or
    /// one of its ancestors.
    pub fn can_access(&self, target: Option<BodyId>, current: Option<BodyId>) -> bool {
        let Some(target) = target else {
            return true;
        };
        let mut body = current;
        while let Some(id) = body {
            if id == target {
                return true;
            }
            body = self.parent(id);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
