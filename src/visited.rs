//! Identity tracking for a single injection pass.

use std::any::TypeId;
use std::collections::HashSet;

use crate::di::Injectable;

/// Identity of an object reached during injection.
///
/// Borrowed objects are keyed by address plus concrete type, so an embedded
/// ancestor sharing its child's address is still told apart. Shared objects
/// are keyed by their allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Borrowed { addr: usize, ty: TypeId },
    Shared { addr: usize },
}

impl ObjectId {
    pub fn of(object: &dyn Injectable) -> Self {
        ObjectId::Borrowed {
            addr: object as *const _ as *const () as usize,
            ty: object.target_type(),
        }
    }
}

/// Set of identities already entered in the current pass.
///
/// Created fresh for every root call and dropped when it returns, so
/// unrelated calls never observe each other's entries.
#[derive(Debug, Default)]
pub struct VisitedSet(HashSet<ObjectId>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id`, returning `false` if it was already present.
    pub fn insert(&mut self, id: ObjectId) -> bool {
        self.0.insert(id)
    }
}
