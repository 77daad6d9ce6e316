//! Field descriptors and the slot abstraction behind `#[inject]` fields.

use std::any::type_name;

use crate::di::{Injectable, Scan, Target};
use crate::error::SlotError;
use crate::registry::{Resolved, TypeKey};

/// One data member of an injection target.
///
/// Only fields carrying the injection marker have a slot; the rest are
/// listed for completeness and log output.
pub struct FieldDescriptor<'a> {
    /// Name of the type that declares the field.
    pub owner: &'static str,
    pub name: &'static str,
    /// Full field type as written, e.g. `Option<Arc<dyn Locator>>`.
    pub type_name: &'static str,
    pub slot: Option<&'a mut dyn Slot>,
}

impl<'a> FieldDescriptor<'a> {
    /// A field carrying `#[inject]`.
    pub fn marked<S: Slot + 'a>(owner: &'static str, name: &'static str, slot: &'a mut S) -> Self {
        Self {
            owner,
            name,
            type_name: type_name::<S>(),
            slot: Some(slot),
        }
    }

    /// A field without the marker.
    pub fn unmarked<T: ?Sized>(owner: &'static str, name: &'static str) -> Self {
        Self {
            owner,
            name,
            type_name: type_name::<T>(),
            slot: None,
        }
    }

    pub fn is_marked(&self) -> bool {
        self.slot.is_some()
    }

    /// Declared injection type of a marked field.
    pub fn declared_type(&self) -> Option<TypeKey> {
        self.slot.as_ref().map(|slot| slot.declared_type())
    }
}

impl std::fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("marked", &self.is_marked())
            .finish()
    }
}

/// Storage of an injectable field.
///
/// `Option<T>` is the slot type: `None` means "not wired yet". `T` is the
/// declared type matched against the registry.
pub trait Slot: Send {
    fn declared_type(&self) -> TypeKey;

    fn is_populated(&self) -> bool;

    fn assign(&mut self, value: Resolved) -> Result<(), SlotError>;

    /// The current value as a nested target, if it is populated and scannable.
    fn existing(&mut self) -> Option<Target<'_>>;

    /// Populated with a value whose own fields cannot be injected.
    fn is_opaque(&self) -> bool;
}

impl<T: Scan + Send + 'static> Slot for Option<T> {
    fn declared_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn is_populated(&self) -> bool {
        self.is_some()
    }

    fn assign(&mut self, value: Resolved) -> Result<(), SlotError> {
        let found = value.type_name();
        let value = value
            .into_inner()
            .downcast::<T>()
            .map_err(|_| SlotError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            })?;
        *self = Some(*value);
        Ok(())
    }

    fn existing(&mut self) -> Option<Target<'_>> {
        self.as_mut().and_then(Scan::target)
    }

    fn is_opaque(&self) -> bool {
        Scan::is_opaque(self)
    }
}

/// Returns every field of `target`, including inherited ones.
///
/// Own fields come first in declaration order, followed by each ancestor's
/// fields from most-derived to least-derived.
pub fn all_fields(target: &mut dyn Injectable) -> Vec<FieldDescriptor<'_>> {
    let owner = target.type_name();
    let fields = target.fields();
    tracing::trace!(
        target_type = owner,
        total = fields.len(),
        marked = fields.iter().filter(|f| f.is_marked()).count(),
        "Scanned fields"
    );
    fields
}
