//! Ordered, type-keyed registry of injectable values.
//!
//! Each entry maps a key type to a provider: either a ready instance, cloned
//! on every resolution, or a factory invoked on every resolution. An entry may
//! also declare the wider types its values are assignable to, such as
//! `Arc<Impl>` → `Arc<dyn Trait>`. Lookup walks entries in insertion order and
//! the first entry assignable to the requested type wins.
//!
//! # Example
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .instance(Arc::new(ClasspathLocator::default()))
//!     .assignable_to(|l| l as Arc<dyn Locator>)
//!     .factory(|| Arc::new(Cache::new()))
//!     .build()?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::marker::PhantomData;

use crate::error::InjectionError;

/// Runtime descriptor of a Rust type.
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A value produced by the registry for a requested type.
pub struct Resolved {
    value: Box<dyn Any + Send>,
    key: TypeKey,
}

impl Resolved {
    pub fn new(value: Box<dyn Any + Send>, key: TypeKey) -> Self {
        Self { value, key }
    }

    /// Name of the type the value was produced as.
    pub fn type_name(&self) -> &'static str {
        self.key.name()
    }

    pub fn into_inner(self) -> Box<dyn Any + Send> {
        self.value
    }

    /// Recovers the typed value.
    pub fn downcast<T: 'static>(self) -> Option<T> {
        self.value.downcast::<T>().ok().map(|value| *value)
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Resolved").field(&self.key.name()).finish()
    }
}

/// How an entry produces its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderKind {
    /// A ready value, cloned on each resolution.
    Instance,
    /// A zero-argument factory, invoked on each resolution.
    Factory,
}

type Produce = Box<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;
type Widen = Box<dyn Fn(Box<dyn Any + Send>) -> Option<Box<dyn Any + Send>> + Send + Sync>;

struct RegistryEntry {
    key: TypeKey,
    kind: ProviderKind,
    produce: Produce,
    widened: Vec<(TypeKey, Widen)>,
}

impl RegistryEntry {
    /// Produces a value as `declared` if this entry is assignable to it.
    fn produce_as(&self, declared: TypeKey) -> Option<Box<dyn Any + Send>> {
        if self.key == declared {
            return Some((self.produce)());
        }
        let (_, widen) = self.widened.iter().find(|(key, _)| *key == declared)?;
        let value = widen((self.produce)());
        if value.is_none() {
            tracing::warn!(
                key = %self.key,
                declared = %declared,
                "Registry entry produced a value its widening cast could not accept"
            );
        }
        value
    }
}

/// Immutable type-keyed registry. Safe to share across threads once built.
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolves a value for `declared`.
    ///
    /// Walks the entries in insertion order; the first one whose key equals
    /// `declared`, or that was declared assignable to it, produces the value.
    /// Factories run fresh on every call. `None` means no entry matched.
    pub fn resolve(&self, declared: TypeKey) -> Option<Resolved> {
        self.entries.iter().find_map(|entry| {
            let value = entry.produce_as(declared)?;
            tracing::trace!(
                declared = %declared,
                key = %entry.key,
                kind = ?entry.kind,
                "Resolved from registry"
            );
            Some(Resolved::new(value, declared))
        })
    }

    /// Typed shortcut for [`resolve`](Self::resolve).
    pub fn get<T: 'static>(&self) -> Option<T> {
        self.resolve(TypeKey::of::<T>())?.downcast()
    }

    /// Registered key types in insertion order.
    pub fn supported_types(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.key.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.key.name(), entry.kind)))
            .finish()
    }
}

/// Builder collecting registry entries in order.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<RegistryEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready value; each resolution hands out a clone.
    pub fn instance<T: Clone + Send + Sync + 'static>(self, value: T) -> EntryBuilder<T> {
        let produce: Produce = Box::new(move || Box::new(value.clone()) as Box<dyn Any + Send>);
        self.entry::<T>(ProviderKind::Instance, produce)
    }

    /// Registers a factory; each resolution produces a new value.
    pub fn factory<T, F>(self, factory: F) -> EntryBuilder<T>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let produce: Produce = Box::new(move || Box::new(factory()) as Box<dyn Any + Send>);
        self.entry::<T>(ProviderKind::Factory, produce)
    }

    fn entry<T: 'static>(self, kind: ProviderKind, produce: Produce) -> EntryBuilder<T> {
        EntryBuilder {
            builder: self,
            entry: RegistryEntry {
                key: TypeKey::of::<T>(),
                kind,
                produce,
                widened: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Finishes the registry. Registering the same key type twice is an error.
    pub fn build(self) -> Result<Registry, InjectionError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key) {
                tracing::error!(key = %entry.key, "Type registered more than once");
                return Err(InjectionError::DuplicateRegistration(entry.key.name()));
            }
        }
        tracing::debug!(entries = self.entries.len(), "Built injection registry");
        Ok(Registry {
            entries: self.entries,
        })
    }
}

/// An entry being registered; widen it or move on to the next one.
pub struct EntryBuilder<T> {
    builder: RegistryBuilder,
    entry: RegistryEntry,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> EntryBuilder<T> {
    /// Declares the entry assignable to `U`, converting values with `cast`.
    ///
    /// Fields declared as `U` are then served by this entry.
    pub fn assignable_to<U: Send + 'static>(mut self, cast: fn(T) -> U) -> Self {
        let widen: Widen = Box::new(move |value: Box<dyn Any + Send>| {
            let value = value.downcast::<T>().ok()?;
            Some(Box::new(cast(*value)) as Box<dyn Any + Send>)
        });
        self.entry.widened.push((TypeKey::of::<U>(), widen));
        self
    }

    /// Commits this entry and returns the underlying builder.
    pub fn done(self) -> RegistryBuilder {
        let mut builder = self.builder;
        builder.entries.push(self.entry);
        builder
    }

    pub fn instance<V: Clone + Send + Sync + 'static>(self, value: V) -> EntryBuilder<V> {
        self.done().instance(value)
    }

    pub fn factory<V, F>(self, factory: F) -> EntryBuilder<V>
    where
        V: Send + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.done().factory(factory)
    }

    pub fn build(self) -> Result<Registry, InjectionError> {
        self.done().build()
    }
}
