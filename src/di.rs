//! Injection capability traits.
//!
//! This module defines what the [`Injector`](crate::Injector) needs from the
//! objects it wires, plus the derive macro from `di-macros` that writes those
//! impls for plain structs.
//!
//! # Overview
//!
//! - [`Injectable`]: an object whose fields can be scanned and assigned
//! - [`Scan`]: a field value that may itself be an injection target
//! - [`Target`]: a borrowed or shared object handed to the injector
//! - [`Shared`]: `Arc<Mutex<T>>` handle for graphs with shared or cyclic edges
//! - `#[derive(Injectable)]`: generates the field walk from `#[inject]` markers
//!
//! # Example
//!
//! ```ignore
//! use fieldwire::Injectable;
//!
//! #[derive(Injectable)]
//! struct BaseProcessor {
//!     #[inject]
//!     locator: Option<Arc<dyn Locator>>,
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(decorates = inner)]
//! struct MinifyingProcessor {
//!     #[inject(parent)]
//!     base: BaseProcessor,
//!     #[inject]
//!     cache: Option<Arc<Cache>>,
//!     inner: Box<dyn Processor>,
//! }
//! ```

use std::any::{Any, TypeId};
use std::sync::{Arc, LockResult, Mutex, MutexGuard};

use crate::error::{InjectionError, SlotError};
use crate::field::FieldDescriptor;
use crate::visited::ObjectId;

// Re-export derive macro
pub use di_macros::Injectable;

/// An object whose marked fields can be wired by the injector.
///
/// The derive macro implements this for structs with named fields. Manual
/// impls are a few lines: list the fields and return `self` from
/// [`as_injectable_mut`](Injectable::as_injectable_mut).
pub trait Injectable: Any + Send {
    /// All field descriptors of this object: own fields first, then every
    /// ancestor's, most-derived to least-derived.
    fn fields(&mut self) -> Vec<FieldDescriptor<'_>>;

    /// The wrapped payload, if this object is a decorator.
    fn decorated(&mut self) -> Option<Target<'_>> {
        None
    }

    fn as_injectable_mut(&mut self) -> &mut dyn Injectable;

    fn target_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An object reachable by the injector.
pub enum Target<'a> {
    /// Exclusively borrowed; identity is its address and concrete type.
    Borrowed(&'a mut dyn Injectable),
    /// Behind a lock; identity is checked before the lock is taken.
    Shared(&'a dyn SharedTarget),
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Borrowed(object) => f.debug_tuple("Borrowed").field(&object.type_name()).finish(),
            Target::Shared(shared) => f.debug_tuple("Shared").field(&shared.object_id()).finish(),
        }
    }
}

/// A lockable injection target.
pub trait SharedTarget: Send + Sync {
    fn object_id(&self) -> ObjectId;

    /// Locks the target and runs `f` on it.
    fn with_target(
        &self,
        f: &mut dyn FnMut(&mut dyn Injectable) -> Result<(), InjectionError>,
    ) -> Result<(), InjectionError>;
}

/// Shared, mutable handle to an injectable object.
pub struct Shared<T: ?Sized>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }
}

impl<T: ?Sized> Shared<T> {
    /// Wraps an existing handle, e.g. an `Arc<Mutex<dyn Trait>>`.
    pub fn from_arc(inner: Arc<Mutex<T>>) -> Self {
        Self(inner)
    }

    pub fn into_arc(self) -> Arc<Mutex<T>> {
        self.0
    }

    pub fn lock(&self) -> LockResult<MutexGuard<'_, T>> {
        self.0.lock()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shared<{}>({:p})", std::any::type_name::<T>(), Arc::as_ptr(&self.0))
    }
}

impl<T: Injectable + ?Sized> SharedTarget for Shared<T> {
    fn object_id(&self) -> ObjectId {
        ObjectId::Shared {
            addr: Arc::as_ptr(&self.0) as *const () as usize,
        }
    }

    fn with_target(
        &self,
        f: &mut dyn FnMut(&mut dyn Injectable) -> Result<(), InjectionError>,
    ) -> Result<(), InjectionError> {
        let mut guard = self.0.lock().map_err(|_| {
            let target = format!("Shared<{}>", std::any::type_name::<T>());
            tracing::error!(target_type = %target, "Shared injection target is poisoned");
            InjectionError::AccessFailure {
                target,
                source: SlotError::Poisoned,
            }
        })?;
        f(guard.as_injectable_mut())
    }
}

/// A field value the injector may descend into once it is populated.
///
/// Implemented by the derive macro for every `Injectable` struct, for
/// `Box<T>` and [`Shared<T>`] of injectable types, and as a leaf (never
/// scanned) for `Arc<T>` and common value types. Use [`impl_leaf!`] for
/// other value types.
///
/// [`impl_leaf!`]: crate::impl_leaf
pub trait Scan {
    fn target(&mut self) -> Option<Target<'_>>;

    /// Whether the value may hold injectable state that cannot be reached
    /// mutably. Such values are kept as they are and their fields are left
    /// untouched.
    fn is_opaque(&self) -> bool {
        false
    }
}

impl<T: Scan> Scan for Option<T> {
    fn target(&mut self) -> Option<Target<'_>> {
        self.as_mut().and_then(Scan::target)
    }

    fn is_opaque(&self) -> bool {
        self.as_ref().is_some_and(Scan::is_opaque)
    }
}

impl<T: Injectable + ?Sized> Scan for Box<T> {
    fn target(&mut self) -> Option<Target<'_>> {
        Some(Target::Borrowed((**self).as_injectable_mut()))
    }
}

impl<T: Injectable + ?Sized> Scan for Shared<T> {
    fn target(&mut self) -> Option<Target<'_>> {
        Some(Target::Shared(&*self))
    }
}

// An Arc hands out shared references only, so there is nothing to assign.
// Use `Shared<T>` for injectable values that are shared.
impl<T: ?Sized + Send + Sync> Scan for Arc<T> {
    fn target(&mut self) -> Option<Target<'_>> {
        None
    }

    fn is_opaque(&self) -> bool {
        true
    }
}

/// Declares value types that are injected as-is and never scanned.
///
/// ```ignore
/// fieldwire::impl_leaf!(Url, Duration);
/// ```
#[macro_export]
macro_rules! impl_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
        impl $crate::Scan for $ty {
            fn target(&mut self) -> ::std::option::Option<$crate::Target<'_>> {
                ::std::option::Option::None
            }
        }
        )+
    };
}

impl_leaf!(
    String,
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    usize,
    i8,
    i16,
    i32,
    i64,
    isize,
    f32,
    f64,
    std::time::Duration,
    std::path::PathBuf,
);
