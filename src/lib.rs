//! fieldwire - marker-driven field injection
//!
//! Scans an object's fields, including those of embedded ancestors, and
//! assigns every `#[inject]` field a value from a type-keyed [`Registry`].
//! Pre-populated fields and decorator payloads are injected recursively, and
//! each object is entered at most once per call.
//!
//! ```ignore
//! use std::sync::Arc;
//! use fieldwire::{Context, Injectable, Injector, Registry};
//!
//! #[derive(Injectable)]
//! struct Processor {
//!     #[inject]
//!     locator: Option<Arc<dyn Locator>>,
//! }
//!
//! let registry = Registry::builder()
//!     .instance(Arc::new(UrlLocator))
//!     .assignable_to(|l| l as Arc<dyn Locator>)
//!     .build()?;
//! let injector = Injector::new(registry);
//!
//! let mut processor = Processor { locator: None };
//! injector.inject(&mut processor, &Context::active("startup"))?;
//! ```

// Lets the derive macro's `::fieldwire` paths resolve inside this crate.
extern crate self as fieldwire;

pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod field;
pub mod injector;
pub mod registry;
pub mod visited;

pub use config::{ConfigError, InjectorConfig};
pub use context::Context;
pub use di::{Injectable, Scan, Shared, SharedTarget, Target};
pub use error::{InjectionError, SlotError};
pub use field::{all_fields, FieldDescriptor, Slot};
pub use injector::{Injector, InjectorBuilder};
pub use registry::{EntryBuilder, Registry, RegistryBuilder, Resolved, TypeKey};
pub use visited::{ObjectId, VisitedSet};
