//! The injector: scans targets and wires marked fields from the registry.

use std::sync::Arc;

use crate::config::InjectorConfig;
use crate::context::Context;
use crate::di::{Injectable, Shared, Target};
use crate::error::InjectionError;
use crate::field::{all_fields, FieldDescriptor};
use crate::registry::Registry;
use crate::visited::{ObjectId, VisitedSet};

/// Scans objects for `#[inject]` fields and assigns values from a [`Registry`].
///
/// For every object reached:
/// 1. an object already visited in this pass is skipped silently;
/// 2. each marked field is resolved against the registry (only while the
///    context is active) and assigned;
/// 3. an unresolved field that already holds a value is kept and its value
///    is injected recursively;
/// 4. an unresolved, empty field aborts the call with
///    [`InjectionError::UnsupportedFieldType`];
/// 5. finally the decorator payload, if any, is injected recursively.
///
/// Assignments made before a failure are not rolled back.
#[derive(Debug, Clone)]
pub struct Injector {
    registry: Arc<Registry>,
    config: InjectorConfig,
}

/// State of one root `inject` call.
struct Pass<'c> {
    ctx: &'c Context,
    visited: VisitedSet,
    depth: usize,
}

impl Injector {
    /// Creates an injector with the default configuration.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            registry: registry.into(),
            config: InjectorConfig::default(),
        }
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Injects every marked field reachable from `target`.
    pub fn inject(&self, target: &mut dyn Injectable, ctx: &Context) -> Result<(), InjectionError> {
        self.run(Target::Borrowed(target), ctx)
    }

    /// Locks a shared target and injects it.
    pub fn inject_shared<T: Injectable + ?Sized>(
        &self,
        target: &Shared<T>,
        ctx: &Context,
    ) -> Result<(), InjectionError> {
        self.run(Target::Shared(target), ctx)
    }

    fn run(&self, target: Target<'_>, ctx: &Context) -> Result<(), InjectionError> {
        let span = tracing::debug_span!("inject", context = %ctx.name());
        let _enter = span.enter();

        let mut pass = Pass {
            ctx,
            visited: VisitedSet::new(),
            depth: 0,
        };
        self.visit(target, &mut pass)
    }

    fn visit(&self, target: Target<'_>, pass: &mut Pass<'_>) -> Result<(), InjectionError> {
        match target {
            Target::Borrowed(object) => self.visit_object(object, pass),
            Target::Shared(shared) => {
                if !pass.visited.insert(shared.object_id()) {
                    tracing::trace!(id = ?shared.object_id(), "Shared target already injected");
                    return Ok(());
                }
                shared.with_target(&mut |object| self.visit_object(object, pass))
            }
        }
    }

    fn descend(&self, target: Target<'_>, pass: &mut Pass<'_>) -> Result<(), InjectionError> {
        pass.depth += 1;
        let result = self.visit(target, pass);
        pass.depth -= 1;
        result
    }

    fn visit_object(
        &self,
        object: &mut dyn Injectable,
        pass: &mut Pass<'_>,
    ) -> Result<(), InjectionError> {
        let owner = object.type_name();
        if !pass.visited.insert(ObjectId::of(object)) {
            tracing::trace!(target_type = owner, "Already injected, skipping");
            return Ok(());
        }
        if let Some(limit) = self.config.max_depth.filter(|limit| pass.depth > *limit) {
            tracing::error!(target_type = owner, limit, "Injection depth limit exceeded");
            return Err(InjectionError::DepthExceeded { limit, owner });
        }

        tracing::debug!(target_type = owner, depth = pass.depth, "Injecting");
        for field in all_fields(object) {
            self.accept(field, pass)?;
        }

        // Decorators are seen through even when they declare no marked fields.
        if let Some(payload) = object.decorated() {
            tracing::trace!(target_type = owner, "Descending into decorated payload");
            self.descend(payload, pass)?;
        }
        Ok(())
    }

    fn accept(&self, field: FieldDescriptor<'_>, pass: &mut Pass<'_>) -> Result<(), InjectionError> {
        let FieldDescriptor {
            owner, name, slot, ..
        } = field;
        let Some(slot) = slot else {
            return Ok(());
        };
        let declared = slot.declared_type();
        let populated = slot.is_populated();

        if pass.ctx.is_active() && !(populated && self.config.preserve_populated) {
            if let Some(value) = self.registry.resolve(declared) {
                slot.assign(value).map_err(|source| {
                    tracing::error!(
                        target_type = owner,
                        field = name,
                        error = %source,
                        "Failed to assign injected value"
                    );
                    InjectionError::AccessFailure {
                        target: format!("{}.{}", owner, name),
                        source,
                    }
                })?;
                tracing::trace!(target_type = owner, field = name, declared = %declared, "Injected field");
                return Ok(());
            }
        }

        if populated {
            if slot.is_opaque() {
                tracing::warn!(
                    target_type = owner,
                    field = name,
                    declared = %declared,
                    "Keeping pre-populated shared value without injecting its fields"
                );
                return Ok(());
            }
            tracing::trace!(target_type = owner, field = name, "Keeping pre-populated field");
            if let Some(existing) = slot.existing() {
                self.descend(existing, pass)?;
            }
            return Ok(());
        }

        let supported = self.registry.supported_types();
        tracing::error!(
            target_type = owner,
            field = name,
            declared = %declared,
            context_active = pass.ctx.is_active(),
            supported = ?supported,
            "#[inject] cannot be applied to field"
        );
        Err(InjectionError::UnsupportedFieldType {
            owner,
            field: name,
            declared: declared.name(),
            supported,
        })
    }
}

/// Builder for [`Injector`].
#[derive(Debug, Default)]
pub struct InjectorBuilder {
    registry: Option<Arc<Registry>>,
    config: Option<InjectorConfig>,
}

impl InjectorBuilder {
    pub fn registry(mut self, registry: impl Into<Arc<Registry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn config(mut self, config: InjectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration with [`InjectorConfig::load`].
    pub fn load_config(self) -> Result<Self, InjectionError> {
        Ok(self.config(InjectorConfig::load()?))
    }

    /// Builds the injector. A registry is required.
    pub fn build(self) -> Result<Injector, InjectionError> {
        let registry = self.registry.ok_or_else(|| {
            tracing::error!("Injector built without a registry");
            InjectionError::InvalidArgument("a registry is required".to_string())
        })?;
        Ok(Injector {
            registry,
            config: self.config.unwrap_or_default(),
        })
    }
}
