//! Module loading and handler resolution
//!
//! The [`LoadContext`] serves runtime-provided modules directly and defers everything
//! else to a resolving hook. The hook used by the bootstrap, [`TaskRootResolver`],
//! only hands out modules that are deployed under the task root.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::handler::{HandlerReference, Module, ModuleCatalog, ResolvedHandler};

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Handler identifier '{0}' is malformed, expected 'Module::Type::method' or 'Module::function'")]
    Malformed(String),

    #[error("Could not find module '{0}' in the default context or the task root")]
    ModuleNotFound(String),

    #[error("Could not load dependency '{dependency}' of module '{module}'")]
    DependencyNotFound {
        module: String,
        dependency: String,
        #[source]
        source: Box<ResolutionError>,
    },

    #[error("Entry point '{entry_point}' not found in module '{module}'")]
    EntryPointNotFound { module: String, entry_point: String },

    #[error("A resolving hook is already registered")]
    HookAlreadyRegistered,
}

/// Fallback consulted when a module is not in the default context
///
/// May be called once per unresolved module during a single load, so implementations
/// must be idempotent and free of side effects.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<Module>>;
}

/// Resolves a module by probing `<task-root>/<name>`
pub struct TaskRootResolver {
    task_root: PathBuf,
    catalog: Arc<ModuleCatalog>,
}

impl TaskRootResolver {
    pub fn new(task_root: impl Into<PathBuf>, catalog: Arc<ModuleCatalog>) -> Self {
        Self {
            task_root: task_root.into(),
            catalog,
        }
    }
}

impl ModuleResolver for TaskRootResolver {
    fn resolve(&self, name: &str) -> Option<Arc<Module>> {
        // A module name is a single path component
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return None;
        }

        let path = self.task_root.join(name);
        if !path.exists() {
            debug!(path = %path.display(), "Module not present in task root");
            return None;
        }

        let module = self.catalog.get(name);
        if module.is_none() {
            debug!(path = %path.display(), "Task root entry has no matching module in the catalog");
        }
        module
    }
}

/// Loaded modules plus the resolving hook, one per process
pub struct LoadContext {
    catalog: Arc<ModuleCatalog>,
    loaded: DashMap<String, Arc<Module>>,
    resolving: OnceCell<Arc<dyn ModuleResolver>>,
}

impl LoadContext {
    pub fn new(catalog: Arc<ModuleCatalog>) -> Self {
        Self {
            catalog,
            loaded: DashMap::new(),
            resolving: OnceCell::new(),
        }
    }

    pub fn with_resolver(catalog: Arc<ModuleCatalog>, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            catalog,
            loaded: DashMap::new(),
            resolving: OnceCell::with_value(resolver),
        }
    }

    /// Register the resolving hook. Only the first registration takes effect.
    pub fn on_resolving(&self, resolver: Arc<dyn ModuleResolver>) -> Result<(), ResolutionError> {
        self.resolving
            .set(resolver)
            .map_err(|_| ResolutionError::HookAlreadyRegistered)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Load a module and, transitively, its dependencies
    pub fn load(&self, name: &str) -> Result<Arc<Module>, ResolutionError> {
        if let Some(module) = self.loaded.get(name) {
            return Ok(module.clone());
        }

        let module = self
            .find(name)
            .ok_or_else(|| ResolutionError::ModuleNotFound(name.to_string()))?;

        // Cached before the dependencies so that cycles terminate
        self.loaded.insert(name.to_string(), module.clone());

        for dependency in module.dependencies() {
            if let Err(e) = self.load(dependency) {
                self.loaded.remove(name);
                return Err(ResolutionError::DependencyNotFound {
                    module: name.to_string(),
                    dependency: dependency.clone(),
                    source: Box::new(e),
                });
            }
        }

        debug!(module = %name, "Loaded module");
        Ok(module)
    }

    fn find(&self, name: &str) -> Option<Arc<Module>> {
        if let Some(module) = self.catalog.get(name).filter(|m| m.is_runtime_provided()) {
            return Some(module);
        }

        let resolver = self.resolving.get()?;
        debug!(module = %name, "Module not in default context, firing resolving hook");
        resolver.resolve(name)
    }
}

/// Resolves handler identifiers to entry points
pub struct HandlerLocator {
    context: Arc<LoadContext>,
}

impl HandlerLocator {
    pub fn new(context: Arc<LoadContext>) -> Self {
        Self { context }
    }

    #[tracing::instrument(skip(self))]
    pub fn locate(&self, identifier: &str) -> Result<ResolvedHandler, ResolutionError> {
        let reference: HandlerReference = identifier.parse()?;
        let module = self.context.load(&reference.module)?;

        let entry_point = reference.entry_point();
        let handler = module
            .entry_point(&entry_point)
            .ok_or_else(|| ResolutionError::EntryPointNotFound {
                module: reference.module.clone(),
                entry_point,
            })?;

        Ok(ResolvedHandler::new(reference, handler))
    }
}
