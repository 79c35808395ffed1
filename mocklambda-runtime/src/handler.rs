//! Handler identifiers, modules and the module catalog
//!
//! A handler identifier names a module and an entry point inside it:
//! `Module::Type::method` or `Module::function`. Modules are compiled into the binary
//! and listed in a [`ModuleCatalog`]; the loader decides which of them are reachable.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::lambda_context::LambdaContext;
use crate::loader::ResolutionError;

/// Entry point signature: request body in, response bytes out
pub type HandlerFn =
    dyn Fn(&mut dyn Read, &mut dyn Write, &LambdaContext) -> anyhow::Result<()> + Send + Sync;

const DELIMITER: &str = "::";

/// Parsed handler identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerReference {
    pub module: String,
    pub type_name: Option<String>,
    pub method: String,
}

impl HandlerReference {
    /// Key of the entry point inside its module
    pub fn entry_point(&self) -> String {
        match &self.type_name {
            Some(type_name) => format!("{type_name}{DELIMITER}{}", self.method),
            None => self.method.clone(),
        }
    }
}

impl FromStr for HandlerReference {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(ResolutionError::Malformed(s.to_string()));
        }

        match parts.as_slice() {
            [module, function] => Ok(Self {
                module: (*module).to_string(),
                type_name: None,
                method: (*function).to_string(),
            }),
            [module, type_name, method] => Ok(Self {
                module: (*module).to_string(),
                type_name: Some((*type_name).to_string()),
                method: (*method).to_string(),
            }),
            _ => Err(ResolutionError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.module, self.entry_point())
    }
}

/// A loadable code unit
pub struct Module {
    name: String,
    dependencies: Vec<String>,
    runtime_provided: bool,
    entry_points: HashMap<String, Arc<HandlerFn>>,
}

impl Module {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            module: Module {
                name: name.into(),
                dependencies: Vec::new(),
                runtime_provided: false,
                entry_points: HashMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Runtime-provided modules load without probing the task root
    pub fn is_runtime_provided(&self) -> bool {
        self.runtime_provided
    }

    pub fn entry_point(&self, key: &str) -> Option<Arc<HandlerFn>> {
        self.entry_points.get(key).cloned()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entry_points: Vec<&String> = self.entry_points.keys().collect();
        entry_points.sort();

        f.debug_struct("Module")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("runtime_provided", &self.runtime_provided)
            .field("entry_points", &entry_points)
            .finish()
    }
}

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    #[must_use]
    pub fn depends_on(mut self, module: impl Into<String>) -> Self {
        self.module.dependencies.push(module.into());
        self
    }

    #[must_use]
    pub fn runtime_provided(mut self) -> Self {
        self.module.runtime_provided = true;
        self
    }

    /// Register an entry point under `Type::method` or a bare function name
    #[must_use]
    pub fn entry_point<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut dyn Read, &mut dyn Write, &LambdaContext) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.module.entry_points.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}

/// Every module linked into the binary, by name
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, Arc<Module>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.register(module);
        self
    }

    pub fn register(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), Arc::new(module));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// An entry point located in a loaded module
#[derive(Clone)]
pub struct ResolvedHandler {
    pub reference: HandlerReference,
    handler: Arc<HandlerFn>,
}

impl ResolvedHandler {
    pub fn new(reference: HandlerReference, handler: Arc<HandlerFn>) -> Self {
        Self { reference, handler }
    }

    pub fn call(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        context: &LambdaContext,
    ) -> anyhow::Result<()> {
        (self.handler)(input, output, context)
    }

    /// Whether both resolve to the same entry point
    pub fn same_entry_point(&self, other: &ResolvedHandler) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}
