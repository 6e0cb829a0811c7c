pub mod builtin;
pub mod stats;

use crate::{error::Result, value::Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use builtin::Reduction;

/// A function callable from a formula.
pub trait Function: Send + Sync {
    /// Invoke the function with already evaluated arguments.
    fn call(&self, args: &[Value]) -> Result<Value>;
}

impl<F> Function for F
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value> {
        self(args)
    }
}

pub type DynFunction = Arc<dyn Function>;

/// Collects functions during start-up. The first registration of a name wins.
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    functions: HashMap<String, DynFunction>,
}

impl FunctionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        Self::new().install_builtins()
    }

    /// Registers `function` under `name` unless the name is already taken.
    /// Returns whether the function was inserted.
    pub fn register(&mut self, name: impl Into<String>, function: DynFunction) -> bool {
        let name = name.into();
        if self.functions.contains_key(&name) {
            debug!("Function '{}' already registered, keeping the first", name);
            return false;
        }
        self.functions.insert(name, function);
        true
    }

    /// Adds the built-in reductions without replacing names registered earlier.
    pub fn install_builtins(mut self) -> Self {
        for reduction in builtin::builtins() {
            self.register(reduction.name(), Arc::new(reduction));
        }
        self
    }

    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            functions: self.functions,
        }
    }
}

/// Immutable name to function table shared by every evaluator.
pub struct FunctionRegistry {
    functions: HashMap<String, DynFunction>,
}

impl FunctionRegistry {
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::new()
    }

    pub fn with_builtins() -> Self {
        FunctionRegistryBuilder::with_builtins().build()
    }

    pub fn get(&self, name: &str) -> Option<&DynFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64) -> DynFunction {
        Arc::new(move |_: &[Value]| -> Result<Value> { Ok(Value::Scalar(value)) })
    }

    #[test]
    fn test_registry_with_builtins() {
        let registry = FunctionRegistry::with_builtins();
        for name in ["mean", "max", "min", "std", "sum", "count", "median"] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
        assert_eq!(registry.names()[0], "count");
    }

    #[test]
    fn test_first_registration_wins() {
        let mut builder = FunctionRegistry::builder();
        assert!(builder.register("answer", constant(42.0)));
        assert!(!builder.register("answer", constant(7.0)));

        let registry = builder.build();
        let result = registry.get("answer").unwrap().call(&[]).unwrap();
        assert_eq!(result, Value::Scalar(42.0));
    }

    #[test]
    fn test_builtins_do_not_clobber_overrides() {
        let mut builder = FunctionRegistry::builder();
        builder.register("mean", constant(-1.0));
        let registry = builder.install_builtins().build();

        let result = registry
            .get("mean")
            .unwrap()
            .call(&[Value::Vector(vec![1.0, 2.0])])
            .unwrap();
        assert_eq!(result, Value::Scalar(-1.0));
        assert!(registry.contains("max"));
    }

    #[test]
    fn test_empty_builder() {
        let registry = FunctionRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.get("mean").is_none());
    }
}
