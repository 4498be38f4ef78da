use descriptor::{QueryExecutor, QueryGenerator, ResultConverter, ResultValidator, Strategy};
use std::collections::HashMap;

/// A read-only lookup table from convention keys to strategies.
///
/// Built once at startup through [`RegistryBuilder`]; it is never mutated
/// afterwards, so it is shared by `Arc` and read without locks.
pub struct StrategyRegistry<S: ?Sized> {
    kind: &'static str,
    by_key: HashMap<String, Strategy<S>>,
    by_name: HashMap<String, Strategy<S>>,
}

pub type ExecutorRegistry = StrategyRegistry<dyn QueryExecutor>;
pub type ConverterRegistry = StrategyRegistry<dyn ResultConverter>;
pub type GeneratorRegistry = StrategyRegistry<dyn QueryGenerator>;
pub type ValidatorRegistry = StrategyRegistry<dyn ResultValidator>;

impl<S: ?Sized> StrategyRegistry<S> {
    pub fn builder(kind: &'static str) -> RegistryBuilder<S> {
        RegistryBuilder {
            kind,
            by_key: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// What this registry holds ("executor", "converter", ...), for diagnostics.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Looks a strategy up by convention key.
    pub fn get(&self, key: &str) -> Option<&Strategy<S>> {
        self.by_key.get(key)
    }

    /// Looks a strategy up by its own name, as written in manifests.
    pub fn named(&self, name: &str) -> Option<&Strategy<S>> {
        self.by_name.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

pub struct RegistryBuilder<S: ?Sized> {
    kind: &'static str,
    by_key: HashMap<String, Strategy<S>>,
    by_name: HashMap<String, Strategy<S>>,
}

impl<S: ?Sized> RegistryBuilder<S> {
    /// Maps `key` to `strategy`, replacing any earlier entry for that key.
    pub fn register(mut self, key: impl Into<String>, strategy: Strategy<S>) -> Self {
        let key = key.into();
        if let Some(previous) = self.by_key.get(&key) {
            tracing::debug!(
                kind = self.kind,
                key = %key,
                replaced = previous.name(),
                with = strategy.name(),
                "Replacing registry entry"
            );
        }
        self.by_name
            .insert(strategy.name().to_string(), strategy.clone());
        self.by_key.insert(key, strategy);
        self
    }

    /// Maps every key in `keys` to the same strategy.
    pub fn register_all(mut self, keys: &[&str], strategy: Strategy<S>) -> Self {
        for key in keys {
            self = self.register(*key, strategy.clone());
        }
        self
    }

    /// Makes a strategy resolvable by name without binding it to a key.
    pub fn declare(mut self, strategy: Strategy<S>) -> Self {
        self.by_name
            .insert(strategy.name().to_string(), strategy);
        self
    }

    pub fn build(self) -> StrategyRegistry<S> {
        tracing::debug!(kind = self.kind, keys = self.by_key.len(), "Registry built");
        StrategyRegistry {
            kind: self.kind,
            by_key: self.by_key,
            by_name: self.by_name,
        }
    }
}
