use core_types::{CompiledProcedure, DispatchError, ProcedureDeclaration};
use descriptor::MethodDescriptor;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<CompiledProcedure>>>;

/// Process-lifetime store of compiled procedures, keyed by call site.
///
/// The map lock is only held to find or insert a key's slot; compilation runs
/// on the slot itself, so compiling one key never waits on another. Entries
/// are never evicted.
#[derive(Default)]
pub struct ProcedureCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl ProcedureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Returns the cached procedure for `key`, running `compile` only when
    /// none is cached yet.
    ///
    /// Concurrent first callers for the same key share one compilation and
    /// receive the same `Arc`. A failed compilation is not cached.
    pub async fn get_or_compile<F, Fut>(
        &self,
        key: &str,
        compile: F,
    ) -> Result<Arc<CompiledProcedure>, DispatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CompiledProcedure, DispatchError>>,
    {
        let slot = self.slot(key);
        let compiled = slot
            .get_or_try_init(|| async {
                tracing::debug!(key, "Compiling procedure for the cache");
                compile().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(compiled))
    }

    pub fn get(&self, key: &str) -> Option<Arc<CompiledProcedure>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The cache key of a procedure call site.
///
/// Qualified keys are `procedure@DeclaringType::method`. Unqualified keys
/// carry the ordered parameter signature instead, so call sites sharing a
/// procedure name only share a compiled call when they declare it alike.
pub fn cache_key(
    method: &MethodDescriptor,
    declaration: &ProcedureDeclaration,
    qualify: bool,
) -> String {
    if qualify {
        return format!("{}@{}", declaration.name, method.qualified_name());
    }
    let signature: Vec<String> = declaration
        .parameters
        .iter()
        .map(|p| format!("{} {} {}", p.kind, p.name, p.sql_type.pg_name()))
        .collect();
    let kind = if declaration.function { "function" } else { "procedure" };
    format!("{kind} {}({})", declaration.name, signature.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ParamDescriptor, SqlType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn compiled(name: &str) -> CompiledProcedure {
        CompiledProcedure::new(
            ProcedureDeclaration {
                name: name.to_string(),
                function: false,
                parameters: Vec::new(),
            },
            format!("CALL {name}()"),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_use_compiles_once() {
        let cache = Arc::new(ProcedureCache::new());
        let compiles = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let compiles = Arc::clone(&compiles);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compile("p_result", || async move {
                        compiles.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(compiled("p_result"))
                    })
                    .await
                    .unwrap()
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(compiles.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn compiling_one_key_does_not_block_another() {
        let cache = Arc::new(ProcedureCache::new());
        let (release, hold) = tokio::sync::oneshot::channel::<()>();

        let slow_cache = Arc::clone(&cache);
        let slow = tokio::spawn(async move {
            slow_cache
                .get_or_compile("slow", || async move {
                    let _ = hold.await;
                    Ok(compiled("slow"))
                })
                .await
        });

        let fast = tokio::time::timeout(
            Duration::from_secs(2),
            cache.get_or_compile("fast", || async { Ok(compiled("fast")) }),
        )
        .await
        .expect("fast key waited on the slow one");
        assert!(fast.is_ok());

        release.send(()).unwrap();
        assert!(slow.await.unwrap().is_ok());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failed_compilation_is_retried() {
        let cache = ProcedureCache::new();
        let failed = cache
            .get_or_compile("p", || async {
                Err(DispatchError::configuration("P::p", "broken"))
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.get("p").is_none());

        let retried = cache.get_or_compile("p", || async { Ok(compiled("p")) }).await;
        assert!(retried.is_ok());
        assert!(cache.get("p").is_some());
    }

    fn declared(parameters: Vec<ParamDescriptor>) -> ProcedureDeclaration {
        ProcedureDeclaration {
            name: "p_result".to_string(),
            function: false,
            parameters,
        }
    }

    #[test]
    fn keys_are_qualified_by_call_site() {
        let method = MethodDescriptor::builder("ProcDao", "callResult").build();
        let declaration = declared(vec![ParamDescriptor::output("p_result", SqlType::Varchar)]);
        assert_eq!(cache_key(&method, &declaration, true), "p_result@ProcDao::callResult");
        assert_eq!(
            cache_key(&method, &declaration, false),
            "procedure p_result(OUT p_result varchar)"
        );
    }

    #[test]
    fn unqualified_keys_differ_by_parameter_signature() {
        let method = MethodDescriptor::builder("ProcDao", "callResult").build();
        let text = declared(vec![
            ParamDescriptor::input("p_string", SqlType::Varchar),
            ParamDescriptor::output("p_result", SqlType::Varchar),
        ]);
        let number = declared(vec![
            ParamDescriptor::input("p_integer", SqlType::Integer),
            ParamDescriptor::output("p_result", SqlType::Varchar),
        ]);
        let reordered = declared(vec![
            ParamDescriptor::output("p_result", SqlType::Varchar),
            ParamDescriptor::input("p_string", SqlType::Varchar),
        ]);
        let key = |d: &ProcedureDeclaration| cache_key(&method, d, false);
        assert_ne!(key(&text), key(&number));
        assert_ne!(key(&text), key(&reordered));
        assert_eq!(key(&text), key(&text.clone()));
    }
}
