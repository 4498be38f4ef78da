use crate::error::EngineError;
use crate::pipeline::{ConversionPipeline, ResultEnvelope};
use crate::procedure::{bind_inputs, extract_result};
use crate::query::prepare_query;
use crate::registries::Registries;
use crate::wrapper::ExecutionWrapper;
use configuration::{Config, compile_pattern};
use core_types::{
    CompiledProcedure, DataAccessSession, DispatchError, TransactionalBoundary, UnitOfWork, Value,
};
use descriptor::MethodDescriptor;
use procedures::{
    ProcedureCache, cache_key, compile_declared, compile_procedure, declare_procedure,
};
use std::sync::Arc;
use strategies::{ExecutorFinder, GeneratorFinder, factory};

/// The entry point for every intercepted data-access call.
///
/// A dispatcher owns the resolved finders, the procedure cache and the
/// collaborators. It is cheap to share behind an `Arc` and safe to call from
/// many tasks at once.
pub struct Dispatcher {
    session: Arc<dyn DataAccessSession>,
    wrapper: ExecutionWrapper,
    registries: Registries,
    executors: ExecutorFinder,
    generators: GeneratorFinder,
    pipeline: ConversionPipeline,
    cache: ProcedureCache,
    qualify_cache_keys: bool,
}

impl Dispatcher {
    pub fn builder(session: Arc<dyn DataAccessSession>) -> DispatcherBuilder {
        DispatcherBuilder {
            session,
            config: Config::default(),
            registries: Registries::default(),
            read_only: None,
            general: None,
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn session(&self) -> &dyn DataAccessSession {
        self.session.as_ref()
    }

    pub fn cache(&self) -> &ProcedureCache {
        &self.cache
    }

    /// Dispatches one call and returns its final, converted and validated
    /// result.
    ///
    /// Execution, conversion and validation all run inside the boundary the
    /// method's read-only hint selects.
    pub async fn dispatch(&self, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        tracing::debug!(method = %method.qualified_name(), read_only = method.read_only(), "Dispatching");
        let work: UnitOfWork<'_> = Box::pin(async move {
            if method.stored_procedure().is_some() {
                self.call_procedure(method).await
            } else {
                self.run_query(method).await
            }
        });
        self.wrapper.run(method.read_only(), work).await
    }

    async fn run_query(&self, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        let query = prepare_query(method, &self.generators)?;
        let strategy = self.executors.resolve(&method.executor(), method)?;
        let executor = strategy.instantiate().map_err(|reason| {
            DispatchError::configuration(
                method.qualified_name(),
                format!("executor '{}' could not be created: {reason}", strategy.name()),
            )
        })?;
        tracing::debug!(
            method = %method.qualified_name(),
            executor = strategy.name(),
            query = %query.text,
            bindings = query.bindings.len(),
            "Executing query"
        );
        let raw = executor.execute(&query, self.session.as_ref()).await?;
        self.pipeline.process(ResultEnvelope::new(raw, method))
    }

    async fn call_procedure(&self, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        let procedure = self.procedure(method).await?;
        let inputs = bind_inputs(method, &procedure)?;
        tracing::debug!(
            method = %method.qualified_name(),
            statement = procedure.statement(),
            inputs = inputs.len(),
            "Calling procedure"
        );
        let outputs = self.session.call(&procedure, &inputs).await?;
        let raw = extract_result(method, &procedure, outputs)?;
        self.pipeline.process(ResultEnvelope::new(raw, method))
    }

    /// The compiled call for a procedure method, from the cache when the call
    /// site enables caching.
    pub async fn procedure(
        &self,
        method: &MethodDescriptor,
    ) -> Result<Arc<CompiledProcedure>, DispatchError> {
        let session = self.session.as_ref();
        if !method.caching_enabled() {
            return compile_procedure(method, session).await.map(Arc::new);
        }
        let declaration = declare_procedure(method)?;
        let key = cache_key(method, &declaration, self.qualify_cache_keys);
        self.cache
            .get_or_compile(&key, || compile_declared(method, declaration, session))
            .await
    }
}

pub struct DispatcherBuilder {
    session: Arc<dyn DataAccessSession>,
    config: Config,
    registries: Registries,
    read_only: Option<Arc<dyn TransactionalBoundary>>,
    general: Option<Arc<dyn TransactionalBoundary>>,
}

impl DispatcherBuilder {
    pub fn config(mut self, config: &Config) -> Self {
        self.config = config.clone();
        self
    }

    pub fn registries(mut self, registries: Registries) -> Self {
        self.registries = registries;
        self
    }

    /// The boundary for calls hinted read-only.
    pub fn read_only_boundary(mut self, boundary: Arc<dyn TransactionalBoundary>) -> Self {
        self.read_only = Some(boundary);
        self
    }

    /// The boundary for every other call.
    pub fn boundary(mut self, boundary: Arc<dyn TransactionalBoundary>) -> Self {
        self.general = Some(boundary);
        self
    }

    /// Compiles the naming conventions and assembles the dispatcher.
    pub fn build(self) -> Result<Dispatcher, EngineError> {
        let dispatch = &self.config.dispatch;
        let executor_pattern = compile_pattern(&dispatch.executor_pattern)?;
        let generator_pattern = compile_pattern(&dispatch.generator_pattern)?;

        let registries = self.registries;
        tracing::info!(
            executors = registries.executors.len(),
            converters = registries.converters.len(),
            generators = registries.generators.len(),
            inference = ?dispatch.generator_inference,
            read_only_boundary = self.read_only.is_some(),
            boundary = self.general.is_some(),
            "Dispatcher ready"
        );
        Ok(Dispatcher {
            executors: ExecutorFinder::new(executor_pattern, Arc::clone(&registries.executors)),
            generators: GeneratorFinder::new(
                dispatch.generator_inference,
                generator_pattern,
                Arc::clone(&registries.generators),
                factory::fallback_generator(),
            ),
            pipeline: ConversionPipeline::new(Arc::clone(&registries.converters)),
            wrapper: ExecutionWrapper::new(self.read_only, self.general),
            cache: ProcedureCache::new(),
            qualify_cache_keys: self.config.procedures.qualify_cache_keys,
            session: self.session,
            registries,
        })
    }
}
