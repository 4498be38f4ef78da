use crate::attribute::{Attribute, AttributeKind, ParamAttribute, ParamMarker};
use crate::strategy::{QueryExecutor, QueryGenerator, ResultConverter, ResultValidator, StrategyRef};
use core_types::{ParamDescriptor, TemporalKind, TypeRef, Value};

/// One argument of an intercepted call together with its declared attributes.
///
/// Keeping both in one struct is what keeps arguments and parameter
/// attributes positionally aligned.
#[derive(Debug, Clone)]
pub struct Argument {
    index: usize,
    value: Value,
    attributes: Vec<ParamAttribute>,
}

impl Argument {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn attributes(&self) -> &[ParamAttribute] {
        &self.attributes
    }

    pub fn has(&self, marker: ParamMarker) -> bool {
        self.attributes.iter().any(|a| a.marker() == marker)
    }

    /// The name this argument is bound to, if any.
    pub fn bound_name(&self) -> Option<&str> {
        self.attributes.iter().find_map(|a| match a {
            ParamAttribute::Named(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// The procedure parameter this argument declares, if any.
    pub fn parameter(&self) -> Option<&ParamDescriptor> {
        self.attributes.iter().find_map(|a| match a {
            ParamAttribute::Parameter(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    pub fn temporal(&self) -> Option<TemporalKind> {
        self.attributes.iter().find_map(|a| match a {
            ParamAttribute::Temporal(kind) => Some(*kind),
            _ => None,
        })
    }
}

/// An immutable snapshot of one intercepted data-access call.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    name: String,
    declaring_type: String,
    return_type: TypeRef,
    arguments: Vec<Argument>,
    attributes: Vec<Attribute>,
}

impl MethodDescriptor {
    pub fn builder(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
    ) -> MethodDescriptorBuilder {
        MethodDescriptorBuilder {
            name: name.into(),
            declaring_type: declaring_type.into(),
            return_type: TypeRef::Void,
            arguments: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// `DeclaringType::method`, the form used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The first method-level attribute of the given kind.
    pub fn attribute(&self, kind: AttributeKind) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.kind() == kind)
    }

    /// The value of the first argument carrying the given marker.
    pub fn argument_marked(&self, marker: ParamMarker) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.has(marker))
            .map(Argument::value)
    }

    /// The value of the first argument bound to `name`.
    pub fn argument_named(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.bound_name() == Some(name))
            .map(Argument::value)
    }

    /// Literal query text, when declared and non-empty.
    pub fn query(&self) -> Option<&str> {
        match self.attribute(AttributeKind::Query) {
            Some(Attribute::Query(text)) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn query_name(&self) -> Option<&str> {
        match self.attribute(AttributeKind::QueryName) {
            Some(Attribute::QueryName(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn is_native_query(&self) -> bool {
        matches!(self.attribute(AttributeKind::NativeQuery), Some(Attribute::NativeQuery(true)))
    }

    pub fn executor(&self) -> StrategyRef<dyn QueryExecutor> {
        match self.attribute(AttributeKind::QueryExecutor) {
            Some(Attribute::QueryExecutor(r)) => r.clone(),
            _ => StrategyRef::Placeholder,
        }
    }

    pub fn generator(&self) -> StrategyRef<dyn QueryGenerator> {
        match self.attribute(AttributeKind::QueryGenerator) {
            Some(Attribute::QueryGenerator(r)) => r.clone(),
            _ => StrategyRef::Placeholder,
        }
    }

    pub fn converter(&self) -> StrategyRef<dyn ResultConverter> {
        match self.attribute(AttributeKind::ResultConverter) {
            Some(Attribute::ResultConverter(r)) => r.clone(),
            _ => StrategyRef::Placeholder,
        }
    }

    pub fn validator(&self) -> StrategyRef<dyn ResultValidator> {
        match self.attribute(AttributeKind::ResultValidator) {
            Some(Attribute::ResultValidator(r)) => r.clone(),
            _ => StrategyRef::Placeholder,
        }
    }

    pub fn first_result(&self) -> Option<u32> {
        match self.attribute(AttributeKind::FirstResult) {
            Some(Attribute::FirstResult(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn max_results(&self) -> Option<u32> {
        match self.attribute(AttributeKind::MaxResults) {
            Some(Attribute::MaxResults(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn caching_enabled(&self) -> bool {
        matches!(self.attribute(AttributeKind::CachingEnabled), Some(Attribute::CachingEnabled(true)))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.attribute(AttributeKind::Function), Some(Attribute::Function(true)))
    }

    pub fn return_param_name(&self) -> Option<&str> {
        match self.attribute(AttributeKind::ReturnParamName) {
            Some(Attribute::ReturnParamName(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn read_only(&self) -> bool {
        matches!(self.attribute(AttributeKind::ReadOnly), Some(Attribute::ReadOnly(true)))
    }

    pub fn stored_procedure(&self) -> Option<&str> {
        match self.attribute(AttributeKind::StoredProcedure) {
            Some(Attribute::StoredProcedure(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// Assembles a [`MethodDescriptor`]; used by the interception layer.
#[derive(Debug)]
pub struct MethodDescriptorBuilder {
    name: String,
    declaring_type: String,
    return_type: TypeRef,
    arguments: Vec<Argument>,
    attributes: Vec<Attribute>,
}

impl MethodDescriptorBuilder {
    pub fn returns(mut self, return_type: TypeRef) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Appends the next positional argument with its attributes.
    pub fn argument(mut self, value: impl Into<Value>, attributes: Vec<ParamAttribute>) -> Self {
        let index = self.arguments.len();
        self.arguments.push(Argument {
            index,
            value: value.into(),
            attributes,
        });
        self
    }

    pub fn build(self) -> MethodDescriptor {
        MethodDescriptor {
            name: self.name,
            declaring_type: self.declaring_type,
            return_type: self.return_type,
            arguments: self.arguments,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ParamDescriptor, ScalarType, SqlType};

    fn lookup_method() -> MethodDescriptor {
        MethodDescriptor::builder("UserDao", "findPage")
            .returns(TypeRef::List(Box::new(TypeRef::Entity("User".into()))))
            .attribute(Attribute::Query("  ".into()))
            .attribute(Attribute::MaxResults(50))
            .attribute(Attribute::MaxResults(10))
            .argument("alice", vec![ParamAttribute::Named("username".into())])
            .argument(20, vec![ParamAttribute::FirstResult])
            .argument("bob", vec![ParamAttribute::Named("username".into())])
            .build()
    }

    #[test]
    fn attribute_lookup_returns_first_of_kind() {
        let method = lookup_method();
        assert_eq!(method.max_results(), Some(50));
        assert!(method.attribute(AttributeKind::QueryName).is_none());
    }

    #[test]
    fn blank_query_text_counts_as_absent() {
        assert_eq!(lookup_method().query(), None);
    }

    #[test]
    fn marked_and_named_lookups_take_the_first_match() {
        let method = lookup_method();
        assert_eq!(method.argument_marked(ParamMarker::FirstResult), Some(&Value::Int(20)));
        assert_eq!(method.argument_marked(ParamMarker::MaxResults), None);
        assert_eq!(method.argument_named("username"), Some(&Value::Text("alice".into())));
        assert_eq!(method.argument_named("email"), None);
    }

    #[test]
    fn arguments_keep_their_positions() {
        let method = lookup_method();
        let indexes: Vec<usize> = method.arguments().iter().map(Argument::index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn absent_strategy_attributes_read_as_placeholder() {
        let method = MethodDescriptor::builder("UserDao", "countAll")
            .returns(TypeRef::Scalar(ScalarType::Long))
            .attribute(Attribute::Parameter(ParamDescriptor::output("total", SqlType::BigInt)))
            .build();
        assert!(method.executor().is_placeholder());
        assert!(method.converter().is_placeholder());
        assert!(!method.read_only());
        assert_eq!(method.qualified_name(), "UserDao::countAll");
    }
}
