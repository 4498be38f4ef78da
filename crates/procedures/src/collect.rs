//! Gathering the IN/INOUT/OUT descriptors a procedure method declares.

use core_types::{ParamDescriptor, ParamKind};
use descriptor::{Attribute, MethodDescriptor};
use std::collections::HashSet;

/// Collects the declared parameters in scan order: single method-level
/// markers, then grouped method-level markers, then argument markers.
///
/// A name seen twice within the same kind keeps the first declaration; later
/// ones are dropped with a warning.
pub fn collect_parameters(method: &MethodDescriptor) -> Vec<ParamDescriptor> {
    let singles = method.attributes().iter().filter_map(|a| match a {
        Attribute::Parameter(p) => Some(p),
        _ => None,
    });
    let grouped = method
        .attributes()
        .iter()
        .filter_map(|a| match a {
            Attribute::Parameters(group) => Some(group.iter()),
            _ => None,
        })
        .flatten();
    let on_arguments = method.arguments().iter().filter_map(|arg| arg.parameter());

    let mut seen: HashSet<(ParamKind, &str)> = HashSet::new();
    let mut collected = Vec::new();
    for param in singles.chain(grouped).chain(on_arguments) {
        if !seen.insert((param.kind, param.name.as_str())) {
            tracing::warn!(
                method = %method.qualified_name(),
                parameter = %param.name,
                kind = %param.kind,
                "Duplicate parameter declaration dropped"
            );
            continue;
        }
        collected.push(param.clone());
    }
    collected
}
