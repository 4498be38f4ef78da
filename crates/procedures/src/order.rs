use core_types::{DispatchError, ParamDescriptor, ParamKind};
use std::collections::HashSet;

/// Puts the parameters in call order.
///
/// A fully indexed set is sorted by index; any repeated index is ambiguous.
/// Otherwise parameters are grouped by kind (OUT, INOUT, IN for functions;
/// IN, INOUT, OUT for procedures), keeping scan order within each group.
pub fn order_parameters(
    method: &str,
    mut parameters: Vec<ParamDescriptor>,
    function: bool,
) -> Result<Vec<ParamDescriptor>, DispatchError> {
    let fully_indexed = !parameters.is_empty() && parameters.iter().all(|p| p.index.is_some());
    if fully_indexed {
        let mut indexes = HashSet::new();
        for index in parameters.iter().filter_map(|p| p.index) {
            if !indexes.insert(index) {
                return Err(DispatchError::configuration(
                    method,
                    format!("index {index} is declared by more than one parameter"),
                ));
            }
        }
        parameters.sort_by_key(|p| p.index);
        return Ok(parameters);
    }

    let groups: [ParamKind; 3] = if function {
        [ParamKind::Out, ParamKind::InOut, ParamKind::In]
    } else {
        [ParamKind::In, ParamKind::InOut, ParamKind::Out]
    };
    // Stable sort keeps scan order within a group.
    parameters.sort_by_key(|p| groups.iter().position(|kind| *kind == p.kind));
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SqlType;
    use proptest::prelude::*;

    fn names(params: &[ParamDescriptor]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    fn mixed() -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor::output("o1", SqlType::Varchar),
            ParamDescriptor::input("i1", SqlType::Varchar),
            ParamDescriptor::in_out("io", SqlType::Integer),
            ParamDescriptor::input("i2", SqlType::Integer).at(0),
            ParamDescriptor::output("o2", SqlType::Integer),
        ]
    }

    #[test]
    fn procedures_order_in_inout_out() {
        let ordered = order_parameters("P::p", mixed(), false).unwrap();
        assert_eq!(names(&ordered), vec!["i1", "i2", "io", "o1", "o2"]);
    }

    #[test]
    fn functions_order_out_inout_in() {
        let ordered = order_parameters("P::f", mixed(), true).unwrap();
        assert_eq!(names(&ordered), vec!["o1", "o2", "io", "i1", "i2"]);
    }

    #[test]
    fn duplicate_indexes_are_ambiguous() {
        let params = vec![
            ParamDescriptor::input("a", SqlType::Integer).at(1),
            ParamDescriptor::input("b", SqlType::Integer).at(1),
        ];
        assert!(matches!(
            order_parameters("P::p", params, false),
            Err(DispatchError::Configuration { .. })
        ));
    }

    fn kind() -> impl Strategy<Value = ParamKind> {
        prop_oneof![Just(ParamKind::In), Just(ParamKind::InOut), Just(ParamKind::Out)]
    }

    proptest! {
        #[test]
        fn fully_indexed_sets_follow_ascending_index(
            entries in proptest::collection::hash_map(0u32..64, kind(), 1..12),
            function in any::<bool>(),
        ) {
            let params: Vec<ParamDescriptor> = entries
                .iter()
                .map(|(index, kind)| {
                    ParamDescriptor::new(format!("p{index}"), *kind, SqlType::Integer).at(*index)
                })
                .collect();
            let ordered = order_parameters("P::p", params, function).unwrap();
            let indexes: Vec<u32> = ordered.iter().filter_map(|p| p.index).collect();
            prop_assert_eq!(indexes.len(), entries.len());
            prop_assert!(indexes.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn grouping_preserves_scan_order_within_a_kind(
            kinds in proptest::collection::vec(kind(), 0..16),
        ) {
            let params: Vec<ParamDescriptor> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| ParamDescriptor::new(format!("p{i}"), *kind, SqlType::Integer))
                .collect();
            let ordered = order_parameters("P::p", params, false).unwrap();
            for kind in [ParamKind::In, ParamKind::InOut, ParamKind::Out] {
                let positions: Vec<usize> = ordered
                    .iter()
                    .filter(|p| p.kind == kind)
                    .map(|p| p.name[1..].parse::<usize>().unwrap())
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
