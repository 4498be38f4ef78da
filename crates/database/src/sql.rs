//! Statement text handling that needs no connection.

use core_types::{Binding, DataAccessError, Placeholder, ProcedureDeclaration};

/// Lexical context of the character being scanned.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Code,
    Literal,
    Identifier,
    LineComment,
    BlockComment,
}

/// Rewrites `:name` placeholders to PostgreSQL's `$n`.
///
/// Returns the rewritten text and the placeholder names in `$n` order; a name
/// used twice maps to the same position. `::` casts, quoted literals, quoted
/// identifiers and comments are left alone.
pub fn rewrite_named(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut context = Context::Code;

    while let Some(c) = chars.next() {
        match context {
            Context::Literal if c == '\'' => context = Context::Code,
            Context::Identifier if c == '"' => context = Context::Code,
            Context::LineComment if c == '\n' => context = Context::Code,
            Context::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                out.push(c);
                if let Some(slash) = chars.next() {
                    out.push(slash);
                }
                context = Context::Code;
                continue;
            }
            Context::Code => match c {
                '\'' => context = Context::Literal,
                '"' => context = Context::Identifier,
                '-' if chars.peek() == Some(&'-') => context = Context::LineComment,
                '/' if chars.peek() == Some(&'*') => context = Context::BlockComment,
                _ => {}
            },
            _ => {}
        }
        if context != Context::Code || c != ':' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&':') {
            chars.next();
            out.push_str("::");
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() || name.starts_with(|ch: char| ch.is_ascii_digit()) {
            out.push(':');
            out.push_str(&name);
            continue;
        }
        let position = match names.iter().position(|n| *n == name) {
            Some(i) => i + 1,
            None => {
                names.push(name);
                names.len()
            }
        };
        out.push('$');
        out.push_str(&position.to_string());
    }
    (out, names)
}

/// Puts the bindings in `$n` order.
///
/// With named placeholders every name needs a named binding and positional
/// bindings are rejected. Without them the bindings must all be positional.
pub fn order_bindings<'b>(
    names: &[String],
    bindings: &'b [Binding],
) -> Result<Vec<&'b Binding>, DataAccessError> {
    if !names.is_empty() {
        if let Some(position) = bindings.iter().find_map(|b| match b.placeholder {
            Placeholder::Positional(position) => Some(position),
            Placeholder::Named(_) => None,
        }) {
            return Err(DataAccessError::Configuration(format!(
                "positional value {position} bound to a statement with named placeholders"
            )));
        }
        return names
            .iter()
            .map(|name| {
                bindings
                    .iter()
                    .find(|b| matches!(&b.placeholder, Placeholder::Named(n) if n == name))
                    .ok_or_else(|| DataAccessError::Backend(format!("no value bound to :{name}")))
            })
            .collect();
    }

    let mut positional = Vec::with_capacity(bindings.len());
    for binding in bindings {
        match &binding.placeholder {
            Placeholder::Positional(position) => positional.push((*position, binding)),
            Placeholder::Named(name) => {
                return Err(DataAccessError::Configuration(format!(
                    "value bound to :{name} but the statement has no named placeholders"
                )));
            }
        }
    }
    positional.sort_by_key(|(position, _)| *position);
    Ok(positional.into_iter().map(|(_, binding)| binding).collect())
}

/// Appends LIMIT/OFFSET paging to a statement.
pub fn with_paging(sql: &str, first_result: Option<u32>, max_results: Option<u32>) -> String {
    let mut paged = sql.trim_end().trim_end_matches(';').to_string();
    if let Some(limit) = max_results {
        paged.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = first_result.filter(|offset| *offset > 0) {
        paged.push_str(&format!(" OFFSET {offset}"));
    }
    paged
}

/// The statement calling a declared procedure or function.
///
/// Inputs become typed `$n` placeholders in declaration order. Functions take
/// only their inputs and return their outputs as columns; procedures receive a
/// typed NULL in each OUT position.
pub fn procedure_statement(declaration: &ProcedureDeclaration) -> String {
    let mut next = 0;
    let arguments: Vec<String> = declaration
        .parameters
        .iter()
        .filter(|p| !declaration.function || p.kind.is_input())
        .map(|p| {
            if p.kind.is_input() {
                next += 1;
                format!("${next}::{}", p.sql_type.pg_name())
            } else {
                format!("NULL::{}", p.sql_type.pg_name())
            }
        })
        .collect();
    if declaration.function {
        format!("SELECT * FROM {}({})", declaration.name, arguments.join(", "))
    } else {
        format!("CALL {}({})", declaration.name, arguments.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ParamDescriptor, SqlType, Value};

    #[test]
    fn named_placeholders_become_positions() {
        let (sql, names) = rewrite_named(
            "SELECT * FROM users WHERE username = :username OR email = :email OR alias = :username",
        );
        assert_eq!(sql, "SELECT * FROM users WHERE username = $1 OR email = $2 OR alias = $1");
        assert_eq!(names, vec!["username", "email"]);
    }

    #[test]
    fn casts_and_literals_are_untouched() {
        let (sql, names) = rewrite_named("SELECT ':not_me', created::date FROM t WHERE id = :id");
        assert_eq!(sql, "SELECT ':not_me', created::date FROM t WHERE id = $1");
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn quoted_identifiers_and_comments_are_untouched() {
        let (sql, names) = rewrite_named(
            "SELECT \"weird:col\" FROM t -- filter on :ignored\nWHERE id = :id /* not :this */ AND x = :x",
        );
        assert_eq!(
            sql,
            "SELECT \"weird:col\" FROM t -- filter on :ignored\nWHERE id = $1 /* not :this */ AND x = $2"
        );
        assert_eq!(names, vec!["id", "x"]);
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        let (sql, names) = rewrite_named("SELECT 'it''s :here' WHERE a = :a");
        assert_eq!(sql, "SELECT 'it''s :here' WHERE a = $1");
        assert_eq!(names, vec!["a"]);
    }

    fn binding(placeholder: Placeholder, value: impl Into<Value>) -> Binding {
        Binding {
            placeholder,
            value: value.into(),
            temporal: None,
        }
    }

    #[test]
    fn bindings_follow_placeholder_order() {
        let bindings = vec![
            binding(Placeholder::Named("email".into()), "a@b"),
            binding(Placeholder::Named("username".into()), "alice"),
        ];
        let names = vec!["username".to_string(), "email".to_string()];
        let ordered = order_bindings(&names, &bindings).unwrap();
        assert_eq!(ordered[0].value, Value::Text("alice".into()));

        let missing = vec!["other".to_string()];
        assert!(order_bindings(&missing, &bindings).is_err());
    }

    #[test]
    fn positional_values_cannot_mix_with_named_placeholders() {
        let bindings = vec![
            binding(Placeholder::Named("username".into()), "alice"),
            binding(Placeholder::Positional(2), 7),
        ];
        let names = vec!["username".to_string()];
        let err = order_bindings(&names, &bindings).unwrap_err();
        assert!(matches!(err, DataAccessError::Configuration(_)));

        let named_only = vec![binding(Placeholder::Named("username".into()), "alice")];
        let err = order_bindings(&[], &named_only).unwrap_err();
        assert!(matches!(err, DataAccessError::Configuration(_)));
    }

    #[test]
    fn positional_bindings_sort_by_position() {
        let bindings = vec![
            binding(Placeholder::Positional(2), 2),
            binding(Placeholder::Positional(1), 1),
        ];
        let ordered = order_bindings(&[], &bindings).unwrap();
        assert_eq!(ordered[0].value, Value::Int(1));
    }

    #[test]
    fn paging_is_appended() {
        assert_eq!(with_paging("SELECT 1;", Some(20), Some(10)), "SELECT 1 LIMIT 10 OFFSET 20");
        assert_eq!(with_paging("SELECT 1", Some(0), None), "SELECT 1");
    }

    #[test]
    fn procedures_pass_null_for_outputs() {
        let declaration = ProcedureDeclaration {
            name: "p_concat".into(),
            function: false,
            parameters: vec![
                ParamDescriptor::input("p_string", SqlType::Varchar),
                ParamDescriptor::input("p_integer", SqlType::Integer),
                ParamDescriptor::output("p_result", SqlType::Varchar),
            ],
        };
        assert_eq!(
            procedure_statement(&declaration),
            "CALL p_concat($1::varchar, $2::integer, NULL::varchar)"
        );

        let function = ProcedureDeclaration {
            function: true,
            ..declaration
        };
        assert_eq!(
            procedure_statement(&function),
            "SELECT * FROM p_concat($1::varchar, $2::integer)"
        );
    }
}
