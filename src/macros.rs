// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for writing a [`Schema`](crate::Schema) literal.
///
/// Each entry maps a key to either a reducer or a braced nested schema. Reducers may be any
/// expression, such as a function name or a closure.
///
/// ```rust
/// # use reducer_tree::{Schema, schema};
/// fn counter(state: Option<&i64>, action: &Option<i64>) -> i64 {
///     state.copied().unwrap_or(0) + action.unwrap_or(0)
/// }
///
/// let schema: Schema<i64, Option<i64>> = schema! {
///     "total" => counter,
///     "per_user" => {
///         "alice" => counter,
///         "bob" => |state: Option<&i64>, _: &Option<i64>| state.copied().unwrap_or(-1)
///     }
/// };
/// assert_eq!(schema.leaf_paths().len(), 3);
/// ```
///
/// Duplicate keys are accepted here and reported when the schema is built.
#[macro_export]
macro_rules! schema {
    (@acc $schema:expr ;) => {
        $schema
    };
    (@acc $schema:expr ; $k:expr => { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        $crate::schema!(@acc $schema.subtree($k, $crate::schema!{ $($inner)* }) ; $($($rest)*)?)
    };
    (@acc $schema:expr ; $k:expr => $v:expr $(, $($rest:tt)*)?) => {
        $crate::schema!(@acc $schema.leaf($k, $v) ; $($($rest)*)?)
    };
    ($($body:tt)*) => {
        $crate::schema!(@acc $crate::Schema::new() ; $($body)*)
    };
}

/// Convenience macro for creating a [`KeyPath`](crate::KeyPath) from keys of mixed kinds.
///
/// ```rust
/// # use reducer_tree::key_path;
/// let path = key_path!["users", 3usize, "name"];
/// assert_eq!(path.to_string(), "users[3].name");
/// assert!(key_path![].is_root());
/// ```
#[macro_export]
macro_rules! key_path {
    ($($k:expr),* $(,)?) => {
        <$crate::KeyPath as ::std::iter::FromIterator<$crate::Key>>::from_iter([
            $($crate::Key::from($k)),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::{Key, KeyPath, Schema};

    fn noop(state: Option<&u8>, _: &()) -> u8 {
        state.copied().unwrap_or_default()
    }

    #[test]
    fn schema_literal_nests() {
        let schema: Schema<u8, ()> = schema! {
            "a" => noop,
            "b" => {
                "c" => noop,
                "d" => { "e" => noop },
            },
            "f" => noop,
        };
        assert_eq!(
            format!("{schema:?}"),
            r#"{"a": <reducer>, "b": {"c": <reducer>, "d": {"e": <reducer>}}, "f": <reducer>}"#
        );
    }

    #[test]
    fn empty_schema_literal() {
        let schema: Schema<u8, ()> = schema! {};
        assert!(schema.is_empty());
    }

    #[test]
    fn key_path_mixes_names_and_indices() {
        assert_eq!(
            key_path!["a", 0usize],
            KeyPath::from_iter([Key::from("a"), Key::Index(0)])
        );
        assert_eq!(key_path!["a", "b",], KeyPath::from(["a", "b"]));
    }
}
