//! [`graphql_value!`] macro implementation.
//!
//! [`graphql_value!`]: graphql_value

/// Constructs [`Value`]s via JSON-like syntax.
///
/// Object keys are string literals; values are `null`, nested lists or
/// objects, or any expression convertible into a [`Value`].
///
/// ```rust
/// # use graphql_core::{graphql_value, Value};
/// #
/// let code = 200;
///
/// let value: Value = graphql_value!({
///     "code": code,
///     "success": code == 200,
///     "payload": {"features": ["key", "value"], "missing": null},
/// });
/// ```
///
/// [`Value`]: crate::Value
#[macro_export]
macro_rules! graphql_value {
    // Lists: `done` holds the already converted elements.
    (@list [$($done:expr,)*]) => {
        $crate::Value::list(vec![$($done,)*])
    };
    (@list [$($done:expr,)*] null $(, $($rest:tt)*)?) => {
        $crate::graphql_value!(@list [$($done,)* $crate::Value::Null,] $($($rest)*)?)
    };
    (@list [$($done:expr,)*] [$($inner:tt)*] $(, $($rest:tt)*)?) => {
        $crate::graphql_value!(
            @list [$($done,)* $crate::graphql_value!([$($inner)*]),] $($($rest)*)?
        )
    };
    (@list [$($done:expr,)*] {$($inner:tt)*} $(, $($rest:tt)*)?) => {
        $crate::graphql_value!(
            @list [$($done,)* $crate::graphql_value!({$($inner)*}),] $($($rest)*)?
        )
    };
    (@list [$($done:expr,)*] $next:expr $(, $($rest:tt)*)?) => {
        $crate::graphql_value!(
            @list [$($done,)* $crate::Value::from($next),] $($($rest)*)?
        )
    };

    // Objects: fields are added to `$obj` one at a time.
    (@object $obj:ident) => {};
    (@object $obj:ident $key:literal : null $(, $($rest:tt)*)?) => {
        $obj.add_field($key, $crate::Value::Null);
        $crate::graphql_value!(@object $obj $($($rest)*)?);
    };
    (@object $obj:ident $key:literal : [$($inner:tt)*] $(, $($rest:tt)*)?) => {
        $obj.add_field($key, $crate::graphql_value!([$($inner)*]));
        $crate::graphql_value!(@object $obj $($($rest)*)?);
    };
    (@object $obj:ident $key:literal : {$($inner:tt)*} $(, $($rest:tt)*)?) => {
        $obj.add_field($key, $crate::graphql_value!({$($inner)*}));
        $crate::graphql_value!(@object $obj $($($rest)*)?);
    };
    (@object $obj:ident $key:literal : $value:expr $(, $($rest:tt)*)?) => {
        $obj.add_field($key, $crate::Value::from($value));
        $crate::graphql_value!(@object $obj $($($rest)*)?);
    };

    (null) => {
        $crate::Value::Null
    };
    (None) => {
        $crate::Value::Null
    };
    ([$($elems:tt)*]) => {
        $crate::graphql_value!(@list [] $($elems)*)
    };
    ({$($fields:tt)*}) => {{
        let mut object = $crate::Object::with_capacity(0);
        $crate::graphql_value!(@object object $($fields)*);
        $crate::Value::object(object)
    }};
    ($e:expr) => {
        $crate::Value::from($e)
    };
}
