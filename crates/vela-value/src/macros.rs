/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// `undefined` and `null` are keywords, `[..]` builds an array and
/// `{"key": value, ..}` builds an object. Anything else goes through
/// `Value::from`, so negative numbers and other multi-token expressions
/// need parentheses.
///
/// ```
/// use vela_value::{value, Value};
///
/// let v = value!({
///     "name": "Alice",
///     "tags": ["a", "b"],
///     "age": (-1),
///     "extra": undefined,
/// });
/// assert_eq!(v.get("age"), Some(&Value::Number(-1.0)));
/// ```
#[macro_export]
macro_rules! value {
    (undefined) => {
        $crate::Value::Undefined
    };
    (null) => {
        $crate::Value::Null
    };
    ([ $($item:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![ $( $crate::value!($item) ),* ])
    };
    ({ $($key:literal : $item:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut object = $crate::Object::new();
        $( object.insert(($key).to_string(), $crate::value!($item)); )*
        $crate::Value::Object(object)
    }};
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
