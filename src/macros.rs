/// Builds a [`Value`](crate::Value) from JSON-like literal syntax.
///
/// ```rust
/// use qson::qson;
///
/// let value = qson!({
///     "query": "boats",
///     "page": 2,
///     "filters": ["new", "cheap"],
///     "extra": null
/// });
/// assert_eq!(qson::stringify(&value).unwrap(), "(query~boats'page~2'filters~(new'cheap)'extra~null)");
/// ```
#[macro_export]
macro_rules! qson {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::qson!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::QsonMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::QsonMap::new();
        $(
            object.insert($key.to_string(), $crate::qson!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Any other expression goes through the serializer
    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}
