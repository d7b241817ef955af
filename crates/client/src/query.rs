//! Timeline query parameters.
//!
//! Only a fixed allow-list of keys is forwarded to the server. List values are
//! accepted for `any`, `all` and `none` and are sent as repeated `key[]=value`
//! pairs. Everything else is sent as `key=value`.

/// Keys forwarded to the server. Anything else is dropped silently.
pub const ALLOWED_PARAMS: [&str; 10] = [
    "any",
    "all",
    "none",
    "local",
    "remote",
    "only_media",
    "max_id",
    "since_id",
    "min_id",
    "limit",
];

/// Keys that accept a list of values, in serialization order.
pub const ARRAY_PARAMS: [&str; 3] = ["any", "all", "none"];

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from!(bool, i32, i64, u32, u64, usize);

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered set of query parameters supplied to a timeline call.
///
/// Keys keep the position of their first insertion; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`QueryParams::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Serialize the allowed parameters into a query string (without `?`).
    ///
    /// List values for `any`, `all` and `none` come first, in that order. The
    /// remaining scalar values follow in insertion order. A list supplied for any
    /// other key is dropped. Values are percent-encoded.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        for key in ARRAY_PARAMS {
            if let Some(ParamValue::List(values)) = self.get(key) {
                parts.extend(
                    values
                        .iter()
                        .map(|value| format!("{key}[]={}", urlencoding::encode(value))),
                );
            }
        }

        for (key, value) in &self.entries {
            if !is_allowed(key) {
                continue;
            }

            if let ParamValue::Scalar(value) = value {
                parts.push(format!("{key}={}", urlencoding::encode(value)));
            }
        }

        parts.join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn is_allowed(key: &str) -> bool {
    ALLOWED_PARAMS.contains(&key)
}
