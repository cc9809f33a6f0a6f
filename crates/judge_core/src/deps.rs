/// One primitive entry of a dependency list.
///
/// Structured inputs have to be serialized by the caller into a stable
/// `Text` key before they take part in comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Value-compared snapshot of the inputs a resource depends on.
///
/// An empty key means "evaluate once on bind, never again automatically".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DependencyKey(Vec<DepValue>);

impl DependencyKey {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DepValue>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[DepValue] {
        &self.0
    }
}

impl<V: Into<DepValue>> FromIterator<V> for DependencyKey {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<bool> for DepValue {
    fn from(value: bool) -> Self {
        DepValue::Bool(value)
    }
}

impl From<i64> for DepValue {
    fn from(value: i64) -> Self {
        DepValue::Int(value)
    }
}

impl From<i32> for DepValue {
    fn from(value: i32) -> Self {
        DepValue::Int(i64::from(value))
    }
}

impl From<u32> for DepValue {
    fn from(value: u32) -> Self {
        DepValue::Int(i64::from(value))
    }
}

impl From<&str> for DepValue {
    fn from(value: &str) -> Self {
        DepValue::Text(value.to_string())
    }
}

impl From<String> for DepValue {
    fn from(value: String) -> Self {
        DepValue::Text(value)
    }
}

impl<V: Into<DepValue>> From<Option<V>> for DepValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(DepValue::Null, Into::into)
    }
}
