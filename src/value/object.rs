use indexmap::{IndexMap, map};

use super::Value;

/// Fields of an object [`Value`], in insertion order.
///
/// Response objects list their fields in selection order, so the order is
/// part of the value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    fields: IndexMap<String, Value>,
}

impl Object {
    /// An empty object with room for `size` fields.
    pub fn with_capacity(size: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(size),
        }
    }

    /// Sets the field `k`, returning the value it replaced.
    ///
    /// An object set over an existing object is merged into it field by
    /// field instead, and nothing is returned.
    pub fn add_field<K: Into<String>>(&mut self, k: K, value: Value) -> Option<Value> {
        let key = k.into();
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = self.fields.get_mut(&key) {
                for (k, v) in incoming {
                    existing.add_field(k, v);
                }
                return None;
            }
            return self.fields.insert(key, Value::Object(incoming));
        }
        self.fields.insert(key, value)
    }

    /// Whether the field `key` is set.
    pub fn contains_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The fields with their values, in order.
    pub fn iter(&self) -> map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The value of the field `key`.
    pub fn get_field_value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut obj = Self::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            obj.add_field(k, v);
        }
        obj
    }
}
