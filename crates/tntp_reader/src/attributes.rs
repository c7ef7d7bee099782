use crate::value::Value;

/// Ordered attribute storage for graph nodes and edges. Attribute counts are
/// small (a dozen columns at most) so a linear scan beats hashing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeMap(Vec<(String, Value)>);

impl AttributeMap {
    pub fn new() -> Self {
        AttributeMap(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        AttributeMap(Vec::with_capacity(capacity))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces the value when the attribute already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut attributes = AttributeMap::new();
        attributes.insert("capacity", Value::Float(100.0));
        attributes.insert("capacity", Value::Int(5));

        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get_f64("capacity"), Some(5.0));
        assert!(!attributes.contains("volume"));
    }
}
