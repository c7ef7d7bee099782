use std::fmt;

/// A single parsed cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return Value::Missing;
        }

        if let Ok(value) = cell.parse::<i64>() {
            return Value::Int(value);
        }

        if let Ok(value) = cell.parse::<f64>() {
            return Value::Float(value);
        }

        Value::Text(cell.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value}"),
            Value::Missing => write!(f, "NaN"),
        }
    }
}

/// Identifier of a network node. TNTP files use integers, but labels are
/// accepted as long as they are unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Int(i64),
    Label(String),
}

impl NodeId {
    /// Node ids must be integers or labels, a float or empty id is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(id) => Some(NodeId::Int(*id)),
            Value::Text(label) => Some(NodeId::Label(label.clone())),
            Value::Float(_) | Value::Missing => None,
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Int(id)
    }
}

impl From<&str> for NodeId {
    fn from(label: &str) -> Self {
        NodeId::Label(label.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(id) => write!(f, "{id}"),
            NodeId::Label(label) => write!(f, "{label}"),
        }
    }
}
