use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde_json::Value;

/// Identity of a cached read, a JSON array such as
/// `["isLikedMovie", {"movieId": "m1"}]`.
///
/// Keys compare by their canonical JSON text, object members are sorted
/// so `{"a":1,"b":2}` and `{"b":2,"a":1}` name the same query.
#[derive(Clone)]
pub struct QueryKey {
    parts: Vec<Value>,
    canonical: String,
}

impl QueryKey {
    pub fn new(scope: impl Into<String>) -> Self {
        Self::from_parts(vec![Value::String(scope.into())])
    }

    pub fn from_parts(parts: Vec<Value>) -> Self {
        let canonical = Value::Array(parts.clone()).to_string();
        Self { parts, canonical }
    }

    pub fn with(mut self, part: Value) -> Self {
        self.parts.push(part);
        self.canonical = Value::Array(self.parts.clone()).to_string();
        self
    }

    /// True if `self` equals `other` or extends it
    pub fn starts_with(&self, other: &QueryKey) -> bool {
        self.parts.starts_with(&other.parts)
    }
}

impl PartialEq for QueryKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for QueryKey {}

impl Hash for QueryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryKey({})", self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn canonical_form() {
        let key = QueryKey::new("isLikedMovie").with(json!({"movieId": "m1"}));
        assert_eq!(key.to_string(), r#"["isLikedMovie",{"movieId":"m1"}]"#);

        let same = QueryKey::from_parts(vec![json!("isLikedMovie"), json!({"movieId": "m1"})]);
        assert_eq!(key, same);
        assert_ne!(key, QueryKey::new("isLikedMovie").with(json!({"movieId": 1})));
    }

    #[test]
    fn prefix_match() {
        let scope = QueryKey::new("isLikedMovie");
        let key = scope.clone().with(json!({"movieId": "m1"}));
        assert!(key.starts_with(&scope));
        assert!(key.starts_with(&key));
        assert!(!scope.starts_with(&key));
    }
}
