use indexmap::IndexMap;
use ngcli_options::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key under which unmatched tokens are reported.
pub const LEFTOVERS_KEY: &str = "--";

/// Result of a parse: option values in assignment order plus leftovers.
///
/// Serializes as a flat JSON object. The `--` key is present only when
/// something was left over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, Value>,
    leftovers: Vec<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Option values in the order they were first assigned.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of option values (leftovers excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.leftovers.is_empty()
    }

    /// Tokens that could not be matched to any option, or `None` when
    /// everything was consumed.
    pub fn leftovers(&self) -> Option<&[String]> {
        if self.leftovers.is_empty() {
            None
        } else {
            Some(self.leftovers.as_slice())
        }
    }
}

impl Arguments {
    pub(crate) fn set(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub(crate) fn push_leftovers(&mut self, tokens: impl IntoIterator<Item = String>) {
        self.leftovers.extend(tokens);
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.leftovers.is_empty());
        let mut map = serializer.serialize_map(Some(self.values.len() + extra))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        if !self.leftovers.is_empty() {
            map.serialize_entry(LEFTOVERS_KEY, &self.leftovers)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leftovers_key_only_when_present() {
        let mut args = Arguments::new();
        args.set("name".to_string(), Value::from("app"));
        assert_eq!(args.leftovers(), None);
        assert_eq!(serde_json::to_value(&args).unwrap(), json!({ "name": "app" }));

        args.push_leftovers(["--extra".to_string()]);
        assert_eq!(args.leftovers(), Some(&["--extra".to_string()][..]));
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!({ "name": "app", "--": ["--extra"] })
        );
    }

    #[test]
    fn iteration_follows_first_assignment() {
        let mut args = Arguments::new();
        args.set("b".to_string(), Value::Bool(true));
        args.set("a".to_string(), Value::Number(1.0));
        args.set("b".to_string(), Value::Bool(false));

        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(args.get("b"), Some(&Value::Bool(false)));
        assert_eq!(args.len(), 2);
    }
}
