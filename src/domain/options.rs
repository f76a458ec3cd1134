//! Ordered option tables attached to every tree node.

use std::fmt;

/// Value stored under an option name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Flag(bool),
}

impl OptionValue {
    /// Text as shown in the XML and raw dumps.
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::Text(s) => s,
            OptionValue::Flag(true) => "True",
            OptionValue::Flag(false) => "False",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Text(s) => !s.is_empty(),
            OptionValue::Flag(b) => *b,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Flag(b)
    }
}

/// Insertion-ordered mapping from option name to value.
///
/// Reads of unknown names yield `""`, writes of unknown names append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable {
    entries: Vec<(String, OptionValue)>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip names with values; names without a value are left out.
    pub fn from_pairs<I, V>(names: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        let entries = names
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value.into()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> &str {
        self.value(name).map(OptionValue::as_str).unwrap_or("")
    }

    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.value(name).is_some_and(OptionValue::is_truthy)
    }

    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn name(&self) -> &str {
        self.get("Name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.set("Name", OptionValue::Text(name.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for OptionTable {
    /// `Name="a" value="b"`, the form used by the raw dump.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}=\"{}\"", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unknown_name_returns_empty() {
        let table = OptionTable::from_pairs(&["Name"], ["x"]);
        assert_eq!(table.get("value"), "");
        assert_eq!(table.value("value"), None);
    }

    #[test]
    fn test_set_unknown_name_appends_in_order() {
        let mut table = OptionTable::from_pairs(&["Name"], ["x"]);
        table.set("sequenceAware", true);
        table.set("Name", "y");
        let keys: Vec<_> = table.keys().collect();
        assert_eq!(keys, vec!["Name", "sequenceAware"]);
        assert_eq!(table.get("Name"), "y");
        assert!(table.flag("sequenceAware"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = OptionTable::from_pairs(&["Name"], ["a"]);
        let mut copy = original.clone();
        copy.set_name("b");
        assert_eq!(original.name(), "a");
        assert_eq!(copy.name(), "b");
    }

    #[test]
    fn test_display_renders_flags_capitalized() {
        let mut table = OptionTable::from_pairs(&["Name"], ["D"]);
        table.set("sequenceAware", false);
        assert_eq!(table.to_string(), r#"Name="D" sequenceAware="False""#);
    }

    #[test]
    fn test_from_pairs_drops_names_without_value() {
        let table = OptionTable::from_pairs(&["criterion", "type", "element"], ["a", "Is"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("element"), "");
    }
}
