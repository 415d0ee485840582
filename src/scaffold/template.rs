//! Placeholder substitution for generated files

use std::collections::BTreeMap;

/// A text template with `{{name}}` placeholders
///
/// Placeholders without a value are left in the output as written.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    values: BTreeMap<String, String>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set the value for `{{name}}`
    pub fn place(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn produce(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}") {
                Some(end) => {
                    let name = &after[..end];
                    match self.values.get(name.trim()) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(name);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        let out = Template::new("Hello {{name}}, {{ greeting }}!")
            .place("name", "Miles")
            .place("greeting", "welcome")
            .produce();
        assert_eq!(out, "Hello Miles, welcome!");
    }

    #[test]
    fn test_unknown_and_unterminated_placeholders_are_kept() {
        let out = Template::new("{{known}} {{unknown}} {{open")
            .place("known", "x")
            .produce();
        assert_eq!(out, "x {{unknown}} {{open");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = Template::new("{{a}}").place("a", "{{b}}").place("b", "no").produce();
        assert_eq!(out, "{{b}}");
    }
}
