//! Lenient `key = "value"` line reader for tfvars and backend-config files.
//!
//! This is not an HCL parser. Grammar, one entry per line:
//!
//! ```text
//! line    := ws key ws '=' ws value ws [comment]
//! value   := '"' [^"]* '"' | bare
//! bare    := [^\s#"{}\[\]]+
//! comment := ('#' | '//') .*
//! ```
//!
//! Blank lines, comment lines and anything not matching the grammar are
//! skipped. The first occurrence of a key wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|([^\s#"{}\[\]]+))\s*(?:(?:#|//).*)?$"#)
        .expect("Invalid tfvars entry regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TfVars {
    entries: Vec<(String, String)>,
}

impl TfVars {
    pub fn parse(content: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }

            let Some(captures) = ENTRY_REGEX.captures(line) else {
                continue;
            };
            let key = captures[1].to_string();
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            if !entries.iter().any(|(existing, _)| *existing == key) {
                entries.push((key, value));
            }
        }

        Self { entries }
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_or_default(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// Value for `key`, treating an empty string as unset
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_and_bare_values() {
        let vars = TfVars::parse(
            r#"
# identity
org_moniker = "df"
encrypt     = true
  region="eu-central-2"   # trailing comment
"#,
        );
        assert_eq!(vars.get("org_moniker"), Some("df"));
        assert_eq!(vars.get("encrypt"), Some("true"));
        assert_eq!(vars.get("region"), Some("eu-central-2"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let vars = TfVars::parse("bucket = \"first\"\nbucket = \"second\"\n");
        assert_eq!(vars.get("bucket"), Some("first"));
    }

    #[test]
    fn test_ignores_non_entries() {
        let vars = TfVars::parse(
            r#"
// comment
tags = {
  Owner = "platform"
}
list = ["a", "b"]
"#,
        );
        // nested map entries still look like key = "value" lines
        assert_eq!(vars.get("Owner"), Some("platform"));
        assert_eq!(vars.get("tags"), None);
        assert_eq!(vars.get("list"), None);
    }

    #[test]
    fn test_empty_value() {
        let vars = TfVars::parse("aws_account_id = \"\"\n");
        assert_eq!(vars.get("aws_account_id"), Some(""));
        assert_eq!(vars.get_non_empty("aws_account_id"), None);
        assert_eq!(vars.get_or_default("missing"), "");
    }

    #[test]
    fn test_value_with_hash_inside_quotes() {
        let vars = TfVars::parse("kms_key_id = \"alias/a#b\" # note\n");
        assert_eq!(vars.get("kms_key_id"), Some("alias/a#b"));
    }
}
