use std::fmt;

use serde_json::Value;

/// Name of the per-mod manifest file.
pub const MANIFEST_FILE: &str = "Modconf.conf";

/// Why a mod's manifest could not be used. The mod is still discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestIssue {
    InvalidFormat,
    Missing,
    Unreadable,
}

impl ManifestIssue {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid config format",
            Self::Missing => "Missing Modconf.conf",
            Self::Unreadable => "Failed to read config",
        }
    }
}

impl fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and dependency declaration of one mod.
#[derive(Debug, Clone, PartialEq)]
pub struct ModDescriptor {
    pub name: String,
    pub description: String,
    pub dependencies: Vec<String>,
    /// The manifest object as written, when it parsed.
    pub raw: Option<Value>,
    pub error: Option<ManifestIssue>,
}

impl ModDescriptor {
    /// Descriptor for a mod whose manifest could not be used.
    pub fn degraded(folder: &str, issue: ManifestIssue) -> Self {
        ModDescriptor {
            name: folder.to_string(),
            description: String::new(),
            dependencies: Vec::new(),
            raw: None,
            error: Some(issue),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Parse the text of a `Modconf.conf` file.
///
/// Every field is optional: a missing or blank `name` falls back to the folder
/// name and any other name is kept verbatim. A non-array `dependencies` is
/// treated as empty and non-string entries are skipped. Text that is not a
/// JSON object yields a degraded descriptor.
pub fn parse_manifest(text: &str, folder: &str) -> ModDescriptor {
    let conf = match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => v,
        _ => return ModDescriptor::degraded(folder, ManifestIssue::InvalidFormat),
    };

    let name = conf
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(folder)
        .to_string();

    let description = conf
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let dependencies = match conf.get("dependencies") {
        Some(Value::Array(deps)) => deps
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    ModDescriptor {
        name,
        description,
        dependencies,
        raw: Some(conf),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_manifest_is_parsed() {
        let d = parse_manifest(
            r#"{"name": "Dragons", "description": "Adds dragons", "dependencies": ["Core", "Beasts"]}"#,
            "dragons-folder",
        );
        assert_eq!(d.name, "Dragons");
        assert_eq!(d.description, "Adds dragons");
        assert_eq!(d.dependencies, vec!["Core", "Beasts"]);
        assert!(d.error.is_none());
        assert!(d.raw.is_some());
    }

    #[test]
    fn missing_fields_fall_back() {
        let d = parse_manifest("{}", "plain");
        assert_eq!(d.name, "plain");
        assert_eq!(d.description, "");
        assert!(d.dependencies.is_empty());
        assert!(!d.is_degraded());
    }

    #[test]
    fn names_are_kept_verbatim() {
        let d = parse_manifest(r#"{"name": " Core "}"#, "core");
        assert_eq!(d.name, " Core ");

        let d = parse_manifest(r#"{"name": "   "}"#, "core");
        assert_eq!(d.name, "core");
    }

    #[test]
    fn non_array_dependencies_are_ignored() {
        let d = parse_manifest(r#"{"dependencies": "Core"}"#, "m");
        assert!(d.dependencies.is_empty());

        let d = parse_manifest(r#"{"dependencies": ["Core", 7, null, "Lore"]}"#, "m");
        assert_eq!(d.dependencies, vec!["Core", "Lore"]);
    }

    #[test]
    fn malformed_text_is_degraded_not_fatal() {
        for text in ["{not json", "", "[1, 2]", "\"just a string\""] {
            let d = parse_manifest(text, "broken");
            assert_eq!(d.name, "broken");
            assert_eq!(d.error, Some(ManifestIssue::InvalidFormat));
            assert_eq!(d.error.map(|e| e.to_string()).as_deref(), Some("Invalid config format"));
            assert!(d.dependencies.is_empty());
        }
    }
}
