//! EP-002: Manifest parsing and validation.
//!
//! Parses empacar.yaml and validates structural constraints:
//! - Schema must be "1.0"
//! - Package name charset
//! - version_from and scripts must be present
//! - Every requires entry must parse as a dependency specifier

use super::requirement;
use super::types::PackageManifest;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse an empacar.yaml file from disk.
pub fn parse_manifest_file(path: &Path) -> Result<PackageManifest, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_manifest(&content)
}

/// Parse an empacar.yaml from a string.
pub fn parse_manifest(yaml: &str) -> Result<PackageManifest, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("package name pattern")
    })
}

/// Validate a parsed manifest. Returns a list of errors (empty = valid).
pub fn validate_manifest(manifest: &PackageManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Schema check
    if manifest.schema != "1.0" {
        errors.push(ValidationError {
            message: format!("schema must be \"1.0\", got \"{}\"", manifest.schema),
        });
    }

    // Name check
    if manifest.package.name.is_empty() {
        errors.push(ValidationError {
            message: "package.name must not be empty".to_string(),
        });
    } else if !name_pattern().is_match(&manifest.package.name) {
        errors.push(ValidationError {
            message: format!(
                "package.name '{}' must be lowercase alphanumeric with '.', '_' or '-'",
                manifest.package.name
            ),
        });
    }

    // Version source check
    if manifest.version_from.is_empty() {
        errors.push(ValidationError {
            message: "version_from must not be empty".to_string(),
        });
    }

    // Script checks
    if manifest.scripts.is_empty() {
        errors.push(ValidationError {
            message: "scripts must list at least one script".to_string(),
        });
    }
    for (i, script) in manifest.scripts.iter().enumerate() {
        if script.is_empty() {
            errors.push(ValidationError {
                message: format!("scripts[{}] is empty", i),
            });
        }
        if manifest.scripts[..i].contains(script) {
            errors.push(ValidationError {
                message: format!("duplicate script entry '{}'", script),
            });
        }
    }

    // Requirement checks
    for spec in &manifest.requires {
        if let Err(e) = requirement::parse_requirement(spec) {
            errors.push(ValidationError { message: e });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ep002_parse_valid() {
        let yaml = r#"
schema: "1.0"
package:
  name: thermod-monitor-dbstats
  description: "Thermod DB-Stats monitor."
version_from: thermod-monitor-dbstats
scripts:
  - thermod-monitor-dbstats
requires:
  - "thermod >= 1.2.0"
  - "requests >= 2.4.3"
"#;
        let manifest = parse_manifest(yaml).unwrap();
        assert_eq!(manifest.package.name, "thermod-monitor-dbstats");
        let errors = validate_manifest(&manifest);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_ep002_bad_schema() {
        let yaml = r#"
schema: "2.0"
package:
  name: pkg
version_from: pkg
scripts: [pkg]
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("schema")));
    }

    #[test]
    fn test_ep002_bad_name() {
        let yaml = r#"
schema: "1.0"
package:
  name: "Has Spaces"
version_from: pkg
scripts: [pkg]
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("package.name")));
    }

    #[test]
    fn test_ep002_no_scripts() {
        let yaml = r#"
schema: "1.0"
package:
  name: pkg
version_from: pkg
scripts: []
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("at least one script")));
    }

    #[test]
    fn test_ep002_duplicate_script() {
        let yaml = r#"
schema: "1.0"
package:
  name: pkg
version_from: pkg
scripts: [pkg, pkg]
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("duplicate script")));
    }

    #[test]
    fn test_ep002_bad_requirement() {
        let yaml = r#"
schema: "1.0"
package:
  name: pkg
version_from: pkg
scripts: [pkg]
requires:
  - "thermod >= not.a.version"
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("thermod")));
    }

    #[test]
    fn test_ep002_empty_version_from() {
        let yaml = r#"
schema: "1.0"
package:
  name: pkg
version_from: ""
scripts: [pkg]
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let errors = validate_manifest(&manifest);
        assert!(errors.iter().any(|e| e.message.contains("version_from")));
    }

    #[test]
    fn test_ep002_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empacar.yaml");
        std::fs::write(
            &path,
            r#"
schema: "1.0"
package:
  name: file-test
version_from: file-test
scripts: [file-test]
"#,
        )
        .unwrap();
        let manifest = parse_manifest_file(&path).unwrap();
        assert_eq!(manifest.package.name, "file-test");
    }

    #[test]
    fn test_ep002_parse_invalid_yaml() {
        let result = parse_manifest("not: [valid: yaml: {{");
        assert!(result.is_err());
    }

    #[test]
    fn test_ep002_parse_missing_file() {
        let result = parse_manifest_file(Path::new("/nonexistent/empacar.yaml"));
        assert!(result.is_err());
    }
}
