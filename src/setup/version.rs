//! Version comparison and migration logic.
//!
//! Handles checking if setup is needed by comparing the embedded version with
//! the config file version.

use anyhow::anyhow;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parse a version string like "0.1.0" into a SemanticVersion
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            ));
        }

        let major = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid major version: '{}'", parts[0]))?;
        let minor = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid minor version: '{}'", parts[1]))?;
        let patch = parts[2]
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid patch version: '{}'", parts[2]))?;

        Ok(SemanticVersion {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reads the config version from the first line of the config file using regex.
///
/// Expects the first line to match: `config_version = "X.Y.Z"`
/// The line must start with optional whitespace followed by `config_version`
/// (not a comment).
///
/// # Errors
/// Returns an error if the file can't be read or version parsing fails.
fn read_config_version_from_file(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow!("Failed to read config file: {e}"))?;
    let first_line = match content.lines().next() {
        Some(line) => line,
        None => return Ok(None),
    };

    let version_regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)
        .map_err(|e| anyhow!("Invalid version regex: {e}"))?;

    Ok(version_regex
        .captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Checks whether setup should run.
///
/// Returns:
/// - `Some(old_version)` if the config is missing (old version "none") or
///   carries an older version than the running binary
/// - `None` if the config exists and its version is current
///
/// # Errors
/// Returns an error if the config file cannot be read or versions fail to parse.
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    let config_version = match read_config_version_from_file(config_path)? {
        Some(version) => version,
        None => return Ok(Some("none".to_string())),
    };

    let current = SemanticVersion::parse(CURRENT_VERSION)?;
    let configured = SemanticVersion::parse(&config_version)?;

    if configured < current {
        Ok(Some(config_version))
    } else {
        Ok(None)
    }
}

/// Rewrites the `config_version` line in the config file to the current version.
///
/// # Errors
/// Returns an error if the config file cannot be read or written.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow!("Failed to read config file: {e}"))?;

    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let version_regex = Regex::new(r#"(?m)^\s*config_version\s*=\s*"[^"]+"\s*$"#)
        .map_err(|e| anyhow!("Invalid version regex: {e}"))?;

    let updated = if version_regex.is_match(&content) {
        version_regex.replace(&content, version_line.as_str()).to_string()
    } else {
        format!("{version_line}\n{content}")
    };

    std::fs::write(config_path, updated)
        .map_err(|e| anyhow!("Failed to write config file: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_part_versions() {
        let v = SemanticVersion::parse("1.2.3").unwrap();
        assert_eq!(v.to_string(), "1.2.3");
        assert!(SemanticVersion::parse("1.2").is_err());
        assert!(SemanticVersion::parse("a.b.c").is_err());
    }

    #[test]
    fn ordering_compares_numerically() {
        let old = SemanticVersion::parse("0.9.9").unwrap();
        let new = SemanticVersion::parse("0.10.0").unwrap();
        assert!(old < new);
    }

    #[test]
    fn missing_config_requests_setup() {
        let needed = check_setup_needed(Path::new("/nonexistent/medscribe.toml")).unwrap();
        assert_eq!(needed.as_deref(), Some("none"));
    }

    #[test]
    fn current_version_needs_no_setup() {
        let path = std::env::temp_dir().join("medscribe-version-test.toml");
        std::fs::write(
            &path,
            format!("config_version = \"{CURRENT_VERSION}\"\n[audio]\n"),
        )
        .unwrap();
        assert_eq!(check_setup_needed(&path).unwrap(), None);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn older_version_requests_setup_and_reports_it() {
        let path = std::env::temp_dir().join("medscribe-version-old-test.toml");
        std::fs::write(&path, "config_version = \"0.0.1\"\n[audio]\n").unwrap();
        assert_eq!(check_setup_needed(&path).unwrap().as_deref(), Some("0.0.1"));

        update_config_version(&path).unwrap();
        assert_eq!(check_setup_needed(&path).unwrap(), None);
        std::fs::remove_file(&path).ok();
    }
}
