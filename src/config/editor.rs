//! Editor settings files as a configuration source.
//!
//! Settings files are JSON with comments and trailing commas. The Jenkins block
//! lives under either `"jenkins-mcp-server" → "jenkins"` or
//! `"mcp" → "servers" → "jenkins-mcp-server" → "jenkinsConfig"`.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::JenkinsOverrides;

// Strings are matched first so comment markers inside them survive.
const COMMENT_PATTERN: &str = r#"("(?:\\.|[^"\\])*")|//[^\n]*|/\*[\s\S]*?\*/"#;
const TRAILING_COMMA_PATTERN: &str = r#"("(?:\\.|[^"\\])*")|,(\s*[}\]])"#;

/// Ordered list of settings files; the first one holding a Jenkins block wins.
#[derive(Debug, Clone)]
pub struct EditorSettingsLoader {
    paths: Vec<PathBuf>,
}

impl EditorSettingsLoader {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Workspace settings in the current directory, then the user settings of
    /// the stable and insiders editions on each platform.
    pub fn standard() -> Self {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(".vscode").join("settings.json"));
        }
        if let Some(home) = dirs::home_dir() {
            for edition in ["Code", "Code - Insiders"] {
                paths.push(
                    home.join("Library/Application Support")
                        .join(edition)
                        .join("User/settings.json"),
                );
                paths.push(home.join(".config").join(edition).join("User/settings.json"));
                paths.push(
                    home.join("AppData/Roaming")
                        .join(edition)
                        .join("User/settings.json"),
                );
            }
        }
        Self::new(paths)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns the first Jenkins block found. Unreadable or malformed files are
    /// skipped.
    pub fn load(&self) -> Option<JenkinsOverrides> {
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            debug!("Checking editor settings: {}", path.display());
            match Self::load_file(path) {
                Some(overrides) => {
                    info!("Loaded Jenkins settings from: {}", path.display());
                    return Some(overrides);
                }
                None => continue,
            }
        }

        debug!("No Jenkins settings found in editor settings");
        None
    }

    fn load_file(path: &Path) -> Option<JenkinsOverrides> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Error reading {}: {}", path.display(), e);
                return None;
            }
        };

        let settings = parse_jsonc(&content)?;
        let block = find_jenkins_block(&settings)?;
        match serde_json::from_value(block.clone()) {
            Ok(overrides) => Some(overrides),
            Err(e) => {
                warn!("Ignoring Jenkins settings in {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Parses JSON with `//` and `/* */` comments and trailing commas.
pub fn parse_jsonc(content: &str) -> Option<Value> {
    if content.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(content) {
        return Some(value);
    }

    let comments = Regex::new(COMMENT_PATTERN).ok()?;
    let trailing = Regex::new(TRAILING_COMMA_PATTERN).ok()?;

    let keep_strings = |caps: &Captures| {
        caps.get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    let stripped = comments.replace_all(content, keep_strings);
    let cleaned = trailing.replace_all(&stripped, |caps: &Captures| match caps.get(1) {
        Some(string) => string.as_str().to_string(),
        None => caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    });

    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse settings file: {}", e);
            None
        }
    }
}

/// Locates a non-empty Jenkins block in a parsed settings document.
pub fn find_jenkins_block(settings: &Value) -> Option<&Value> {
    let non_empty = |v: &&Value| v.as_object().is_some_and(|o| !o.is_empty());

    settings
        .pointer("/jenkins-mcp-server/jenkins")
        .filter(non_empty)
        .or_else(|| {
            settings
                .pointer("/mcp/servers/jenkins-mcp-server/jenkinsConfig")
                .filter(non_empty)
        })
}
