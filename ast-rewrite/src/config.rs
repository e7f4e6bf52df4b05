use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file; wins over any path passed in.
pub const CONFIG_ENV_VAR: &str = "AST_REWRITE_CONFIG";

/// How the outermost layer of a synthesized declarator is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaratorStyle {
    /// Keep array dimensions as declared (`int m[3][4]`).
    /// A bare function type still becomes a function pointer.
    Exact,
    /// Declare something that can be assigned or returned: an outermost
    /// array decays to a pointer to its element (`int (*m)[4]`).
    Assignable,
}

impl Default for DeclaratorStyle {
    fn default() -> Self {
        DeclaratorStyle::Exact
    }
}

impl std::fmt::Display for DeclaratorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclaratorStyle::Exact => write!(f, "exact"),
            DeclaratorStyle::Assignable => write!(f, "assignable"),
        }
    }
}

impl std::str::FromStr for DeclaratorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(DeclaratorStyle::Exact),
            "assignable" => Ok(DeclaratorStyle::Assignable),
            _ => Err(format!(
                "Invalid declarator style: {}. Valid values are 'exact' or 'assignable'",
                s
            )),
        }
    }
}

/// Settings for a rewrite session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Indentation added inside an empty block when appending to it.
    pub indent_unit: String,
    pub newline: String,
    pub declarator_style: DeclaratorStyle,
    /// Type nesting beyond this depth falls back to a bare declarator.
    pub max_type_depth: usize,
    pub diff_context_lines: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            newline: "\n".to_string(),
            declarator_style: DeclaratorStyle::default(),
            max_type_depth: 64,
            diff_context_lines: 3,
        }
    }
}

impl RewriteConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse rewrite config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Resolve the config to use.
    ///
    /// Priority order:
    /// 1. File named by AST_REWRITE_CONFIG
    /// 2. The given path, if any
    /// 3. Defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Ok(custom) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(&PathBuf::from(custom));
        }
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_declarator_style_parsing() {
        assert_eq!("Exact".parse::<DeclaratorStyle>().unwrap(), DeclaratorStyle::Exact);
        assert_eq!(
            "assignable".parse::<DeclaratorStyle>().unwrap(),
            DeclaratorStyle::Assignable
        );
        assert!("decayed".parse::<DeclaratorStyle>().is_err());
        assert_eq!(DeclaratorStyle::Assignable.to_string(), "assignable");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RewriteConfig::from_toml_str("indent_unit = \"\\t\"\n").unwrap();
        assert_eq!(config.indent_unit, "\t");
        assert_eq!(config.max_type_depth, 64);
        assert_eq!(config.declarator_style, DeclaratorStyle::Exact);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "declarator_style = \"assignable\"").unwrap();
        writeln!(file, "diff_context_lines = 1").unwrap();

        let config = RewriteConfig::load(file.path()).unwrap();
        assert_eq!(config.declarator_style, DeclaratorStyle::Assignable);
        assert_eq!(config.diff_context_lines, 1);
    }

    #[test]
    fn test_load_reports_path() {
        let err = RewriteConfig::load(Path::new("/nonexistent/rewrite.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rewrite.toml"));
    }
}
