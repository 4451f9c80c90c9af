//! Combat-script loading: a user-picked `.txt` file becomes ordered command lines.
//!
//! Lines are handed to the backend verbatim; nothing here understands script grammar.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SCRIPT_EXTENSION: &str = "txt";
const LINE_BREAK: &str = "\r\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatScript {
    /// File name shown in the form (no directory).
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug)]
pub enum CombatScriptError {
    UnsupportedExtension(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Empty(PathBuf),
}

impl fmt::Display for CombatScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension(path) => {
                write!(f, "combat scripts must be .txt files: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to read combat script {}: {source}", path.display())
            }
            Self::Empty(path) => write!(f, "combat script is empty: {}", path.display()),
        }
    }
}

impl std::error::Error for CombatScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl CombatScript {
    /// The "None Selected" state.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.lines.is_empty()
    }

    /// Read and split a script file, surfacing every failure.
    pub fn try_load(path: &Path) -> Result<Self, CombatScriptError> {
        if !has_script_extension(path) {
            return Err(CombatScriptError::UnsupportedExtension(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| CombatScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.is_empty() {
            return Err(CombatScriptError::Empty(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            lines: parse_lines(&content),
        })
    }

    /// Load the picked file, or fall back to the empty script.
    ///
    /// `None` means the picker was dismissed. Read problems also reset to empty;
    /// they are logged but not returned.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::empty();
        };
        match Self::try_load(path) {
            Ok(script) => {
                tracing::info!(name = %script.name, lines = script.lines.len(), "loaded combat script");
                script
            }
            Err(err) => {
                tracing::warn!("{err}; resetting to empty combat script");
                Self::empty()
            }
        }
    }
}

/// Split on CRLF only; a bare `\n` stays inside its line.
#[must_use]
pub fn parse_lines(content: &str) -> Vec<String> {
    content.split(LINE_BREAK).map(str::to_string).collect()
}

#[must_use]
pub fn has_script_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_script(suffix: &str, content: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();
        let path = env::temp_dir().join(format!("gbf-combat-{nanos}-{suffix}"));
        fs::write(&path, content).expect("write temp script");
        path
    }

    #[test]
    fn parse_lines_splits_on_crlf() {
        assert_eq!(parse_lines("a\r\nb\r\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_lines_keeps_bare_newlines_and_trailing_blank() {
        assert_eq!(parse_lines("a\nb\r\n"), vec!["a\nb", ""]);
    }

    #[test]
    fn load_none_returns_empty_script() {
        let script = CombatScript::load(None);
        assert_eq!(script.name, "");
        assert!(script.lines.is_empty());
        assert!(script.is_empty());
    }

    #[test]
    fn load_reads_name_and_lines() {
        let path = temp_script("full_auto.txt", "// Turn 1\r\ncharacter1.useSkill(1)\r\nend");
        let script = CombatScript::load(Some(&path));
        let expected_name = path.file_name().expect("file name").to_string_lossy();
        assert_eq!(script.name, expected_name);
        assert_eq!(script.lines, vec!["// Turn 1", "character1.useSkill(1)", "end"]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_missing_file_falls_back_to_empty() {
        let path = env::temp_dir().join("gbf-combat-definitely-missing.txt");
        assert!(CombatScript::load(Some(&path)).is_empty());
        assert!(matches!(
            CombatScript::try_load(&path),
            Err(CombatScriptError::Io { .. })
        ));
    }

    #[test]
    fn load_empty_file_falls_back_to_empty() {
        let path = temp_script("blank.txt", "");
        assert!(CombatScript::load(Some(&path)).is_empty());
        assert!(matches!(
            CombatScript::try_load(&path),
            Err(CombatScriptError::Empty(_))
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn non_txt_files_are_rejected() {
        let path = temp_script("script.json", "a\r\nb");
        assert!(matches!(
            CombatScript::try_load(&path),
            Err(CombatScriptError::UnsupportedExtension(_))
        ));
        assert!(CombatScript::load(Some(&path)).is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(has_script_extension(Path::new("Script.TXT")));
        assert!(!has_script_extension(Path::new("script")));
    }
}
