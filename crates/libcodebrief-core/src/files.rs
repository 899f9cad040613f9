//! `### File: <path>` blocks in model output.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::CoreError;

const FILE_HEADER: &str = "### File:";
const FENCE: &str = "```";

/// One file produced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Collect fenced blocks that follow `### File:` headers.
///
/// Only lines inside a fence belong to a file. A header with no fenced
/// lines produces nothing. When a path repeats, the later block wins but
/// keeps the position of the first.
pub fn parse_generated_files(response: &str) -> Vec<GeneratedFile> {
    let mut files: Vec<GeneratedFile> = Vec::new();
    let mut current: Option<String> = None;
    let mut code: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in response.lines() {
        let trimmed = line.trim();

        if let Some(path) = trimmed.strip_prefix(FILE_HEADER) {
            flush(&mut files, current.take(), &code);
            current = Some(path.trim().to_string());
            code.clear();
            in_block = false;
            continue;
        }

        if trimmed.starts_with(FENCE) {
            in_block = !in_block;
            continue;
        }

        if in_block && current.is_some() {
            code.push(line);
        }
    }
    flush(&mut files, current, &code);

    files
}

fn flush(files: &mut Vec<GeneratedFile>, path: Option<String>, code: &[&str]) {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return;
    };
    if code.is_empty() {
        return;
    }
    let content = code.join("\n").trim().to_string();
    match files.iter_mut().find(|f| f.path == path) {
        Some(existing) => existing.content = content,
        None => files.push(GeneratedFile { path, content }),
    }
}

/// Write files under `root`, creating parent directories.
///
/// Paths must stay inside `root`: absolute paths and `..` components are
/// rejected before anything is written.
pub fn write_generated_files(root: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, CoreError> {
    for file in files {
        check_relative(&file.path)?;
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = file.content.clone();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        std::fs::write(&path, content)?;
        debug!(path = %file.path, "wrote generated file");
        written.push(path);
    }

    info!(count = written.len(), "generated files written");
    Ok(written)
}

fn check_relative(path: &str) -> Result<(), CoreError> {
    let escapes = Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes || path.is_empty() {
        return Err(CoreError::InvalidArgs(format!(
            "generated file path must be relative to the repository: {}",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const RESPONSE: &str = r#"Here is the implementation.

### File: internal/auth/handler.go
```go
package auth

func Login() error {
	return nil
}
```

Some commentary that is not code.

### File: internal/auth/token.go
```
package auth
```

### File: docs/empty.md

### File: internal/auth/handler.go
```go
package auth // v2
```
"#;

    #[test]
    fn test_parse_blocks() {
        let files = parse_generated_files(RESPONSE);
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["internal/auth/handler.go", "internal/auth/token.go"]);
        assert_eq!(files[0].content, "package auth // v2");
        assert_eq!(files[1].content, "package auth");
    }

    #[test]
    fn test_parse_keeps_indentation_inside_block() {
        let files = parse_generated_files("### File: a.py\n```\ndef f():\n    return 1\n```\n");
        assert_eq!(files[0].content, "def f():\n    return 1");
    }

    #[test]
    fn test_parse_without_headers() {
        assert!(parse_generated_files("```\ncode\n```").is_empty());
        assert!(parse_generated_files("").is_empty());
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempdir().unwrap();
        let files = parse_generated_files(RESPONSE);
        let written = write_generated_files(dir.path(), &files).unwrap();

        assert_eq!(written.len(), 2);
        let handler = std::fs::read_to_string(dir.path().join("internal/auth/handler.go")).unwrap();
        assert_eq!(handler, "package auth // v2\n");
    }

    #[test]
    fn test_write_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        for bad in ["../outside.go", "/etc/passwd", "a/../../b.go"] {
            let files = vec![
                GeneratedFile {
                    path: "ok.go".to_string(),
                    content: "x".to_string(),
                },
                GeneratedFile {
                    path: bad.to_string(),
                    content: "x".to_string(),
                },
            ];
            let err = write_generated_files(dir.path(), &files).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgs(_)), "{bad}");
            assert!(!dir.path().join("ok.go").exists());
        }
    }
}
