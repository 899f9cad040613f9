//! Declarations-only renderings of source files.
//!
//! Every language is one [`SignatureExtractor`] registered against the file
//! extensions it understands. Files nobody claims are truncated instead.

mod cpp;
mod go;
mod python;
mod regex_fallback;
#[cfg(feature = "go-parser")]
mod ts_engine;

use std::collections::HashMap;
use std::path::Path;

pub use cpp::BraceExtractor;
pub use go::GoExtractor;
pub use python::PythonExtractor;

/// Number of lines kept for files without a dedicated extractor
pub const TRUNCATE_LINES: usize = 30;

/// Marker line appended after a truncated rendering
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// One language's way of condensing a file to its declarations.
///
/// Implementations must never fail: whatever partial text they can recover
/// (possibly nothing) is the result.
pub trait SignatureExtractor: Send + Sync {
    /// Lowercase extensions, without the dot, handled by this extractor
    fn extensions(&self) -> &'static [&'static str];

    fn extract(&self, path: &str, content: &str) -> String;
}

/// Extension-keyed table of extractors
pub struct ExtractorRegistry {
    by_extension: HashMap<&'static str, usize>,
    extractors: Vec<Box<dyn SignatureExtractor>>,
}

impl ExtractorRegistry {
    /// An empty registry; every file is truncated
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
            extractors: Vec::new(),
        }
    }

    /// Register an extractor for all of its extensions.
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, extractor: Box<dyn SignatureExtractor>) {
        let idx = self.extractors.len();
        for ext in extractor.extensions() {
            self.by_extension.insert(ext, idx);
        }
        self.extractors.push(extractor);
    }

    pub fn with(mut self, extractor: impl SignatureExtractor + 'static) -> Self {
        self.register(Box::new(extractor));
        self
    }

    fn lookup(&self, path: &str) -> Option<&dyn SignatureExtractor> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        let idx = *self.by_extension.get(ext.as_str())?;
        self.extractors.get(idx).map(|e| e.as_ref())
    }

    pub fn extract(&self, path: &str, content: &str) -> String {
        match self.lookup(path) {
            Some(extractor) => extractor.extract(path, content),
            None => truncate_lines(content, TRUNCATE_LINES),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::empty()
            .with(GoExtractor)
            .with(PythonExtractor)
            .with(BraceExtractor)
    }
}

/// Condense `content` using the default registry
pub fn extract_signature(path: &str, content: &str) -> String {
    ExtractorRegistry::default().extract(path, content)
}

/// Keep the first `max_lines` lines and append a truncation marker.
/// Content that already fits is returned unchanged.
///
/// Lines are counted by splitting on `\n`, so a trailing newline counts as
/// an extra empty line: a 30-line file ending in `\n` is truncated at 30.
pub fn truncate_lines(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }
    let mut out = lines[..max_lines].join("\n");
    out.push('\n');
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_truncated() {
        let content = format!("line 1\nline 2\nline 3\n{}", "line N\n".repeat(50));
        let result = extract_signature("test.xyz", &content);

        let lines: Vec<&str> = result.split('\n').collect();
        assert_eq!(lines.len(), TRUNCATE_LINES + 1);
        assert_eq!(lines[0], "line 1");
        assert_eq!(lines[TRUNCATE_LINES], TRUNCATION_MARKER);
    }

    #[test]
    fn test_trailing_newline_counts_as_a_line() {
        let content: String = (1..=TRUNCATE_LINES).map(|i| format!("l{}\n", i)).collect();
        let result = truncate_lines(&content, TRUNCATE_LINES);

        let lines: Vec<&str> = result.split('\n').collect();
        assert_eq!(lines.len(), TRUNCATE_LINES + 1);
        assert_eq!(lines[TRUNCATE_LINES - 1], format!("l{}", TRUNCATE_LINES));
        assert_eq!(lines[TRUNCATE_LINES], TRUNCATION_MARKER);

        let fits = content.trim_end_matches('\n');
        assert_eq!(truncate_lines(fits, TRUNCATE_LINES), fits);
    }

    #[test]
    fn test_short_unknown_file_is_unchanged() {
        let content = "resource \"x\" \"y\" {\n  a = 1\n}\n";
        assert_eq!(extract_signature("main.tf", content), content);
    }

    #[test]
    fn test_extension_without_dot_and_missing_extension() {
        assert_eq!(extract_signature("Makefile", "all:\n\tgo build\n"), "all:\n\tgo build\n");
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let content = "import os\n\ndef run():\n    return 1\n";
        let result = extract_signature("TOOL.PY", content);
        assert!(result.contains("def run(): ..."));
        assert!(!result.contains("return 1"));
    }

    #[test]
    fn test_registration_replaces_extension() {
        struct Shout;
        impl SignatureExtractor for Shout {
            fn extensions(&self) -> &'static [&'static str] {
                &["py"]
            }
            fn extract(&self, _path: &str, content: &str) -> String {
                content.to_uppercase()
            }
        }

        let registry = ExtractorRegistry::default().with(Shout);
        assert_eq!(registry.extract("a.py", "def f(): pass"), "DEF F(): PASS");
        // Other languages are untouched
        assert!(registry.extract("a.go", "package a\n").contains("package a"));
    }

    #[test]
    fn test_empty_registry_truncates_everything() {
        let registry = ExtractorRegistry::empty();
        let content = "package a\n\nfunc f() {\n\tbody()\n}\n";
        assert_eq!(registry.extract("a.go", content), content);
    }
}
