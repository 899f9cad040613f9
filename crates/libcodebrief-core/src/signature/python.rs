use super::SignatureExtractor;

/// At most this many import lines are kept
const MAX_IMPORTS: usize = 20;

/// Columns a tab counts for when measuring indentation
const TAB_WIDTH: usize = 4;

/// Line-oriented extractor for indentation-structured sources (Python)
pub struct PythonExtractor;

impl SignatureExtractor for PythonExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn extract(&self, _path: &str, content: &str) -> String {
        let mut b = String::new();
        let mut imports = 0usize;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                if imports < MAX_IMPORTS {
                    b.push_str(trimmed);
                    b.push('\n');
                }
                imports += 1;
                continue;
            }

            if trimmed.starts_with("class ") {
                b.push('\n');
                b.push_str(trimmed);
                b.push('\n');
                continue;
            }

            if trimmed.starts_with("def ") || trimmed.starts_with("async def ") {
                let level = indent_width(line) / 4;
                b.push_str(&"    ".repeat(level));
                b.push_str(header(trimmed));
                b.push_str(" ...\n");
                continue;
            }

            if trimmed.starts_with('@') {
                b.push_str(trimmed);
                b.push('\n');
            }
        }

        b
    }
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Cut a `def` line after the colon that opens its body.
///
/// Colons inside the parameter list (annotations, defaults) are skipped by
/// tracking bracket depth. A header continued on later lines is kept whole.
fn header(trimmed: &str) -> &str {
    let mut depth = 0i32;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth <= 0 => return &trimmed[..=idx],
            _ => {}
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: &str = r#"import os
from typing import Optional
from dataclasses import dataclass

@dataclass
class Config:
    secret: str
    ttl: int = 30

class AuthHandler:
    """Handles authentication."""

    def __init__(self, db: Database, cache: Cache) -> None:
        self.db = db
        self.cache = cache

    async def login(self, username: str, password: str) -> Optional[Token]:
        """Authenticate user and return token."""
        user = await self.db.get_user(username)
        if not user:
            return None
        return Token(user_id=user.id)

    def logout(self, token: str) -> bool: return self.cache.delete(token)

def create_handler(db: Database) -> AuthHandler:
    cache = Cache()
    return AuthHandler(db, cache)
"#;

    #[test]
    fn test_extract_python_signatures() {
        let result = PythonExtractor.extract("auth.py", AUTH);

        assert!(result.contains("import os\n"));
        assert!(result.contains("from typing import Optional\n"));
        assert!(result.contains("@dataclass\n\nclass Config:\n"));
        assert!(result.contains("\nclass AuthHandler:\n"));
        assert!(result.contains("    def __init__(self, db: Database, cache: Cache) -> None: ...\n"));
        assert!(result.contains(
            "    async def login(self, username: str, password: str) -> Optional[Token]: ...\n"
        ));
        assert!(result.contains("    def logout(self, token: str) -> bool: ...\n"));
        assert!(result.contains("\ndef create_handler(db: Database) -> AuthHandler: ...\n"));
    }

    #[test]
    fn test_bodies_are_omitted() {
        let result = PythonExtractor.extract("auth.py", AUTH);
        for body_token in ["get_user", "self.cache.delete", "Cache()", "secret: str", "Handles authentication"] {
            assert!(!result.contains(body_token), "leaked {body_token}:\n{result}");
        }
    }

    #[test]
    fn test_imports_are_capped() {
        let content: String = (0..30).map(|i| format!("import mod{}\n", i)).collect();
        let result = PythonExtractor.extract("many.py", &content);
        assert_eq!(result.lines().count(), MAX_IMPORTS);
        assert!(result.contains("import mod19\n"));
        assert!(!result.contains("import mod20\n"));
    }

    #[test]
    fn test_late_imports_still_count() {
        let content = "def f():\n    import json\n    return json\n";
        let result = PythonExtractor.extract("late.py", content);
        assert_eq!(result, "def f(): ...\nimport json\n");
    }

    #[test]
    fn test_indent_from_tabs_and_multiline_headers() {
        let content = "class A:\n\tdef run(self,\n\t        x):\n\t\tpass\n";
        let result = PythonExtractor.extract("a.py", content);
        assert!(result.contains("    def run(self, ...\n"));
    }
}
