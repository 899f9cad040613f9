use std::sync::LazyLock;

use regex::Regex;

static GO_PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^package\s+(\w+)").expect("valid regex"));

static GO_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^func\s+(\([^)\n]+\)\s+)?(\w+)\s*(\[[^\]\n]*\])?\s*\([^)\n]*\)[^{\n]*")
        .expect("valid regex")
});

static GO_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^type\s+(\w+)\s+(struct|interface)\s*\{").expect("valid regex")
});

/// Regex-based Go signature extraction for files the parser rejects.
///
/// Three independent passes (package line, function-shaped lines, struct and
/// interface headers); each may under- or over-match, none can fail.
pub fn extract_go(content: &str) -> String {
    let mut b = String::new();

    if let Some(cap) = GO_PACKAGE.captures(content) {
        b.push_str("package ");
        b.push_str(&cap[1]);
        b.push_str("\n\n");
    }

    for m in GO_FUNC.find_iter(content) {
        b.push_str(m.as_str().trim());
        b.push('\n');
    }

    for cap in GO_TYPE.captures_iter(content) {
        b.push_str("type ");
        b.push_str(&cap[1]);
        b.push(' ');
        b.push_str(&cap[2]);
        b.push_str(" {...}\n");
    }

    b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_run_independently() {
        let content = r#"package broken

type Server struct {
	addr string

func (s *Server) Start(ctx context.Context) error {
	return nil
}

type Handler interface {
	Handle()
}

func Map[T any](xs []T, f func(T) T) []T {
"#;
        let result = extract_go(content);
        assert!(result.starts_with("package broken\n\n"));
        assert!(result.contains("func (s *Server) Start(ctx context.Context) error\n"));
        assert!(result.contains("type Server struct {...}\n"));
        assert!(result.contains("type Handler interface {...}\n"));
        assert!(!result.contains("return nil"));
    }

    #[test]
    fn test_unclosed_parameter_list_is_not_swallowed() {
        let content = "package main\n\nfunc broken( {\n}\n\nfunc valid() string {\n\treturn \"ok\"\n}\n";
        let result = extract_go(content);
        assert_eq!(result, "package main\n\nfunc valid() string\n");
    }

    #[test]
    fn test_garbage_yields_empty() {
        assert_eq!(extract_go("}}}{{{ not go at all"), "");
        assert_eq!(extract_go(""), "");
    }
}
