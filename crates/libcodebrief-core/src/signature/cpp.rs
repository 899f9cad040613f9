use super::SignatureExtractor;

/// Brace-counting extractor for block-structured headers and sources (C, C++).
///
/// Braces are counted per line without a tokenizer, so braces inside string
/// literals or comments shift the depth counter. That approximation is
/// accepted; the output only feeds model context.
pub struct BraceExtractor;

impl SignatureExtractor for BraceExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["c", "h", "cpp", "cc", "cxx", "hpp", "hh", "hxx"]
    }

    fn extract(&self, _path: &str, content: &str) -> String {
        let mut scan = Scan::default();
        for line in content.lines() {
            scan.line(line.trim());
        }
        scan.out
    }
}

#[derive(Default)]
struct Scan {
    out: String,
    in_type: bool,
    /// A `{` has been seen since the type header
    opened: bool,
    depth: i32,
    /// Remaining depth of a free function body being skipped
    fn_depth: i32,
    /// Last free function header had neither body nor terminator
    pending_body: bool,
}

impl Scan {
    fn line(&mut self, t: &str) {
        if t.is_empty() {
            return;
        }
        let delta = brace_delta(t);

        if self.fn_depth > 0 {
            self.fn_depth += delta;
            return;
        }
        if self.pending_body {
            self.pending_body = false;
            if t.starts_with('{') {
                self.fn_depth = delta;
                return;
            }
        }

        if self.in_type {
            self.type_member(t, delta);
        } else {
            self.top_level(t, delta);
        }
    }

    fn top_level(&mut self, t: &str, delta: i32) {
        if t.starts_with("#include") || t.starts_with("namespace ") {
            self.emit(t);
            return;
        }

        if is_type_header(t) {
            self.out.push('\n');
            self.emit(t);
            let forward_decl = t.ends_with(';') && !t.contains('{');
            let single_line = t.contains('{') && delta <= 0;
            if !forward_decl && !single_line {
                self.in_type = true;
                self.opened = t.contains('{');
                self.depth = delta;
            }
            return;
        }

        if t.starts_with('#') || is_comment(t) || is_statement(t) {
            return;
        }

        if t.contains('(') && t.contains(')') {
            self.emit(&declaration(t));
            if t.contains('{') {
                if delta > 0 {
                    self.fn_depth = delta;
                }
            } else if !t.ends_with(';') {
                self.pending_body = true;
            }
        }
    }

    fn type_member(&mut self, t: &str, delta: i32) {
        let start_depth = self.depth;
        self.depth += delta;
        if t.contains('{') {
            self.opened = true;
        }

        if self.opened && self.depth <= 0 {
            self.in_type = false;
            self.opened = false;
            self.depth = 0;
            self.emit("};");
            return;
        }

        // Lines inside a member function body
        if start_depth > 1 {
            return;
        }

        if matches!(t, "public:" | "private:" | "protected:") {
            self.emit(t);
            return;
        }

        if t == "{" || is_statement(t) || is_comment(t) {
            return;
        }

        let member_var = t.ends_with(';') && !t.contains('(');
        let method = t.contains('(') && t.contains(')');
        if member_var || method {
            self.out.push_str("    ");
            self.emit(&declaration(t));
        }
    }

    fn emit(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }
}

fn brace_delta(t: &str) -> i32 {
    let opens = t.matches('{').count() as i32;
    let closes = t.matches('}').count() as i32;
    opens - closes
}

fn is_type_header(t: &str) -> bool {
    t.starts_with("class ") || t.starts_with("struct ")
}

fn is_comment(t: &str) -> bool {
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}

fn is_statement(t: &str) -> bool {
    ["return ", "return;", "if ", "if(", "for ", "for(", "while ", "while("]
        .iter()
        .any(|p| t.starts_with(p))
}

/// Strip an inline body and make sure the line ends with a terminator
fn declaration(t: &str) -> String {
    let sig = match t.find('{') {
        Some(idx) if idx > 0 => t[..idx].trim_end(),
        _ => t,
    };
    if sig.ends_with(';') {
        sig.to_string()
    } else {
        format!("{};", sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: &str = r#"#include <string>
#include <memory>

namespace auth {

class Database;

class Config {
public:
    std::string secret;
    int ttl = 30;
};

class Handler {
public:
    Handler(Database* db, Cache* cache);
    ~Handler();

    Token* login(const std::string& username, const std::string& password);
    bool logout(const std::string& token);
    int retries() const { return retries_; }

private:
    Database* db_;
    Cache* cache_;
    int retries_;

    bool validatePassword(const std::string& password, const std::string& hash) {
        // implementation
        audit(password);
        return password == hash;
    }
};

Handler* createHandler(Database* db);

int run(int argc, char** argv) {
    setup(argc);
    return 0;
}

}  // namespace auth
"#;

    #[test]
    fn test_extract_cpp_signatures() {
        let result = BraceExtractor.extract("auth.hpp", AUTH);

        assert!(result.contains("#include <string>\n#include <memory>\n"));
        assert!(result.contains("namespace auth {\n"));
        assert!(result.contains("\nclass Database;\n"));
        assert!(result.contains("\nclass Config {\npublic:\n    std::string secret;\n    int ttl = 30;\n};\n"));
        assert!(result.contains("    Handler(Database* db, Cache* cache);\n"));
        assert!(result.contains("    ~Handler();\n"));
        assert!(result.contains("    Token* login(const std::string& username, const std::string& password);\n"));
        assert!(result.contains("    bool logout(const std::string& token);\n"));
        assert!(result.contains("    int retries() const;\n"));
        assert!(result.contains("private:\n"));
        assert!(result.contains("    Database* db_;\n"));
        assert!(result.contains(
            "    bool validatePassword(const std::string& password, const std::string& hash);\n};\n"
        ));
        assert!(result.contains("Handler* createHandler(Database* db);\n"));
        assert!(result.contains("int run(int argc, char** argv);\n"));
    }

    #[test]
    fn test_bodies_are_omitted() {
        let result = BraceExtractor.extract("auth.cpp", AUTH);
        for body_token in ["return password == hash", "audit(", "setup(", "return 0", "implementation", "return retries_"] {
            assert!(!result.contains(body_token), "leaked {body_token}:\n{result}");
        }
    }

    #[test]
    fn test_brace_on_next_line() {
        let content = "struct Point\n{\n    int x;\n    int y;\n};\n\nint main()\n{\n    printf(\"hi\");\n    return 0;\n}\n";
        let result = BraceExtractor.extract("point.c", content);
        assert_eq!(result, "\nstruct Point\n    int x;\n    int y;\n};\nint main();\n");
    }

    #[test]
    fn test_single_line_type_does_not_open_body() {
        let content = "struct P { int x; };\nvoid draw(P p);\n";
        let result = BraceExtractor.extract("p.h", content);
        assert_eq!(result, "\nstruct P { int x; };\nvoid draw(P p);\n");
    }

    #[test]
    fn test_brace_in_string_desyncs_depth() {
        // Known approximation: the `{` inside the literal keeps the body open
        let content = "class A {\npublic:\n    const char* open = \"{\";\n};\nvoid after();\n";
        let result = BraceExtractor.extract("a.hpp", content);
        assert!(!result.contains("};\n"));
    }
}
