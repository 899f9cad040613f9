use std::fmt::Write as _;

use tracing::debug;

use super::{regex_fallback, SignatureExtractor};

/// A top-level Go declaration, bodies and values dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Package(String),
    /// The import block, collapsed
    Imports,
    Type {
        name: String,
        type_params: Option<String>,
        body: TypeBody,
    },
    Value {
        keyword: ValueKeyword,
        names: Vec<String>,
    },
    Func(FuncSig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeBody {
    Struct { fields: usize },
    Interface { methods: usize },
    Alias,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKeyword {
    Const,
    Var,
}

impl ValueKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKeyword::Const => "const",
            ValueKeyword::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncSig {
    pub receiver: Option<Param>,
    pub name: String,
    pub type_params: Option<String>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// One parameter group: `a, b int` has two names and one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub names: Vec<String>,
    pub ty: String,
}

impl Param {
    fn render(&self) -> String {
        if self.names.is_empty() {
            self.ty.clone()
        } else {
            format!("{} {}", self.names.join(", "), self.ty)
        }
    }
}

fn render_params(params: &[Param]) -> String {
    params.iter().map(Param::render).collect::<Vec<_>>().join(", ")
}

impl FuncSig {
    pub fn render(&self) -> String {
        let mut line = String::from("func ");
        if let Some(recv) = &self.receiver {
            let _ = write!(line, "({}) ", recv.render());
        }
        line.push_str(&self.name);
        if let Some(tp) = &self.type_params {
            line.push_str(tp);
        }
        let _ = write!(line, "({})", render_params(&self.params));

        match self.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                line.push(' ');
                line.push_str(&single.ty);
            }
            results => {
                let _ = write!(line, " ({})", render_params(results));
            }
        }
        line
    }
}

/// Render parsed declarations in source order
pub fn render(decls: &[Decl]) -> String {
    let mut b = String::new();
    for decl in decls {
        match decl {
            Decl::Package(name) => {
                let _ = write!(b, "package {}\n\n", name);
            }
            Decl::Imports => {
                // Several import declarations still collapse to one placeholder
                if !b.contains("import (...)\n") {
                    b.push_str("import (...)\n\n");
                }
            }
            Decl::Type { name, type_params, body } => {
                let tp = type_params.as_deref().unwrap_or("");
                match body {
                    TypeBody::Struct { fields: 0 } => {
                        let _ = writeln!(b, "type {}{} struct {{}}", name, tp);
                    }
                    TypeBody::Struct { fields } => {
                        let _ = writeln!(b, "type {}{} struct {{ /* {} fields */ }}", name, tp, fields);
                    }
                    TypeBody::Interface { methods: 0 } => {
                        let _ = writeln!(b, "type {}{} interface {{}}", name, tp);
                    }
                    TypeBody::Interface { methods } => {
                        let _ = writeln!(b, "type {}{} interface {{ /* {} methods */ }}", name, tp, methods);
                    }
                    TypeBody::Alias => {
                        let _ = writeln!(b, "type {}{} = ...", name, tp);
                    }
                    TypeBody::Other => {
                        let _ = writeln!(b, "type {}{} ...", name, tp);
                    }
                }
            }
            Decl::Value { keyword, names } => {
                let _ = writeln!(b, "{} {} ...", keyword.as_str(), names.join(", "));
            }
            Decl::Func(sig) => {
                b.push_str(&sig.render());
                b.push('\n');
            }
        }
    }
    b
}

/// Go: structural parse, regex passes when the file does not parse
pub struct GoExtractor;

impl SignatureExtractor for GoExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn extract(&self, path: &str, content: &str) -> String {
        match parse(content) {
            Some(decls) => render(&decls),
            None => {
                debug!(path, "structural parse failed, using regex fallback");
                regex_fallback::extract_go(content)
            }
        }
    }
}

#[cfg(feature = "go-parser")]
fn parse(content: &str) -> Option<Vec<Decl>> {
    match super::ts_engine::parse_go(content) {
        Ok(decls) => Some(decls),
        Err(super::ts_engine::ParseFailure::Syntax { row }) => {
            debug!(row, "go parse rejected at syntax error");
            None
        }
        Err(failure) => {
            debug!(?failure, "go parse rejected");
            None
        }
    }
}

#[cfg(not(feature = "go-parser"))]
fn parse(_content: &str) -> Option<Vec<Decl>> {
    None
}

#[cfg(all(test, feature = "go-parser"))]
mod tests {
    use super::*;

    const AUTH: &str = r#"package auth

import (
	"context"
	"fmt"
)

// Handler manages authentication
type Handler struct {
	db    *sql.DB
	cache *redis.Client
}

// Config holds configuration
type Config struct {
	Secret string
	TTL    int
}

// Authenticator defines auth interface
type Authenticator interface {
	Authenticate(ctx context.Context, token string) (bool, error)
	Refresh(token string) (string, error)
}

// Login authenticates a user
func (h *Handler) Login(ctx context.Context, req LoginRequest) (*Token, error) {
	user, err := h.db.GetUser(req.Username)
	if err != nil {
		return nil, fmt.Errorf("get user: %w", err)
	}
	return &Token{Value: "token"}, nil
}

// Logout invalidates the token
func (h *Handler) Logout(ctx context.Context, token string) error {
	return h.cache.Delete(token)
}

// NewHandler creates a new handler
func NewHandler(db *sql.DB, cache *redis.Client) *Handler {
	return &Handler{db: db, cache: cache}
}

var defaultTimeout = 30
const maxRetries = 3
"#;

    #[test]
    fn test_extract_go_signatures() {
        let result = GoExtractor.extract("auth.go", AUTH);

        assert!(result.starts_with("package auth\n\nimport (...)\n\n"));
        assert!(result.contains("type Handler struct { /* 2 fields */ }"));
        assert!(result.contains("type Config struct { /* 2 fields */ }"));
        assert!(result.contains("type Authenticator interface { /* 2 methods */ }"));
        assert!(result.contains(
            "func (h *Handler) Login(ctx context.Context, req LoginRequest) (*Token, error)\n"
        ));
        assert!(result.contains("func (h *Handler) Logout(ctx context.Context, token string) error\n"));
        assert!(result.contains("func NewHandler(db *sql.DB, cache *redis.Client) *Handler\n"));
        assert!(result.contains("var defaultTimeout ...\n"));
        assert!(result.contains("const maxRetries ...\n"));
    }

    #[test]
    fn test_bodies_and_values_are_omitted() {
        let result = GoExtractor.extract("auth.go", AUTH);

        for body_token in ["GetUser", "fmt.Errorf", "Delete", "\"token\"", "30", "Secret", "Refresh"] {
            assert!(!result.contains(body_token), "leaked {body_token}:\n{result}");
        }
        assert!(!result.contains("\"context\""));
    }

    #[test]
    fn test_declaration_order_is_source_order() {
        let result = GoExtractor.extract("auth.go", AUTH);
        let order = ["type Handler", "type Config", "type Authenticator", "Login(", "Logout(", "NewHandler(", "var defaultTimeout", "const maxRetries"];
        let positions: Vec<usize> = order.iter().map(|needle| result.find(needle).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{result}");
    }

    #[test]
    fn test_multiline_params_are_collapsed() {
        let content = "package a\n\nfunc Run(\n\tctx context.Context,\n\topts ...Option,\n) (n int, err error) {\n\treturn 0, nil\n}\n";
        let result = GoExtractor.extract("a.go", content);
        assert!(result.contains("func Run(ctx context.Context, opts ...Option) (n int, err error)\n"));
    }

    #[test]
    fn test_empty_types_and_grouped_values() {
        let content = "package a\n\ntype Marker struct{}\ntype Any interface{}\ntype Celsius float64\n\nvar (\n\ta, b = 1, 2\n\tc string\n)\n";
        let result = GoExtractor.extract("a.go", content);
        assert!(result.contains("type Marker struct {}\n"));
        assert!(result.contains("type Any interface {}\n"));
        assert!(result.contains("type Celsius ...\n"));
        assert!(result.contains("var a, b ...\n"));
        assert!(result.contains("var c ...\n"));
        assert!(!result.contains("import"));
    }

    #[test]
    fn test_invalid_syntax_falls_back() {
        let content = r#"package main

func broken( {
	// missing closing paren
}

func valid() string {
	return "ok"
}
"#;
        let result = GoExtractor.extract("main.go", content);
        assert!(result.contains("package main"));
        assert!(result.contains("func valid() string"));
        assert!(!result.contains("return \"ok\""));
    }
}
