/* src/renderer/src/ast.rs */

#[derive(Debug, PartialEq)]
pub(crate) enum Node {
  Text(String),
  Call(Call),
  If { path: String, then_nodes: Vec<Node>, else_nodes: Vec<Node> },
  Each { path: String, body_nodes: Vec<Node> },
}

/// The engine operations a template can invoke.
#[derive(Debug, PartialEq)]
pub(crate) enum Call {
  Translate { args: Vec<Expr> },
  TranslateReturning { args: Vec<Expr> },
  StartBlock { name: String },
  EndBlock { name: String },
  RenderBlock { name: String, fallback: Option<Expr> },
  Render { template: String, bindings: Vec<(String, Expr)> },
}

/// Argument expressions. Paths resolve dot-wise against the render data;
/// `$` / `$$` are the each-loop item scopes.
#[derive(Debug, PartialEq)]
pub(crate) enum Expr {
  Str(String),
  Int(i64),
  Path(String),
  Len(String),
  TranslateReturning(Vec<Expr>),
}
