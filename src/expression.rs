//! Hook expression classification
//!
//! A hook `expr` must be a pure scalar expression: literals, column
//! references, operators, `CASE`, `CAST` and function application. The
//! classifier parses the text with `sqlparser` and inspects the resulting
//! tree; it never evaluates or rewrites anything. Keywords appearing as
//! parts of identifiers (`selected_flag`, `from_date`) are therefore not
//! mistaken for clauses.
//!
//! Functions are not allow-listed. Only subqueries, statements and the
//! fixed set of non-deterministic functions below are singled out.

use serde::Serialize;
use sqlparser::ast::{Expr, ObjectName, Query, Visit, Visitor};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;
use std::fmt;
use std::ops::ControlFlow;

/// Function names whose result varies between evaluations
pub const NON_DETERMINISTIC_FUNCTIONS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOW",
    "GETDATE",
    "GETUTCDATE",
    "SYSDATE",
    "SYSDATETIME",
    "SYSTIMESTAMP",
    "RANDOM",
    "RAND",
    "NEWID",
    "UUID",
    "GEN_RANDOM_UUID",
    "UUID_GENERATE_V4",
];

/// Keywords some engines accept without parentheses. Only these are
/// flagged when they appear as bare, unquoted identifiers.
const NILADIC_PSEUDO_COLUMNS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "SYSDATE",
    "SYSTIMESTAMP",
];

/// Result of classifying one expression string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ExprClass {
    /// Blank input
    Empty,
    /// Neither an expression nor a statement
    Unparseable { message: String },
    /// A complete statement (`SELECT`, `INSERT`, `CREATE`, ...)
    Statement { kind: String },
    /// An expression embedding a query anywhere in its tree
    Subquery,
    /// Acceptable, but calls a non-deterministic function
    NonDeterministic { function: String },
    Pure,
}

impl ExprClass {
    /// Whether the expression must be rejected
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Unparseable { .. } | Self::Statement { .. } | Self::Subquery
        )
    }
}

impl fmt::Display for ExprClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Unparseable { message } => write!(f, "unparseable: {message}"),
            Self::Statement { kind } => write!(f, "{kind} statement"),
            Self::Subquery => write!(f, "contains subquery"),
            Self::NonDeterministic { function } => write!(f, "non-deterministic ({function})"),
            Self::Pure => write!(f, "pure expression"),
        }
    }
}

/// Classify a hook expression
pub fn classify(expr: &str) -> ExprClass {
    let text = expr.trim();
    if text.is_empty() {
        return ExprClass::Empty;
    }

    let dialect = GenericDialect {};
    match parse_single_expr(&dialect, text) {
        Ok(parsed) => inspect(&parsed),
        Err(expr_err) => match Parser::parse_sql(&dialect, text) {
            Ok(statements) if !statements.is_empty() => ExprClass::Statement {
                kind: leading_keyword(text),
            },
            _ => ExprClass::Unparseable {
                message: expr_err.to_string(),
            },
        },
    }
}

/// Parse exactly one expression; trailing tokens are an error
fn parse_single_expr(dialect: &GenericDialect, text: &str) -> Result<Expr, ParserError> {
    let mut parser = Parser::new(dialect).try_with_sql(text)?;
    let expr = parser.parse_expr()?;
    let next = parser.peek_token();
    if next.token != Token::EOF {
        return Err(ParserError::ParserError(format!(
            "unexpected trailing input starting at '{}'",
            next.token
        )));
    }
    Ok(expr)
}

fn leading_keyword(text: &str) -> String {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|word| !word.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_default()
}

fn inspect(expr: &Expr) -> ExprClass {
    let mut visitor = ShapeVisitor::default();
    if expr.visit(&mut visitor).is_break() {
        return ExprClass::Subquery;
    }
    match visitor.non_deterministic {
        Some(function) => ExprClass::NonDeterministic { function },
        None => ExprClass::Pure,
    }
}

/// Breaks on the first nested query. Non-deterministic calls are recorded
/// without breaking so a later subquery still wins.
#[derive(Default)]
struct ShapeVisitor {
    non_deterministic: Option<String>,
}

impl Visitor for ShapeVisitor {
    type Break = ();

    fn pre_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        ControlFlow::Break(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.non_deterministic.is_some() {
            return ControlFlow::Continue(());
        }
        match expr {
            Expr::Function(function) => {
                let name = function_name(&function.name);
                if NON_DETERMINISTIC_FUNCTIONS.contains(&name.as_str()) {
                    self.non_deterministic = Some(name);
                }
            }
            Expr::Identifier(ident) if ident.quote_style.is_none() => {
                let name = ident.value.to_uppercase();
                if NILADIC_PSEUDO_COLUMNS.contains(&name.as_str()) {
                    self.non_deterministic = Some(name);
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

/// Unqualified, upper-cased function name (`pg_catalog.now` -> `NOW`)
fn function_name(name: &ObjectName) -> String {
    let rendered = name.to_string();
    let last = rendered.rsplit('.').next().unwrap_or(rendered.as_str());
    last.trim_matches(|c| c == '"' || c == '`').to_uppercase()
}
