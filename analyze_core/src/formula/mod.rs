//! The formula language: numeric literals, one bound parameter and nested
//! function calls such as `max(mean(x))`.

pub mod lexer;
pub mod parser;

use crate::error::Result;
use std::collections::BTreeSet;

pub use parser::Parser;

/// Placeholder in formula templates that stands for the bound parameter name.
pub const PARAM_PLACEHOLDER: &str = "%s";

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Param(String),
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Names of all functions called anywhere in the expression.
    pub fn functions(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.visit(&mut |expr| {
            if let Expr::Call { name, .. } = expr {
                names.insert(name.as_str());
            }
        });
        names
    }

    /// Names of all parameters referenced anywhere in the expression.
    pub fn params(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.visit(&mut |expr| {
            if let Expr::Param(name) = expr {
                names.insert(name.as_str());
            }
        });
        names
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        if let Expr::Call { args, .. } = self {
            for arg in args {
                arg.visit(f);
            }
        }
    }
}

/// Substitutes the parameter name for every `%s` in a formula template.
pub fn expand(template: &str, param: &str) -> String {
    template.replace(PARAM_PLACEHOLDER, param)
}

pub fn parse(formula: &str) -> Result<Expr> {
    Parser::new(formula)?.parse()
}
