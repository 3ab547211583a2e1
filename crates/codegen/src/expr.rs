//! Boolean expression text with precedence-safe combinators.

use std::fmt;

/// A rendered boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(String);

impl Expr {
    pub fn raw(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn lit(b: bool) -> Self {
        Self(b.to_string())
    }

    pub fn call(name: &str, arg: &str) -> Self {
        Self(format!("{name}({arg})"))
    }

    /// Conjunction. An empty list renders as `true`.
    pub fn and(parts: Vec<Expr>) -> Self {
        Self::join(parts, " && ", true)
    }

    /// Disjunction. An empty list renders as `false`.
    pub fn or(parts: Vec<Expr>) -> Self {
        Self::join(parts, " || ", false)
    }

    pub fn not(inner: Expr) -> Self {
        Self(format!("!({})", inner.0))
    }

    /// `all(items, |var| body)` over the elements of a sequence expression.
    pub fn all(seq: &str, var: &str, body: Expr) -> Self {
        Self(format!("{seq}.all(|{var}| {body})"))
    }

    fn join(parts: Vec<Expr>, sep: &str, empty: bool) -> Self {
        let parts: Vec<Expr> = parts
            .into_iter()
            .filter(|p| p.0 != empty.to_string())
            .collect();
        match parts.len() {
            0 => Self::lit(empty),
            1 => parts.into_iter().next().unwrap_or_else(|| Self::lit(empty)),
            _ => {
                let inner: Vec<String> = parts.into_iter().map(|p| p.0).collect();
                Self(format!("({})", inner.join(sep)))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_drops_trivial_parts() {
        let e = Expr::and(vec![Expr::lit(true), Expr::raw("a"), Expr::raw("b")]);
        assert_eq!(e.as_str(), "(a && b)");
        assert_eq!(Expr::and(vec![]).as_str(), "true");
        assert_eq!(Expr::and(vec![Expr::raw("a")]).as_str(), "a");
    }

    #[test]
    fn or_of_nothing_is_false() {
        assert_eq!(Expr::or(vec![]).as_str(), "false");
        assert_eq!(Expr::or(vec![Expr::raw("a"), Expr::raw("b")]).as_str(), "(a || b)");
    }

    #[test]
    fn all_renders_closure() {
        let e = Expr::all("items(value)", "elem_0", Expr::raw("is_number(elem_0)"));
        assert_eq!(e.as_str(), "items(value).all(|elem_0| is_number(elem_0))");
    }
}
