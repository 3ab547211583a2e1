//! Text emitter for compiled validators.
//!
//! Compiled validators in shapecheck are closure trees, not generated source.
//! This crate renders an equivalent, human-readable listing of the routines a
//! compiler produced so the result can be inspected, diffed or cached. The
//! listing is diagnostic output only; its exact text is not stable.

mod expr;

pub use expr::Expr;

/// A named routine: one function in the rendered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub param: String,
    pub body: Expr,
}

/// Accumulates routines and fresh variable names, then renders them.
#[derive(Debug, Default)]
pub struct Codegen {
    routines: Vec<Routine>,
    next_var: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh variable name with the given prefix.
    pub fn var(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}_{}", self.next_var);
        self.next_var += 1;
        name
    }

    /// Name of the routine stored at `index`.
    pub fn routine_name(index: usize) -> String {
        format!("check_{index}")
    }

    /// Registers a routine body. Routines are rendered in registration order.
    pub fn routine(&mut self, name: impl Into<String>, param: impl Into<String>, body: Expr) {
        self.routines.push(Routine {
            name: name.into(),
            param: param.into(),
            body,
        });
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    /// Renders every routine followed by the entry function.
    pub fn render(&self, entry: &Expr) -> String {
        let mut out = String::new();
        for r in &self.routines {
            render_fn(&mut out, &r.name, &r.param, &r.body);
            out.push('\n');
        }
        render_fn(&mut out, "check", "value", entry);
        out
    }
}

fn render_fn(out: &mut String, name: &str, param: &str, body: &Expr) {
    out.push_str("fn ");
    out.push_str(name);
    out.push('(');
    out.push_str(param);
    out.push_str(": &Value) -> bool {\n    ");
    out.push_str(body.as_str());
    out.push_str("\n}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vars_are_unique() {
        let mut cg = Codegen::new();
        assert_eq!(cg.var("elem"), "elem_0");
        assert_eq!(cg.var("elem"), "elem_1");
    }

    #[test]
    fn renders_routines_then_entry() {
        let mut cg = Codegen::new();
        cg.routine(Codegen::routine_name(0), "value", Expr::raw("is_string(value)"));
        let out = cg.render(&Expr::call(&Codegen::routine_name(0), "value"));
        assert!(out.starts_with("fn check_0(value: &Value) -> bool {"));
        assert!(out.contains("fn check(value: &Value) -> bool {\n    check_0(value)\n}"));
    }
}
