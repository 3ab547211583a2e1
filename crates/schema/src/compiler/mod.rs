//! Compiled validators.
//!
//! [`TypeCompiler::compile`] walks a schema once and wires a tree of closures
//! that performs the same test as [`check`](crate::check) without revisiting
//! the schema. Every named node (one carrying an `$id`, or reached through a
//! `Ref`) becomes a routine stored in a table and invoked by index. Routines
//! are keyed by node and by the reference list in scope, so a recursive
//! schema compiles to a finite set of routines.

mod routines;

use shapecheck_value::Value;
use thiserror::Error;
use tracing::debug;

use crate::check::{visit, ValueErrors};
use crate::references::{validate_references, DereferenceError, References};
use crate::schema::{validate_schema, Schema, SchemaError};

use self::routines::{CheckFn, Compiler, Routines};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Dereference(#[from] DereferenceError),
}

/// How a [`TypeCheck`] evaluates values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Build a closure tree once and run it for every check.
    #[default]
    Closures,
    /// Walk the schema for every check. Observably identical to `Closures`.
    Interpreted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub mode: CompileMode,
    /// Render a listing of the compiled routines, returned by
    /// [`TypeCheck::code`].
    pub emit_code: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: CompileMode::Closures,
            emit_code: true,
        }
    }
}

pub struct TypeCompiler;

impl TypeCompiler {
    /// Compiles `schema` against `references` with default options.
    pub fn compile(references: &[Schema], schema: &Schema) -> Result<TypeCheck, CompileError> {
        Self::compile_with(references, schema, CompileOptions::default())
    }

    pub fn compile_with(
        references: &[Schema],
        schema: &Schema,
        options: CompileOptions,
    ) -> Result<TypeCheck, CompileError> {
        validate_schema(schema)?;
        for reference in references {
            validate_schema(reference)?;
        }
        let refs = References::new(references);
        validate_references(schema, &refs)?;

        let (program, code) = match options.mode {
            CompileMode::Closures => {
                let mut compiler = Compiler::new();
                let (entry, expr) = compiler.node(schema, &refs, "value")?;
                let code = if options.emit_code {
                    compiler.render(&expr)
                } else {
                    String::new()
                };
                let routines = compiler.finish();
                debug!(routines = routines.len(), "compiled schema {schema}");
                (Program::Closures { entry, routines }, code)
            }
            CompileMode::Interpreted => {
                debug!("schema {schema} will be interpreted");
                let code = if options.emit_code {
                    format!("fn check(value: &Value) -> bool {{\n    interpret({schema}, value)\n}}\n")
                } else {
                    String::new()
                };
                (Program::Interpreted, code)
            }
        };

        Ok(TypeCheck {
            schema: schema.clone(),
            references: references.to_vec(),
            program,
            code,
        })
    }
}

enum Program {
    Closures { entry: CheckFn, routines: Routines },
    Interpreted,
}

/// A validator bound to one schema and reference list.
///
/// `TypeCheck` owns copies of both, holds no mutable state and may be shared
/// between threads.
pub struct TypeCheck {
    schema: Schema,
    references: Vec<Schema>,
    program: Program,
    code: String,
}

impl TypeCheck {
    pub fn check(&self, value: &Value) -> bool {
        match &self.program {
            Program::Closures { entry, routines } => entry(routines, value),
            // References and record keys were validated at compile time.
            Program::Interpreted => {
                visit(&self.schema, &References::new(&self.references), value).unwrap_or(false)
            }
        }
    }

    /// Lazily enumerates every validation failure of `value`.
    pub fn errors<'a>(&'a self, value: &'a Value) -> ValueErrors<'a> {
        ValueErrors::new(&self.schema, References::new(&self.references), value)
    }

    /// Listing of the compiled routines. Diagnostic only; the text is not
    /// stable across versions.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn references(&self) -> &[Schema] {
        &self.references
    }

    pub fn mode(&self) -> CompileMode {
        match self.program {
            Program::Closures { .. } => CompileMode::Closures,
            Program::Interpreted => CompileMode::Interpreted,
        }
    }
}

impl std::fmt::Debug for TypeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCheck")
            .field("schema", &self.schema.to_string())
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn type_check_is_send_and_sync() {
        assert_send_sync::<TypeCheck>();
    }

    #[test]
    fn invalid_schema_does_not_compile() {
        let s = Schema::record(Schema::boolean(), Schema::any());
        assert!(matches!(
            TypeCompiler::compile(&[], &s),
            Err(CompileError::Schema(SchemaError::InvalidRecordKey("Boolean")))
        ));
        let s = Schema::reference("Missing");
        assert!(matches!(
            TypeCompiler::compile(&[], &s),
            Err(CompileError::Dereference(_))
        ));
    }

    #[test]
    fn recursive_schema_compiles_to_one_routine() {
        let node = Schema::object([
            ("value", Property::new(Schema::number())),
            ("next", Property::optional(Schema::this("List"))),
        ])
        .with_id("List");
        let tc = TypeCompiler::compile(&[], &node).unwrap();
        assert!(tc.check(&Value::from(json!({"value": 1, "next": {"value": 2}}))));
        assert!(!tc.check(&Value::from(json!({"value": 1, "next": {"value": "2"}}))));
        assert_eq!(tc.code().matches("fn check_").count(), 1);
    }

    #[test]
    fn interpreted_mode_agrees() {
        let s = Schema::array(Schema::union(vec![Schema::string(), Schema::integer()]));
        let options = CompileOptions {
            mode: CompileMode::Interpreted,
            emit_code: false,
        };
        let tc = TypeCompiler::compile_with(&[], &s, options).unwrap();
        assert_eq!(tc.mode(), CompileMode::Interpreted);
        assert!(tc.check(&Value::from(json!(["a", 1]))));
        assert!(!tc.check(&Value::from(json!(["a", 1.5]))));
        assert_eq!(tc.code(), "");
    }

    #[test]
    fn errors_match_the_interpreter() {
        let s = Schema::object([("a", Property::new(Schema::number()))]);
        let tc = TypeCompiler::compile(&[], &s).unwrap();
        let v = Value::from(json!({"a": "x"}));
        let paths: Vec<String> = tc.errors(&v).map(|e| e.path).collect();
        assert_eq!(paths, vec!["/a"]);
    }
}
