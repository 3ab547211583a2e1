//! Closure-tree construction and the matching code listing.

use std::collections::HashMap;

use indexmap::IndexSet;
use shapecheck_codegen::{Codegen, Expr};
use shapecheck_value::{KeyRef, Value};

use super::CompileError;
use crate::check::constraint::{self, all_unique, passes};
use crate::check::keys::KeyMatcher;
use crate::references::{dereference, References};
use crate::schema::*;

pub(crate) type CheckFn = Box<dyn Fn(&Routines, &Value) -> bool + Send + Sync>;

/// Table of compiled named routines. Closures receive the table on every
/// call, so routines can call each other without owning each other.
pub(crate) struct Routines(Vec<CheckFn>);

impl Routines {
    pub(crate) fn call(&self, index: usize, value: &Value) -> bool {
        self.0.get(index).is_some_and(|routine| routine(self, value))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

enum Extra {
    Forbid,
    Allow,
    Check(CheckFn),
}

struct Prop {
    key: String,
    check: CheckFn,
    optional: bool,
    required: bool,
}

pub(crate) struct Compiler {
    slots: Vec<Option<CheckFn>>,
    memo: HashMap<(usize, Vec<usize>), usize>,
    codegen: Codegen,
}

impl Compiler {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            memo: HashMap::new(),
            codegen: Codegen::new(),
        }
    }

    pub(crate) fn render(&self, entry: &Expr) -> String {
        self.codegen.render(entry)
    }

    pub(crate) fn finish(self) -> Routines {
        Routines(
            self.slots
                .into_iter()
                .map(|slot| slot.unwrap_or_else(|| Box::new(|_, _| false)))
                .collect(),
        )
    }

    /// Compiles `schema` as applied to the value spelled `var` in the listing.
    pub(crate) fn node<'a>(
        &mut self,
        schema: &'a Schema,
        refs: &References<'a>,
        var: &str,
    ) -> Result<(CheckFn, Expr), CompileError> {
        match schema {
            Schema::Ref(_) | Schema::This(_) => {
                let target = dereference(schema, &refs.extend(schema))?;
                self.routine(target, refs, var)
            }
            _ if schema.id().is_some() => self.routine(schema, refs, var),
            _ => self.body(schema, refs, var),
        }
    }

    fn routine<'a>(
        &mut self,
        schema: &'a Schema,
        refs: &References<'a>,
        var: &str,
    ) -> Result<(CheckFn, Expr), CompileError> {
        // A routine body resolves names against the list it was built with.
        let key = (schema as *const Schema as usize, refs.extend(schema).addresses());
        let index = match self.memo.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.slots.len();
                self.slots.push(None);
                self.memo.insert(key, index);
                let (body, expr) = self.body(schema, refs, "value")?;
                self.slots[index] = Some(body);
                self.codegen
                    .routine(Codegen::routine_name(index), "value", expr);
                index
            }
        };
        let call: CheckFn = Box::new(move |routines, value| routines.call(index, value));
        Ok((call, Expr::call(&Codegen::routine_name(index), var)))
    }

    fn body<'a>(
        &mut self,
        schema: &'a Schema,
        refs: &References<'a>,
        var: &str,
    ) -> Result<(CheckFn, Expr), CompileError> {
        let refs = refs.extend(schema);
        match schema {
            Schema::Array(s) => self.array(s, &refs, var),
            Schema::Tuple(s) => {
                let mut checks = Vec::with_capacity(s.items.len());
                let mut exprs = vec![
                    Expr::raw(format!("is_array({var})")),
                    Expr::raw(format!("len({var}) == {}", s.items.len())),
                ];
                for (i, item) in s.items.iter().enumerate() {
                    let (check, expr) = self.node(item, &refs, &format!("at({var}, {i})"))?;
                    checks.push(check);
                    exprs.push(expr);
                }
                let check: CheckFn = Box::new(move |r, v| match v {
                    Value::Array(items) => {
                        items.len() == checks.len()
                            && items.iter().zip(&checks).all(|(item, check)| check(r, item))
                    }
                    _ => false,
                });
                Ok((check, Expr::and(exprs)))
            }
            Schema::Object(s) => self.object(s, &refs, var),
            Schema::Record(s) => {
                let keys = KeyMatcher::new(&s.key).map_err(SchemaError::InvalidRecordKey)?;
                let key_var = self.codegen.var("key");
                let entry_var = self.codegen.var("entry");
                let (value_check, value_expr) = self.node(&s.value, &refs, &entry_var)?;
                let expr = Expr::and(vec![
                    Expr::raw(format!("is_object({var})")),
                    Expr::all(
                        &format!("entries({var})"),
                        &format!("({key_var}, {entry_var})"),
                        Expr::and(vec![
                            Expr::raw(format!("key_matches({key_var}, {:?})", keys.describe())),
                            value_expr,
                        ]),
                    ),
                ]);
                let check: CheckFn = Box::new(move |r, v| match v {
                    Value::Object(map) => map.iter().all(|(key, entry)| {
                        key.as_str().is_some_and(|k| keys.matches(k)) && value_check(r, entry)
                    }),
                    _ => false,
                });
                Ok((check, expr))
            }
            Schema::Union(s) => {
                let mut checks = Vec::with_capacity(s.variants.len());
                let mut exprs = Vec::with_capacity(s.variants.len());
                for variant in &s.variants {
                    let (check, expr) = self.node(variant, &refs, var)?;
                    checks.push(check);
                    exprs.push(expr);
                }
                let check: CheckFn = Box::new(move |r, v| checks.iter().any(|c| c(r, v)));
                Ok((check, Expr::or(exprs)))
            }
            Schema::Intersect(s) => {
                let mut checks = Vec::with_capacity(s.members.len());
                let mut exprs = Vec::with_capacity(s.members.len());
                for member in &s.members {
                    let (check, expr) = self.node(member, &refs, var)?;
                    checks.push(check);
                    exprs.push(expr);
                }
                let check: CheckFn = Box::new(move |r, v| checks.iter().all(|c| c(r, v)));
                Ok((check, Expr::and(exprs)))
            }
            Schema::Ref(_) | Schema::This(_) => self.node(schema, &refs, var),
            _ => Ok((leaf(schema), leaf_expr(schema, var))),
        }
    }

    fn array<'a>(
        &mut self,
        s: &'a ArraySchema,
        refs: &References<'a>,
        var: &str,
    ) -> Result<(CheckFn, Expr), CompileError> {
        let item_var = self.codegen.var("item");
        let (item, item_expr) = self.node(&s.items, refs, &item_var)?;
        let (min, max, unique) = (s.min_items, s.max_items, s.unique_items);

        let mut exprs = vec![Expr::raw(format!("is_array({var})"))];
        if let Some(m) = min {
            exprs.push(Expr::raw(format!("len({var}) >= {m}")));
        }
        if let Some(m) = max {
            exprs.push(Expr::raw(format!("len({var}) <= {m}")));
        }
        exprs.push(Expr::all(&format!("items({var})"), &item_var, item_expr));
        if unique {
            exprs.push(Expr::raw(format!("all_unique({var})")));
        }

        let check: CheckFn = Box::new(move |r, v| match v {
            Value::Array(items) => {
                min.map_or(true, |m| items.len() >= m)
                    && max.map_or(true, |m| items.len() <= m)
                    && items.iter().all(|i| item(r, i))
                    && (!unique || all_unique(items))
            }
            _ => false,
        });
        Ok((check, Expr::and(exprs)))
    }

    fn object<'a>(
        &mut self,
        s: &'a ObjectSchema,
        refs: &References<'a>,
        var: &str,
    ) -> Result<(CheckFn, Expr), CompileError> {
        let mut exprs = vec![Expr::raw(format!("is_object({var})"))];
        if let Some(m) = s.min_properties {
            exprs.push(Expr::raw(format!("len({var}) >= {m}")));
        }
        if let Some(m) = s.max_properties {
            exprs.push(Expr::raw(format!("len({var}) <= {m}")));
        }

        let mut props = Vec::with_capacity(s.properties.len());
        for (key, property) in &s.properties {
            let (check, expr) = self.node(&property.schema, refs, &format!("get({var}, {key:?})"))?;
            let optional = property.modifier.is_optional();
            let required = s.is_required(key);
            let has = Expr::raw(format!("has({var}, {key:?})"));
            exprs.push(if required {
                Expr::and(vec![has, expr])
            } else {
                Expr::or(vec![Expr::not(has), expr])
            });
            props.push(Prop {
                key: key.clone(),
                check,
                optional,
                required,
            });
        }

        let known: IndexSet<String> = s.properties.keys().cloned().collect();
        let known_list = format!("{:?}", known.iter().collect::<Vec<_>>());
        let extra = match &s.additional_properties {
            AdditionalProperties::Forbid => {
                exprs.push(Expr::raw(format!("only_keys({var}, {known_list})")));
                Extra::Forbid
            }
            AdditionalProperties::Allow => Extra::Allow,
            AdditionalProperties::Schema(schema) => {
                let extra_var = self.codegen.var("extra");
                let (check, expr) = self.node(schema, refs, &extra_var)?;
                exprs.push(Expr::all(
                    &format!("values_except({var}, {known_list})"),
                    &extra_var,
                    expr,
                ));
                Extra::Check(check)
            }
        };
        let (min, max) = (s.min_properties, s.max_properties);

        let check: CheckFn = Box::new(move |r, v| {
            let Value::Object(map) = v else {
                return false;
            };
            if min.is_some_and(|m| map.len() < m) || max.is_some_and(|m| map.len() > m) {
                return false;
            }
            for prop in &props {
                match map.get(&KeyRef(&prop.key)) {
                    Some(x) if prop.optional && x.is_undefined() => {}
                    Some(x) => {
                        if !(prop.check)(r, x) {
                            return false;
                        }
                    }
                    None if prop.required => return false,
                    None => {}
                }
            }
            let is_known = |key: &shapecheck_value::PropertyKey| {
                key.as_str().is_some_and(|k| known.contains(k))
            };
            match &extra {
                Extra::Allow => true,
                Extra::Forbid => map.keys().all(is_known),
                Extra::Check(check) => map.iter().all(|(k, x)| is_known(k) || check(r, x)),
            }
        });
        Ok((check, Expr::and(exprs)))
    }
}

fn leaf(schema: &Schema) -> CheckFn {
    match schema {
        Schema::Any(_) | Schema::Unknown(_) => Box::new(|_, _| true),
        Schema::Never(_) => Box::new(|_, _| false),
        Schema::Null(_) => Box::new(|_, v| v.is_null()),
        Schema::Undefined(_) | Schema::Void(_) => Box::new(|_, v| v.is_undefined()),
        Schema::Boolean(_) => Box::new(|_, v| matches!(v, Value::Bool(_))),
        Schema::Symbol(_) => Box::new(|_, v| matches!(v, Value::Symbol(_))),
        Schema::Literal(s) => {
            let literal = s.value.clone();
            Box::new(move |_, v| literal.matches(v))
        }
        Schema::Number(s) | Schema::Integer(s) => {
            let integer = matches!(schema, Schema::Integer(_));
            let s = s.clone();
            Box::new(move |_, v| passes(|out| constraint::number(&s, integer, v, out)))
        }
        Schema::String(s) => {
            let s = s.clone();
            Box::new(move |_, v| match v {
                Value::String(text) => passes(|out| constraint::string(&s, text, out)),
                _ => false,
            })
        }
        other => {
            let schema = other.clone();
            Box::new(move |_, v| passes(|out| constraint::leaf(&schema, v, out)))
        }
    }
}

fn leaf_expr(schema: &Schema, var: &str) -> Expr {
    match schema {
        Schema::Any(_) | Schema::Unknown(_) => Expr::lit(true),
        Schema::Never(_) => Expr::lit(false),
        Schema::Literal(s) => Expr::raw(format!("{var} == {}", s.value)),
        Schema::Number(s) | Schema::Integer(s) => {
            let kind = if matches!(schema, Schema::Integer(_)) { "integer" } else { "number" };
            let mut parts = vec![Expr::raw(format!("is_{kind}({var})"))];
            let bounds = [
                (s.minimum, ">="),
                (s.maximum, "<="),
                (s.exclusive_minimum, ">"),
                (s.exclusive_maximum, "<"),
            ];
            for (bound, op) in bounds {
                if let Some(b) = bound {
                    parts.push(Expr::raw(format!("{var} {op} {b}")));
                }
            }
            if let Some(m) = s.multiple_of {
                parts.push(Expr::raw(format!("{var} % {m} == 0")));
            }
            Expr::and(parts)
        }
        Schema::String(s) => {
            let mut parts = vec![Expr::raw(format!("is_string({var})"))];
            if let Some(m) = s.min_length {
                parts.push(Expr::raw(format!("len({var}) >= {m}")));
            }
            if let Some(m) = s.max_length {
                parts.push(Expr::raw(format!("len({var}) <= {m}")));
            }
            if let Some(re) = &s.pattern {
                parts.push(Expr::raw(format!("matches({var}, {:?})", re.as_str())));
            }
            if let Some(f) = &s.format {
                parts.push(Expr::raw(format!("format({var}, {f:?})")));
            }
            Expr::and(parts)
        }
        other => Expr::raw(format!("is_{}({var})", snake(other.kind()))),
    }
}

fn snake(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len() + 4);
    for (i, c) in kind.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_kinds() {
        assert_eq!(snake("BigInt"), "big_int");
        assert_eq!(snake("Uint8Array"), "uint8_array");
    }

    #[test]
    fn listing_names_routines_by_index() {
        let shared = Schema::string().with_id("Name");
        let s = Schema::tuple(vec![Schema::reference("Name"), Schema::reference("Name")]);
        let refs = References::new([&shared]);
        let mut compiler = Compiler::new();
        let (_, expr) = compiler.node(&s, &refs, "value").unwrap();
        assert_eq!(
            expr.as_str(),
            "(is_array(value) && len(value) == 2 && check_0(at(value, 0)) && check_0(at(value, 1)))"
        );
        assert_eq!(compiler.finish().len(), 1);
    }
}
