//! Reference lists and `Ref`/`This` resolution.
//!
//! A schema tree is acyclic. Recursion is written as a `Ref` or `This` node
//! naming an `$id`, and resolved against a list of named nodes collected while
//! walking down the tree. Every engine operation extends the list with the
//! node it is entering (when that node carries an `$id`) and hands the same
//! extended list to all of its children.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::schema::{AdditionalProperties, Schema};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unable to dereference schema with $id `{name}`")]
pub struct DereferenceError {
    pub name: String,
}

/// Ordered, append-only list of named schema nodes.
///
/// Lookups scan from the front, so caller-supplied references shadow named
/// ancestors. Cloning is cheap; [`extend`](Self::extend) never mutates the
/// list it is called on.
#[derive(Debug, Clone, Default)]
pub struct References<'a> {
    nodes: Arc<Vec<&'a Schema>>,
}

impl<'a> References<'a> {
    pub fn new<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = &'a Schema>,
    {
        Self {
            nodes: Arc::new(schemas.into_iter().collect()),
        }
    }

    /// Returns a list with `node` appended if it carries an `$id` and is not
    /// already present, otherwise a clone of this list.
    pub fn extend(&self, node: &'a Schema) -> Self {
        if node.id().is_none() || self.nodes.iter().any(|n| std::ptr::eq(*n, node)) {
            return self.clone();
        }
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend(self.nodes.iter().copied());
        nodes.push(node);
        Self {
            nodes: Arc::new(nodes),
        }
    }

    /// First node whose `$id` equals `name`.
    pub fn find(&self, name: &str) -> Option<&'a Schema> {
        self.nodes.iter().copied().find(|n| n.id() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Schema> + '_ {
        self.nodes.iter().copied()
    }

    /// Addresses of the listed nodes. Two lists with equal addresses resolve
    /// every name the same way.
    pub(crate) fn addresses(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .map(|n| *n as *const Schema as usize)
            .collect()
    }
}

/// Resolves a `Ref` or `This` node to its target. Any other node resolves to
/// itself.
pub fn dereference<'a>(
    schema: &'a Schema,
    references: &References<'a>,
) -> Result<&'a Schema, DereferenceError> {
    match schema {
        Schema::Ref(r) | Schema::This(r) => {
            references.find(&r.name).ok_or_else(|| DereferenceError {
                name: r.name.clone(),
            })
        }
        _ => Ok(schema),
    }
}

/// Walks every path a structural check can take and verifies that each
/// reference on it resolves.
///
/// Referenced targets are entered once per distinct reference list, so
/// recursive schemas terminate.
pub fn validate_references<'a>(
    schema: &'a Schema,
    references: &References<'a>,
) -> Result<(), DereferenceError> {
    let mut seen = HashSet::new();
    walk(schema, references, &mut seen)
}

fn walk<'a>(
    schema: &'a Schema,
    references: &References<'a>,
    seen: &mut HashSet<(usize, Vec<usize>)>,
) -> Result<(), DereferenceError> {
    let refs = references.extend(schema);
    match schema {
        Schema::Ref(_) | Schema::This(_) => {
            let target = dereference(schema, &refs)?;
            let key = (target as *const Schema as usize, refs.addresses());
            if seen.insert(key) {
                walk(target, &refs, seen)?;
            }
            Ok(())
        }
        Schema::Array(s) => walk(&s.items, &refs, seen),
        Schema::Tuple(s) => s.items.iter().try_for_each(|item| walk(item, &refs, seen)),
        Schema::Object(s) => {
            for property in s.properties.values() {
                walk(&property.schema, &refs, seen)?;
            }
            match &s.additional_properties {
                AdditionalProperties::Schema(extra) => walk(extra, &refs, seen),
                _ => Ok(()),
            }
        }
        Schema::Record(s) => walk(&s.value, &refs, seen),
        Schema::Union(s) => s.variants.iter().try_for_each(|v| walk(v, &refs, seen)),
        Schema::Intersect(s) => s.members.iter().try_for_each(|m| walk(m, &refs, seen)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    #[test]
    fn extend_appends_only_named_nodes() {
        let named = Schema::string().with_id("A");
        let anon = Schema::string();
        let refs = References::default();
        assert_eq!(refs.extend(&anon).len(), 0);
        let refs = refs.extend(&named);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs.extend(&named).len(), 1);
    }

    #[test]
    fn caller_references_shadow_ancestors() {
        let caller = Schema::number().with_id("T");
        let ancestor = Schema::string().with_id("T");
        let refs = References::new([&caller]).extend(&ancestor);
        let reference = Schema::reference("T");
        let target = dereference(&reference, &refs).unwrap();
        assert!(std::ptr::eq(target, &caller));
    }

    #[test]
    fn missing_name_fails() {
        let err = dereference(&Schema::reference("Nope"), &References::default()).unwrap_err();
        assert_eq!(err.name, "Nope");
    }

    #[test]
    fn validate_terminates_on_recursion() {
        let node = Schema::object([
            ("value", Property::new(Schema::number())),
            ("next", Property::optional(Schema::this("Node"))),
        ])
        .with_id("Node");
        assert!(validate_references(&node, &References::default()).is_ok());
    }

    #[test]
    fn validate_reports_dangling_reference() {
        let s = Schema::array(Schema::union(vec![Schema::null(), Schema::reference("Gone")]));
        let err = validate_references(&s, &References::default()).unwrap_err();
        assert_eq!(err.name, "Gone");
    }
}
