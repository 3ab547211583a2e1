//! Plain constructors for schema nodes, plus `with_*` setters for the
//! metadata every node shares.

use indexmap::IndexMap;
use shapecheck_value::Value;

use super::schema::*;

impl Property {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            modifier: Modifier::None,
        }
    }

    pub fn optional(schema: Schema) -> Self {
        Self {
            schema,
            modifier: Modifier::Optional,
        }
    }

    pub fn readonly(schema: Schema) -> Self {
        Self {
            schema,
            modifier: Modifier::Readonly,
        }
    }

    pub fn readonly_optional(schema: Schema) -> Self {
        Self {
            schema,
            modifier: Modifier::ReadonlyOptional,
        }
    }
}

impl From<Schema> for Property {
    fn from(schema: Schema) -> Self {
        Self::new(schema)
    }
}

impl ObjectSchema {
    /// Builds an object node whose required set is every property without an
    /// optional modifier.
    pub fn new<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Property)>,
    {
        let properties: IndexMap<String, Property> =
            properties.into_iter().map(|(k, p)| (k.into(), p)).collect();
        let required = properties
            .iter()
            .filter(|(_, p)| !p.modifier.is_optional())
            .map(|(k, _)| k.clone())
            .collect();
        Self {
            properties,
            required,
            ..Default::default()
        }
    }
}

impl ArraySchema {
    pub fn new(items: Schema) -> Self {
        Self {
            base: SchemaBase::default(),
            items: Box::new(items),
            min_items: None,
            max_items: None,
            unique_items: false,
        }
    }
}

fn basic() -> BasicSchema {
    BasicSchema::default()
}

impl Schema {
    pub fn any() -> Self {
        Self::Any(basic())
    }

    pub fn unknown() -> Self {
        Self::Unknown(basic())
    }

    pub fn never() -> Self {
        Self::Never(basic())
    }

    pub fn null() -> Self {
        Self::Null(basic())
    }

    pub fn undefined() -> Self {
        Self::Undefined(basic())
    }

    pub fn void() -> Self {
        Self::Void(basic())
    }

    pub fn boolean() -> Self {
        Self::Boolean(basic())
    }

    pub fn number() -> Self {
        Self::Number(NumberSchema::default())
    }

    pub fn integer() -> Self {
        Self::Integer(NumberSchema::default())
    }

    pub fn bigint() -> Self {
        Self::BigInt(BigIntSchema::default())
    }

    pub fn string() -> Self {
        Self::String(StringSchema::default())
    }

    pub fn symbol() -> Self {
        Self::Symbol(basic())
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::Literal(LiteralSchema {
            base: SchemaBase::default(),
            value: value.into(),
        })
    }

    pub fn uint8array() -> Self {
        Self::Uint8Array(BytesSchema::default())
    }

    pub fn date() -> Self {
        Self::Date(DateSchema::default())
    }

    pub fn array(items: Schema) -> Self {
        Self::Array(ArraySchema::new(items))
    }

    pub fn tuple(items: Vec<Schema>) -> Self {
        Self::Tuple(TupleSchema {
            base: SchemaBase::default(),
            items,
        })
    }

    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Property)>,
    {
        Self::Object(ObjectSchema::new(properties))
    }

    pub fn record(key: Schema, value: Schema) -> Self {
        Self::Record(RecordSchema {
            base: SchemaBase::default(),
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn union(variants: Vec<Schema>) -> Self {
        Self::Union(UnionSchema {
            base: SchemaBase::default(),
            variants,
        })
    }

    pub fn intersect(members: Vec<Schema>) -> Self {
        Self::Intersect(IntersectSchema {
            base: SchemaBase::default(),
            members,
        })
    }

    pub fn promise(item: Schema) -> Self {
        Self::Promise(PromiseSchema {
            base: SchemaBase::default(),
            item: Box::new(item),
        })
    }

    pub fn function(params: Vec<Schema>, returns: Schema) -> Self {
        Self::Function(FunctionSchema {
            base: SchemaBase::default(),
            params,
            returns: Box::new(returns),
        })
    }

    pub fn constructor(params: Vec<Schema>, instance: Schema) -> Self {
        Self::Constructor(ConstructorSchema {
            base: SchemaBase::default(),
            params,
            instance: Box::new(instance),
        })
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(RefSchema {
            base: SchemaBase::default(),
            name: name.into(),
        })
    }

    pub fn this(name: impl Into<String>) -> Self {
        Self::This(RefSchema {
            base: SchemaBase::default(),
            name: name.into(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.base_mut().id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.base_mut().title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.base_mut().description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.base_mut().default = Some(default);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.base_mut().transform = Some(transform);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_required_follows_modifiers() {
        let obj = ObjectSchema::new([
            ("a", Property::new(Schema::number())),
            ("b", Property::optional(Schema::string())),
            ("c", Property::readonly(Schema::boolean())),
            ("d", Property::readonly_optional(Schema::null())),
        ]);
        let required: Vec<&str> = obj.required.iter().map(String::as_str).collect();
        assert_eq!(required, vec!["a", "c"]);
    }

    #[test]
    fn metadata_setters() {
        let s = Schema::string()
            .with_id("Name")
            .with_title("name")
            .with_default(Value::from("anon"));
        assert_eq!(s.id(), Some("Name"));
        assert_eq!(s.base().title.as_deref(), Some("name"));
        assert_eq!(s.default_value(), Some(&Value::from("anon")));
        assert_eq!(s.to_string(), "String<Name>");
    }
}
