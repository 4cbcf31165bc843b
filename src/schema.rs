use crate::prelude::lambda::*;
use chrono::DateTime;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug)]
pub(crate) struct InvalidValue;

/// The declared type of an argument or input-object field.
///
/// Primitives are taken from scalars: https://spec.graphql.org/draft/#sec-Scalars
/// plus the `DateTime` scalar of the generated schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// An enum or input object declared by the schema.
    Named(String),
    List(Box<FieldType>),
    NonNull(Box<FieldType>),
    String,
    Int,
    Float,
    Id,
    Boolean,
    DateTime,
}

impl FieldType {
    /// Decode a raw value against this type, applying the same
    /// string-to-scalar coercion the generated schema applies. Returns the
    /// normalized value.
    pub(crate) fn decode_value(
        &self,
        value: &Value,
        schema: &Schema,
    ) -> Result<Value, InvalidValue> {
        match (self, value) {
            // Type coercion from string to Int, Float or Boolean
            (FieldType::Int | FieldType::Float | FieldType::Boolean, Value::String(s)) => {
                if let Ok(value) = Value::from_bytes(s.inner().clone()) {
                    self.decode_value(&value, schema)
                } else {
                    Err(InvalidValue)
                }
            }
            (FieldType::String, Value::String(_)) => Ok(value.clone()),
            // Spec: https://spec.graphql.org/June2018/#sec-Int
            (FieldType::Int, Value::Number(number)) if number.is_i64() || number.is_u64() => {
                if number
                    .as_i64()
                    .and_then(|x| i32::try_from(x).ok())
                    .is_some()
                    || number
                        .as_u64()
                        .and_then(|x| i32::try_from(x).ok())
                        .is_some()
                {
                    Ok(value.clone())
                } else {
                    Err(InvalidValue)
                }
            }
            (FieldType::Float, Value::Number(_)) => Ok(value.clone()),
            // The ID scalar serializes as a String but in practice Int works too
            (FieldType::Id, Value::String(_) | Value::Number(_)) => Ok(value.clone()),
            (FieldType::Boolean, Value::Bool(_)) => Ok(value.clone()),
            (FieldType::DateTime, Value::String(s)) => {
                if DateTime::parse_from_rfc3339(s.as_str()).is_ok() {
                    Ok(value.clone())
                } else {
                    Err(InvalidValue)
                }
            }
            (FieldType::List(inner_ty), Value::Array(vec)) => vec
                .iter()
                .map(|x| inner_ty.decode_value(x, schema))
                .collect::<Result<Vec<Value>, InvalidValue>>()
                .map(Value::Array),
            (FieldType::NonNull(inner_ty), value) => {
                if value.is_null() {
                    Err(InvalidValue)
                } else {
                    inner_ty.decode_value(value, schema)
                }
            }
            (FieldType::Named(name), Value::String(s)) => {
                match schema.enums.get(name) {
                    Some(variants) if variants.contains(s.as_str()) => Ok(value.clone()),
                    _ => Err(InvalidValue),
                }
            }
            (FieldType::Named(name), value) if value.is_object() => {
                if let Some(object_ty) = schema.input_objects.get(name) {
                    decode_object(
                        object_ty,
                        value.as_object().ok_or(InvalidValue)?,
                        schema,
                    )
                } else {
                    Err(InvalidValue)
                }
            }
            // NOTE: graphql's types are all optional by default
            (_, Value::Null) => Ok(Value::Null),
            _ => Err(InvalidValue),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }
}

impl fmt::Display for FieldType {
    // Spec: https://spec.graphql.org/draft/#sec-Type-References
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Named(name) => write!(f, "{}", name),
            FieldType::List(inner) => write!(f, "[{}]", inner),
            FieldType::NonNull(inner) => write!(f, "{}!", inner),
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Id => write!(f, "ID"),
            FieldType::Boolean => write!(f, "Boolean"),
            FieldType::DateTime => write!(f, "DateTime"),
        }
    }
}

fn decode_object(
    object_ty: &HashMap<String, FieldType>,
    object: &Object,
    schema: &Schema,
) -> Result<Value, InvalidValue> {
    let mut decoded = Object::new();
    for (key, value) in object.iter() {
        let ty = object_ty.get(key.as_str()).ok_or(InvalidValue)?;
        decoded.insert(key.clone(), ty.decode_value(value, schema)?);
    }
    for (name, ty) in object_ty.iter() {
        if ty.is_non_null() && !object.contains_key(name.as_str()) {
            return Err(InvalidValue);
        }
    }
    Ok(Value::Object(decoded))
}

/// A declared argument of a custom-resolver field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: FieldType,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A schema field that delegates to a custom resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: ResolverKey,
    pub arguments: Vec<ArgumentDefinition>,
}

impl FieldDefinition {
    pub fn new(key: ResolverKey) -> Self {
        Self {
            key,
            arguments: Vec::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.arguments.push(ArgumentDefinition::new(name, ty));
        self
    }
}

/// The custom-resolver surface of the generated schema.
///
/// Schema compilation is the host's concern; this index carries only what
/// dispatch needs: which fields delegate to custom resolvers, their declared
/// argument types, and the enum/input-object definitions those arguments
/// reference.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: HashMap<ResolverKey, FieldDefinition>,
    enums: HashMap<String, HashSet<String>>,
    input_objects: HashMap<String, HashMap<String, FieldType>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            schema: Schema::default(),
        }
    }

    pub fn field(&self, key: &ResolverKey) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Decode a raw argument payload against a field's declared arguments.
    ///
    /// Arguments the field does not declare are rejected, as the generated
    /// schema would have rejected them before delegating.
    pub fn decode_arguments(
        &self,
        definition: &FieldDefinition,
        raw: &Object,
    ) -> Result<Object, ResolverError> {
        for name in raw.keys() {
            if !definition
                .arguments
                .iter()
                .any(|argument| argument.name == name.as_str())
            {
                return Err(ResolverError::UnknownArgument {
                    name: name.as_str().to_string(),
                });
            }
        }

        let mut decoded = Object::new();
        for argument in definition.arguments.iter() {
            match raw.get(argument.name.as_str()) {
                None | Some(Value::Null) if argument.ty.is_non_null() => {
                    return Err(ResolverError::MissingArgument {
                        name: argument.name.clone(),
                    });
                }
                None => {}
                Some(value) => {
                    let value = argument.ty.decode_value(value, self).map_err(|_| {
                        ResolverError::InvalidArgument {
                            name: argument.name.clone(),
                            expected: argument.ty.to_string(),
                        }
                    })?;
                    decoded.insert(argument.name.as_str(), value);
                }
            }
        }
        Ok(decoded)
    }
}

pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn field(mut self, definition: FieldDefinition) -> Self {
        self.schema
            .fields
            .insert(definition.key.clone(), definition);
        self
    }

    pub fn enum_type(
        mut self,
        name: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.schema.enums.insert(
            name.into(),
            variants.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn input_object(
        mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, FieldType)>,
    ) -> Self {
        self.schema.input_objects.insert(
            name.into(),
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        );
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}
