// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative field schemas for entity attribute maps.
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s validated against an
//! entity's `data` map at insert and update time. Validation is shallow by
//! default; a `Map` field may carry a nested schema that recurses one level
//! per nesting. Keys not named by the schema pass through untouched — the
//! attribute map stays open.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::AttrMap;
use crate::error::Error;

/// Type tag a field value is validated against.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON integer (no fractional part).
    Integer,
    /// Any JSON number.
    Float,
    /// JSON boolean.
    Boolean,
    /// JSON object; may carry a nested [`Schema`].
    Map,
    /// JSON array.
    List,
    /// Any value; presence checks only.
    Any,
}

impl FieldType {
    fn admits(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Map => value.is_object(),
            Self::List => value.is_array(),
            Self::Any => true,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
            Self::Map => "map",
            Self::List => "list",
            Self::Any => "any",
        }
    }
}

/// One field declaration inside a [`Schema`].
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key looked up in the attribute map.
    pub name: String,
    /// Type the value must satisfy.
    pub ty: FieldType,
    /// Whether the field must be present after defaults are applied.
    pub required: bool,
    /// Value filled in when the field is absent.
    pub default: Option<Value>,
    /// Nested schema applied when `ty` is [`FieldType::Map`].
    pub nested: Option<Schema>,
}

impl FieldSpec {
    /// Declares a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            nested: None,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            nested: None,
        }
    }

    /// Attaches a default value filled in when the field is absent.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attaches a nested schema for a `Map` field.
    #[must_use]
    pub fn with_nested(mut self, schema: Schema) -> Self {
        self.nested = Some(schema);
        self
    }
}

/// Ordered list of field declarations for one entity type's `data` map.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Builds a schema from field declarations.
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Appends a field declaration.
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Returns the declared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Fills declared defaults into `data` for absent fields.
    pub fn apply_defaults(&self, data: &mut AttrMap) {
        for spec in &self.fields {
            if !data.contains_key(&spec.name) {
                if let Some(default) = &spec.default {
                    data.insert(spec.name.clone(), default.clone());
                }
            }
            if let (Some(nested), Some(Value::Object(inner))) =
                (&spec.nested, data.get_mut(&spec.name))
            {
                nested.apply_defaults(inner);
            }
        }
    }

    /// Validates `data` against this schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaViolation`] naming the first failing field:
    /// a required field missing after defaults, a type mismatch, or a
    /// nested-map violation (reported with a `parent.child` path).
    pub fn validate(&self, data: &AttrMap) -> Result<(), Error> {
        for spec in &self.fields {
            match data.get(&spec.name) {
                None => {
                    if spec.required {
                        return Err(Error::SchemaViolation {
                            field: spec.name.clone(),
                            reason: "required field missing".to_owned(),
                        });
                    }
                }
                Some(value) => {
                    if !spec.ty.admits(value) {
                        return Err(Error::SchemaViolation {
                            field: spec.name.clone(),
                            reason: format!("expected {}", spec.ty.expected()),
                        });
                    }
                    if let (Some(nested), Value::Object(inner)) = (&spec.nested, value) {
                        nested.validate(inner).map_err(|err| match err {
                            Error::SchemaViolation { field, reason } => Error::SchemaViolation {
                                field: format!("{}.{field}", spec.name),
                                reason,
                            },
                            other => other,
                        })?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> AttrMap {
        match value {
            Value::Object(map) => map,
            _ => AttrMap::new(),
        }
    }

    #[test]
    fn required_field_missing_is_a_violation() {
        let schema = Schema::default().field(FieldSpec::required("name", FieldType::String));
        let err = schema.validate(&AttrMap::new());
        assert!(matches!(
            err,
            Err(Error::SchemaViolation { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn defaults_satisfy_required_fields() {
        let schema = Schema::default()
            .field(FieldSpec::required("lang", FieldType::String).with_default("en"));
        let mut data = AttrMap::new();
        schema.apply_defaults(&mut data);
        assert_eq!(data.get("lang"), Some(&json!("en")));
        assert!(schema.validate(&data).is_ok());
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let schema = Schema::default().field(FieldSpec::optional("age", FieldType::Integer));
        let data = attrs(json!({ "age": "forty" }));
        let err = schema.validate(&data);
        assert!(matches!(
            err,
            Err(Error::SchemaViolation { field, reason }) if field == "age" && reason.contains("integer")
        ));
    }

    #[test]
    fn nested_violations_report_a_path() {
        let schema = Schema::default().field(
            FieldSpec::optional("address", FieldType::Map)
                .with_nested(Schema::default().field(FieldSpec::required("city", FieldType::String))),
        );
        let data = attrs(json!({ "address": {} }));
        let err = schema.validate(&data);
        assert!(matches!(
            err,
            Err(Error::SchemaViolation { field, .. }) if field == "address.city"
        ));
    }

    #[test]
    fn undeclared_keys_pass_through() {
        let schema = Schema::default().field(FieldSpec::optional("age", FieldType::Integer));
        let data = attrs(json!({ "nickname": "ziggy" }));
        assert!(schema.validate(&data).is_ok());
    }

    #[test]
    fn float_admits_integers_too() {
        let schema = Schema::default().field(FieldSpec::optional("weight", FieldType::Float));
        assert!(schema.validate(&attrs(json!({ "weight": 3 }))).is_ok());
        assert!(schema.validate(&attrs(json!({ "weight": 3.5 }))).is_ok());
    }
}
