//! Schema module - the typed description of the desired output shape

use crate::error::DomainError;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Maximum number of fields at any one level of a schema
pub const MAX_FIELDS: usize = 50;

/// Value kind the service should coerce a field to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Free text
    String,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Integer or decimal number
    Number,
    /// true / false
    Boolean,
    /// ISO-8601 date
    IsoDate,
    /// URL
    Url,
    /// List of strings
    StringArray,
    /// Free-form object whose shape the service decides
    Object,
}

impl FieldType {
    /// Every recognized type tag, in wire order
    pub const ALL: [FieldType; 9] = [
        FieldType::String,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::IsoDate,
        FieldType::Url,
        FieldType::StringArray,
        FieldType::Object,
    ];

    /// Get the wire tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::IsoDate => "iso_date",
            FieldType::Url => "url",
            FieldType::StringArray => "string_array",
            FieldType::Object => "object",
        }
    }

    /// Parse a wire tag. Returns `None` for anything outside the recognized set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "email" => Some(FieldType::Email),
            "phone" => Some(FieldType::Phone),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "iso_date" => Some(FieldType::IsoDate),
            "url" => Some(FieldType::Url),
            "string_array" => Some(FieldType::StringArray),
            "object" => Some(FieldType::Object),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidSchema(format!("unknown type '{}'", s)))
    }
}

/// A schema field: either a leaf type tag or a nested schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// Scalar or opaque value
    Leaf(FieldType),
    /// Structured sub-object with its own validated fields
    Nested(SchemaDescriptor),
}

impl From<FieldType> for FieldSpec {
    fn from(t: FieldType) -> Self {
        FieldSpec::Leaf(t)
    }
}

impl From<SchemaDescriptor> for FieldSpec {
    fn from(s: SchemaDescriptor) -> Self {
        FieldSpec::Nested(s)
    }
}

/// Ordered mapping from field name to [`FieldSpec`].
///
/// A constructed descriptor always holds 1..=50 uniquely named, non-blank
/// fields at every nesting level, so holders never need to re-check it.
///
/// # Examples
///
/// ```
/// use parserator_domain::{FieldType, SchemaDescriptor};
///
/// let schema = SchemaDescriptor::new([
///     ("name", FieldType::String),
///     ("email", FieldType::Email),
/// ]).unwrap();
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.to_wire()["email"], "email");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    fields: Vec<(String, FieldSpec)>,
}

impl SchemaDescriptor {
    /// Build a descriptor from `(name, spec)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` when the list is empty, has more than [`MAX_FIELDS`]
    /// entries, or contains a blank or duplicated name.
    pub fn new<I, K, V>(fields: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldSpec>,
    {
        let fields: Vec<(String, FieldSpec)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        check_fields(&fields, "")?;
        Ok(Self { fields })
    }

    /// Build a descriptor from its JSON form, e.g. `{"name": "string", "address": {"city": "string"}}`.
    ///
    /// Type tags are resolved here, so an unknown tag is rejected at
    /// construction time rather than when the request is sent.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        from_json_at(value, "")
    }

    /// Skips validation. Built-in preset schemas only; their tests re-validate them.
    pub(crate) fn from_trusted(fields: Vec<(String, FieldSpec)>) -> Self {
        Self { fields }
    }

    /// Non-failing check of a candidate JSON schema.
    pub fn validate(candidate: &Value) -> bool {
        Self::from_json(candidate).is_ok()
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a constructed descriptor; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Top-level field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Look up a top-level field
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Whether a top-level field with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// JSON form sent as `outputSchema`
    pub fn to_wire(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len());
        for (name, spec) in &self.fields {
            let value = match spec {
                FieldSpec::Leaf(t) => Value::String(t.as_str().to_string()),
                FieldSpec::Nested(s) => s.to_wire(),
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }
}

fn check_fields(fields: &[(String, FieldSpec)], path: &str) -> Result<(), DomainError> {
    let at = if path.is_empty() {
        "schema".to_string()
    } else {
        format!("field '{}'", path)
    };

    if fields.is_empty() {
        return Err(DomainError::InvalidSchema(format!("{} has no fields", at)));
    }
    if fields.len() > MAX_FIELDS {
        return Err(DomainError::InvalidSchema(format!(
            "{} has {} fields (max: {})",
            at,
            fields.len(),
            MAX_FIELDS
        )));
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for (name, _) in fields {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidSchema(format!("{} contains a blank field name", at)));
        }
        if !seen.insert(name.as_str()) {
            return Err(DomainError::InvalidSchema(format!(
                "{} declares '{}' more than once",
                at, name
            )));
        }
    }
    Ok(())
}

fn from_json_at(value: &Value, path: &str) -> Result<SchemaDescriptor, DomainError> {
    let object = value.as_object().ok_or_else(|| {
        DomainError::InvalidSchema(if path.is_empty() {
            "schema must be a JSON object".to_string()
        } else {
            format!("field '{}' must be a type tag or an object", path)
        })
    })?;

    let mut fields = Vec::with_capacity(object.len());
    for (name, raw) in object {
        let child = if path.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", path, name)
        };
        let spec = match raw {
            Value::String(tag) => FieldType::parse(tag).map(FieldSpec::Leaf).ok_or_else(|| {
                DomainError::InvalidSchema(format!("field '{}': unknown type '{}'", child, tag))
            })?,
            Value::Object(_) => FieldSpec::Nested(from_json_at(raw, &child)?),
            other => {
                return Err(DomainError::InvalidSchema(format!(
                    "field '{}': expected a type tag or an object, got {}",
                    child, other
                )))
            }
        };
        fields.push((name.clone(), spec));
    }

    check_fields(&fields, path)?;
    Ok(SchemaDescriptor { fields })
}

impl Serialize for SchemaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, spec) in &self.fields {
            match spec {
                FieldSpec::Leaf(t) => map.serialize_entry(name, t.as_str())?,
                FieldSpec::Nested(s) => map.serialize_entry(name, s)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaDescriptor::from_json(&value).map_err(D::Error::custom)
    }
}

impl TryFrom<&Value> for SchemaDescriptor {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        SchemaDescriptor::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact() -> SchemaDescriptor {
        SchemaDescriptor::new([("name", FieldType::String), ("email", FieldType::Email)]).unwrap()
    }

    #[test]
    fn test_field_type_tags() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::parse("ISO_DATE"), Some(FieldType::IsoDate));
        assert_eq!(FieldType::parse("integer"), None);
        assert!("datetime".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_construct_keeps_order() {
        let schema = SchemaDescriptor::new([
            ("zeta", FieldType::String),
            ("alpha", FieldType::Number),
            ("mid", FieldType::Boolean),
        ])
        .unwrap();
        assert_eq!(schema.field_names(), vec!["zeta", "alpha", "mid"]);

        let wire = serde_json::to_string(&schema.to_wire()).unwrap();
        assert_eq!(wire, r#"{"zeta":"string","alpha":"number","mid":"boolean"}"#);
    }

    #[test]
    fn test_empty_schema_rejected() {
        let result = SchemaDescriptor::new(Vec::<(String, FieldType)>::new());
        assert!(matches!(result, Err(DomainError::InvalidSchema(_))));
    }

    #[test]
    fn test_too_many_fields_rejected() {
        let fields: Vec<_> = (0..=MAX_FIELDS).map(|i| (format!("f{}", i), FieldType::String)).collect();
        assert!(matches!(SchemaDescriptor::new(fields), Err(DomainError::InvalidSchema(_))));

        let fields: Vec<_> = (0..MAX_FIELDS).map(|i| (format!("f{}", i), FieldType::String)).collect();
        assert_eq!(SchemaDescriptor::new(fields).unwrap().len(), MAX_FIELDS);
    }

    #[test]
    fn test_blank_and_duplicate_names_rejected() {
        assert!(SchemaDescriptor::new([("  ", FieldType::String)]).is_err());
        assert!(SchemaDescriptor::new([("a", FieldType::String), ("a", FieldType::Url)]).is_err());
    }

    #[test]
    fn test_nested_schema() {
        let schema = SchemaDescriptor::new([
            ("name", FieldSpec::Leaf(FieldType::String)),
            ("address", FieldSpec::Nested(
                SchemaDescriptor::new([("city", FieldType::String), ("zip", FieldType::String)]).unwrap(),
            )),
        ])
        .unwrap();

        assert_eq!(
            schema.to_wire(),
            json!({"name": "string", "address": {"city": "string", "zip": "string"}})
        );
        assert!(matches!(schema.get("address"), Some(FieldSpec::Nested(_))));
    }

    #[test]
    fn test_from_json() {
        let schema = SchemaDescriptor::from_json(&json!({
            "name": "string",
            "phone": "phone",
            "company": {"name": "string", "url": "url"}
        }))
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.contains("company"));
        assert_eq!(schema.get("phone"), Some(&FieldSpec::Leaf(FieldType::Phone)));
    }

    #[test]
    fn test_from_json_unknown_tag_reports_path() {
        let err = SchemaDescriptor::from_json(&json!({"a": {"b": "datetime"}})).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidSchema("field 'a.b': unknown type 'datetime'".to_string())
        );
    }

    #[test]
    fn test_from_json_nested_constraints_apply() {
        assert!(SchemaDescriptor::from_json(&json!({"a": {}})).is_err());
        assert!(SchemaDescriptor::from_json(&json!({"a": 42})).is_err());
        assert!(SchemaDescriptor::from_json(&json!(["string"])).is_err());
    }

    #[test]
    fn test_validate_predicate() {
        assert!(SchemaDescriptor::validate(&json!({"name": "string", "email": "email"})));
        assert!(!SchemaDescriptor::validate(&json!({"name": "invalid_type"})));
        assert!(!SchemaDescriptor::validate(&json!({})));
        assert!(!SchemaDescriptor::validate(&json!("string")));
    }

    #[test]
    fn test_serde_round_trip() {
        let schema = contact();
        let text = serde_json::to_string(&schema).unwrap();
        let back: SchemaDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(schema, back);

        let bad: Result<SchemaDescriptor, _> = serde_json::from_str(r#"{"x": "nope"}"#);
        assert!(bad.is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field_type() -> impl Strategy<Value = FieldType> {
        prop::sample::select(FieldType::ALL.to_vec())
    }

    proptest! {
        /// Property: any 1..=50 uniquely named valid fields construct, and the
        /// wire shape keeps every name in order
        #[test]
        fn test_valid_schemas_construct(types in prop::collection::vec(field_type(), 1..=MAX_FIELDS)) {
            let fields: Vec<_> = types
                .iter()
                .enumerate()
                .map(|(i, t)| (format!("field_{}", i), *t))
                .collect();
            let schema = SchemaDescriptor::new(fields.clone()).unwrap();

            let wire = schema.to_wire();
            let map = wire.as_object().unwrap();
            prop_assert_eq!(map.len(), fields.len());
            let names: Vec<&String> = map.keys().collect();
            let expected: Vec<&String> = fields.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(names, expected);
            prop_assert_eq!(SchemaDescriptor::from_json(&wire).unwrap(), schema);
        }

        /// Property: more than 50 fields never construct
        #[test]
        fn test_oversized_schemas_rejected(extra in 1usize..20) {
            let fields: Vec<_> = (0..MAX_FIELDS + extra)
                .map(|i| (format!("field_{}", i), FieldType::String))
                .collect();
            prop_assert!(matches!(
                SchemaDescriptor::new(fields),
                Err(DomainError::InvalidSchema(_))
            ));
        }
    }
}
