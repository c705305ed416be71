//! Field normalization.
//!
//! Entities and levels carry custom fields whose raw form is a type string plus
//! an untyped JSON value. [`normalize_field`] turns one raw field into a
//! [`Field`] whose [`FieldValue`] variant is fixed by the type string:
//!
//! | Type string | Variant |
//! |---|---|
//! | `Int`, `Float`, `String`, `Bool`, `Color`, `FilePath` | scalar, raw value kept |
//! | `Point` | [`FieldValue::Point`], `[x, y]` becomes an `IVec2` |
//! | `LocalEnum.Name` / `ExternalEnum.Name` | [`FieldValue::Enum`], with the resolved [`Enum`] |
//! | `Array<...>` around any of the above | the matching `*Array` variant |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::math::IVec2;
use bevy_ldtkmap_assets::format::RawFieldInstance;
use serde_json::Value;

use crate::definitions::{Definitions, Enum};
use crate::error::{LdtkError, ReferenceKind};

/// Discriminant of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int,
    Float,
    String,
    Bool,
    Color,
    Point,
    FilePath,
    Enum,
    IntArray,
    FloatArray,
    StringArray,
    BoolArray,
    ColorArray,
    PointArray,
    FilePathArray,
    EnumArray,
}

impl FieldKind {
    /// Kind for a parsed type string. `None` for unknown scalar names.
    fn from_type_name(parsed: &FieldTypeName<'_>) -> Option<Self> {
        if parsed.enum_name.is_some() {
            return Some(if parsed.is_array {
                FieldKind::EnumArray
            } else {
                FieldKind::Enum
            });
        }

        let kind = match (parsed.inner, parsed.is_array) {
            ("Int", false) => FieldKind::Int,
            ("Float", false) => FieldKind::Float,
            ("String", false) => FieldKind::String,
            ("Bool", false) => FieldKind::Bool,
            ("Color", false) => FieldKind::Color,
            ("Point", false) => FieldKind::Point,
            ("FilePath", false) => FieldKind::FilePath,
            ("Int", true) => FieldKind::IntArray,
            ("Float", true) => FieldKind::FloatArray,
            ("String", true) => FieldKind::StringArray,
            ("Bool", true) => FieldKind::BoolArray,
            ("Color", true) => FieldKind::ColorArray,
            ("Point", true) => FieldKind::PointArray,
            ("FilePath", true) => FieldKind::FilePathArray,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldKind::IntArray
                | FieldKind::FloatArray
                | FieldKind::StringArray
                | FieldKind::BoolArray
                | FieldKind::ColorArray
                | FieldKind::PointArray
                | FieldKind::FilePathArray
                | FieldKind::EnumArray
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A normalized field value.
///
/// Scalars are `None` when the raw value is `null`. Arrays keep `null`
/// elements as `None`, except point arrays, which never contain them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(Option<i64>),
    Float(Option<f64>),
    String(Option<String>),
    Bool(Option<bool>),
    /// Hex color string, e.g. `#FF0000`
    Color(Option<String>),
    Point(Option<IVec2>),
    FilePath(Option<String>),
    Enum {
        value: Option<String>,
        definition: Arc<Enum>,
    },
    IntArray(Vec<Option<i64>>),
    FloatArray(Vec<Option<f64>>),
    StringArray(Vec<Option<String>>),
    BoolArray(Vec<Option<bool>>),
    ColorArray(Vec<Option<String>>),
    PointArray(Vec<IVec2>),
    FilePathArray(Vec<Option<String>>),
    EnumArray {
        values: Vec<Option<String>>,
        definition: Arc<Enum>,
    },
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Color(_) => FieldKind::Color,
            FieldValue::Point(_) => FieldKind::Point,
            FieldValue::FilePath(_) => FieldKind::FilePath,
            FieldValue::Enum { .. } => FieldKind::Enum,
            FieldValue::IntArray(_) => FieldKind::IntArray,
            FieldValue::FloatArray(_) => FieldKind::FloatArray,
            FieldValue::StringArray(_) => FieldKind::StringArray,
            FieldValue::BoolArray(_) => FieldKind::BoolArray,
            FieldValue::ColorArray(_) => FieldKind::ColorArray,
            FieldValue::PointArray(_) => FieldKind::PointArray,
            FieldValue::FilePathArray(_) => FieldKind::FilePathArray,
            FieldValue::EnumArray { .. } => FieldKind::EnumArray,
        }
    }

    /// The enum this value belongs to, for `Enum` and `EnumArray` values.
    pub fn enum_ref(&self) -> Option<&Arc<Enum>> {
        match self {
            FieldValue::Enum { definition, .. } | FieldValue::EnumArray { definition, .. } => {
                Some(definition)
            }
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => *value,
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => *value,
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => *value,
            _ => None,
        }
    }

    /// String payload of `String`, `Color`, `FilePath` and `Enum` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value)
            | FieldValue::Color(value)
            | FieldValue::FilePath(value)
            | FieldValue::Enum { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<IVec2> {
        match self {
            FieldValue::Point(value) => *value,
            _ => None,
        }
    }
}

/// One custom field of an entity or level.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub identifier: String,
    /// Uid of the field definition, when the file records it
    pub def_uid: Option<i64>,
    pub value: FieldValue,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    pub fn enum_ref(&self) -> Option<&Arc<Enum>> {
        self.value.enum_ref()
    }
}

/// Fields keyed by identifier, in declaration order.
///
/// Inserting an identifier that is already present replaces the earlier field
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldMap {
    pub fn insert(&mut self, field: Field) {
        if let Some(&position) = self.index.get(&field.identifier) {
            self.fields[position] = field;
        } else {
            self.index.insert(field.identifier.clone(), self.fields.len());
            self.fields.push(field);
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&Field> {
        self.index.get(identifier).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Normalize every raw field in order.
    pub fn from_raw(
        raw_fields: &[RawFieldInstance],
        owner: &str,
        defs: &Definitions,
    ) -> Result<Self, LdtkError> {
        let mut map = FieldMap::default();
        for raw in raw_fields {
            map.insert(normalize_field(raw, owner, defs)?);
        }
        Ok(map)
    }
}

/// Parsed form of a field type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeName<'a> {
    pub is_array: bool,
    /// Enum name for `LocalEnum.X` / `ExternalEnum.X`
    pub enum_name: Option<&'a str>,
    /// Scalar name, or the enum name for enum types
    pub inner: &'a str,
}

/// Parse `[Array<]((LocalEnum|ExternalEnum).Name | Name)[>]`.
///
/// Returns `None` if the string does not follow the grammar. The array wrapper
/// must be complete: `Array<Int` and `Int>` are rejected.
pub fn parse_field_type(type_name: &str) -> Option<FieldTypeName<'_>> {
    let (is_array, body) = match type_name.strip_prefix("Array<") {
        Some(rest) => (true, rest.strip_suffix('>')?),
        None => (false, type_name),
    };

    let (enum_name, inner) = match body.split_once('.') {
        Some(("LocalEnum" | "ExternalEnum", name)) => (Some(name), name),
        Some(_) => return None,
        None => (None, body),
    };

    let is_word = !inner.is_empty() && inner.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_word {
        return None;
    }

    Some(FieldTypeName {
        is_array,
        enum_name,
        inner,
    })
}

/// Normalize one raw field.
///
/// # Arguments
/// * `raw` - The raw field instance
/// * `owner` - Identifier of the entity or level holding the field, for errors
/// * `defs` - Definitions to resolve enum references against
///
/// # Errors
/// * [`LdtkError::MalformedFieldType`] - The type string is not recognized
/// * [`LdtkError::DanglingReference`] - The type names an enum that does not exist
/// * [`LdtkError::FieldValueMismatch`] - The value does not fit the declared type
pub fn normalize_field(
    raw: &RawFieldInstance,
    owner: &str,
    defs: &Definitions,
) -> Result<Field, LdtkError> {
    let malformed = || LdtkError::MalformedFieldType {
        field: raw.identifier.clone(),
        owner: owner.to_string(),
        type_name: raw.field_type.clone(),
    };

    let parsed = parse_field_type(&raw.field_type).ok_or_else(malformed)?;
    let kind = FieldKind::from_type_name(&parsed).ok_or_else(malformed)?;

    let definition = match parsed.enum_name {
        Some(name) => Some(defs.enums.get(name).cloned().ok_or_else(|| {
            LdtkError::DanglingReference {
                kind: ReferenceKind::Enum,
                id: name.to_string(),
                referrer: format!("{}.{}", owner, raw.identifier),
            }
        })?),
        None => None,
    };

    let mismatch = || LdtkError::FieldValueMismatch {
        field: raw.identifier.clone(),
        owner: owner.to_string(),
        expected: kind,
    };

    let value = convert_value(kind, &raw.value, definition).ok_or_else(mismatch)?;

    Ok(Field {
        identifier: raw.identifier.clone(),
        def_uid: raw.def_uid,
        value,
    })
}

/// Build the typed value. `None` means the JSON shape does not fit `kind`.
fn convert_value(kind: FieldKind, raw: &Value, definition: Option<Arc<Enum>>) -> Option<FieldValue> {
    let value = match kind {
        FieldKind::Int => FieldValue::Int(nullable(raw, Value::as_i64)?),
        FieldKind::Float => FieldValue::Float(nullable(raw, Value::as_f64)?),
        FieldKind::String => FieldValue::String(nullable(raw, as_string)?),
        FieldKind::Bool => FieldValue::Bool(nullable(raw, Value::as_bool)?),
        FieldKind::Color => FieldValue::Color(nullable(raw, as_string)?),
        FieldKind::Point => FieldValue::Point(nullable(raw, as_point)?),
        FieldKind::FilePath => FieldValue::FilePath(nullable(raw, as_string)?),
        FieldKind::Enum => FieldValue::Enum {
            value: nullable(raw, as_string)?,
            definition: definition?,
        },
        FieldKind::IntArray => FieldValue::IntArray(array(raw, Value::as_i64)?),
        FieldKind::FloatArray => FieldValue::FloatArray(array(raw, Value::as_f64)?),
        FieldKind::StringArray => FieldValue::StringArray(array(raw, as_string)?),
        FieldKind::BoolArray => FieldValue::BoolArray(array(raw, Value::as_bool)?),
        FieldKind::ColorArray => FieldValue::ColorArray(array(raw, as_string)?),
        FieldKind::PointArray => FieldValue::PointArray(
            raw_array(raw)?.iter().map(as_point).collect::<Option<Vec<_>>>()?,
        ),
        FieldKind::FilePathArray => FieldValue::FilePathArray(array(raw, as_string)?),
        FieldKind::EnumArray => FieldValue::EnumArray {
            values: array(raw, as_string)?,
            definition: definition?,
        },
    };
    Some(value)
}

/// `null` → `Some(None)`, convertible → `Some(Some(v))`, anything else → `None`.
fn nullable<T>(raw: &Value, convert: impl Fn(&Value) -> Option<T>) -> Option<Option<T>> {
    if raw.is_null() {
        Some(None)
    } else {
        convert(raw).map(Some)
    }
}

/// Array values; a `null` array is treated as empty.
fn raw_array(raw: &Value) -> Option<&[Value]> {
    match raw {
        Value::Null => Some(&[][..]),
        Value::Array(items) => Some(items.as_slice()),
        _ => None,
    }
}

fn array<T>(raw: &Value, convert: impl Fn(&Value) -> Option<T>) -> Option<Vec<Option<T>>> {
    raw_array(raw)?
        .iter()
        .map(|item| nullable(item, &convert))
        .collect()
}

fn as_string(raw: &Value) -> Option<String> {
    raw.as_str().map(str::to_string)
}

/// Accepts `[x, y]` and the `{ "cx": x, "cy": y }` form.
fn as_point(raw: &Value) -> Option<IVec2> {
    let (x, y) = match raw {
        Value::Array(items) if items.len() == 2 => (&items[0], &items[1]),
        Value::Object(map) => (map.get("cx")?, map.get("cy")?),
        _ => return None,
    };
    Some(IVec2::new(as_coordinate(x)?, as_coordinate(y)?))
}

fn as_coordinate(raw: &Value) -> Option<i32> {
    raw.as_i64()
        .or_else(|| raw.as_f64().map(|f| f as i64))
        .and_then(|v| i32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ldtkmap_assets::format::RawDefinitions;
    use serde_json::json;

    fn defs() -> Definitions {
        let raw: RawDefinitions = serde_json::from_value(json!({
            "enums": [
                { "identifier": "Color", "uid": 1, "values": [{ "id": "RED" }, { "id": "BLUE" }] },
                { "identifier": "Item", "uid": 2, "values": [{ "id": "Sword" }] }
            ]
        }))
        .unwrap();
        Definitions::from_raw(Some(&raw))
    }

    fn raw_field(field_type: &str, value: Value) -> RawFieldInstance {
        RawFieldInstance {
            identifier: "test".to_string(),
            field_type: field_type.to_string(),
            value,
            def_uid: Some(7),
        }
    }

    fn normalize(field_type: &str, value: Value) -> Result<Field, LdtkError> {
        normalize_field(&raw_field(field_type, value), "Hero", &defs())
    }

    #[test]
    fn test_parse_scalar_type() {
        let parsed = parse_field_type("Int").unwrap();
        assert!(!parsed.is_array);
        assert_eq!(parsed.enum_name, None);
        assert_eq!(parsed.inner, "Int");
    }

    #[test]
    fn test_parse_enum_array_type() {
        let parsed = parse_field_type("Array<ExternalEnum.Item>").unwrap();
        assert!(parsed.is_array);
        assert_eq!(parsed.enum_name, Some("Item"));
    }

    #[test]
    fn test_parse_rejects_malformed_types() {
        for bad in [
            "",
            "Array<Int",
            "Array<>",
            "Global.Color",
            "LocalEnum.",
            "Local Enum",
            "Array<Array<Int>>",
        ] {
            assert!(parse_field_type(bad).is_none(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_scalar_values_round_trip() {
        let cases = [
            ("Int", json!(42), FieldValue::Int(Some(42))),
            ("Float", json!(1.5), FieldValue::Float(Some(1.5))),
            ("Float", json!(2), FieldValue::Float(Some(2.0))),
            ("String", json!("hello"), FieldValue::String(Some("hello".into()))),
            ("Bool", json!(true), FieldValue::Bool(Some(true))),
            ("Color", json!("#FF8800"), FieldValue::Color(Some("#FF8800".into()))),
            ("FilePath", json!("a/b.png"), FieldValue::FilePath(Some("a/b.png".into()))),
            ("Int", Value::Null, FieldValue::Int(None)),
        ];

        for (field_type, raw, expected) in cases {
            let field = normalize(field_type, raw).unwrap();
            assert_eq!(field.value, expected, "type {field_type}");
            assert_eq!(field.def_uid, Some(7));
        }
    }

    #[test]
    fn test_point_normalized() {
        let field = normalize("Point", json!([3, 7])).unwrap();
        assert_eq!(field.kind(), FieldKind::Point);
        assert_eq!(field.value.as_point(), Some(IVec2::new(3, 7)));

        let field = normalize("Point", json!({ "cx": 4, "cy": 1 })).unwrap();
        assert_eq!(field.value, FieldValue::Point(Some(IVec2::new(4, 1))));
    }

    #[test]
    fn test_null_point_is_absent() {
        let field = normalize("Point", Value::Null).unwrap();
        assert_eq!(field.value, FieldValue::Point(None));
    }

    #[test]
    fn test_point_array_has_no_absent_elements() {
        let field = normalize("Array<Point>", json!([[0, 1], [2, 3]])).unwrap();
        assert_eq!(
            field.value,
            FieldValue::PointArray(vec![IVec2::new(0, 1), IVec2::new(2, 3)])
        );

        let err = normalize("Array<Point>", json!([[0, 1], null])).unwrap_err();
        assert!(matches!(
            err,
            LdtkError::FieldValueMismatch { expected: FieldKind::PointArray, .. }
        ));
    }

    #[test]
    fn test_array_keeps_null_elements() {
        let field = normalize("Array<Int>", json!([1, null, 3])).unwrap();
        assert_eq!(field.value, FieldValue::IntArray(vec![Some(1), None, Some(3)]));
    }

    #[test]
    fn test_enum_field_resolves_definition() {
        let field = normalize("LocalEnum.Color", json!("RED")).unwrap();
        assert_eq!(field.kind(), FieldKind::Enum);
        assert_eq!(field.value.as_str(), Some("RED"));
        assert_eq!(field.enum_ref().unwrap().identifier, "Color");
    }

    #[test]
    fn test_enum_array_resolves_definition() {
        let field = normalize("Array<ExternalEnum.Item>", json!(["Sword", null])).unwrap();
        assert_eq!(field.kind(), FieldKind::EnumArray);
        assert_eq!(field.enum_ref().unwrap().identifier, "Item");
        assert!(field.kind().is_array());
    }

    #[test]
    fn test_unknown_enum_is_dangling() {
        let err = normalize("LocalEnum.Shape", json!("Circle")).unwrap_err();
        match err {
            LdtkError::DanglingReference { kind, id, referrer } => {
                assert_eq!(kind, ReferenceKind::Enum);
                assert_eq!(id, "Shape");
                assert_eq!(referrer, "Hero.test");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_malformed_type_names_field_and_owner() {
        let err = normalize("Array<Int", json!([])).unwrap_err();
        match err {
            LdtkError::MalformedFieldType {
                field,
                owner,
                type_name,
            } => {
                assert_eq!(field, "test");
                assert_eq!(owner, "Hero");
                assert_eq!(type_name, "Array<Int");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_scalar_name_is_malformed() {
        let err = normalize("EntityRef", json!(null)).unwrap_err();
        assert!(matches!(err, LdtkError::MalformedFieldType { .. }));

        // "Enum" alone names no enum
        let err = normalize("Enum", json!("RED")).unwrap_err();
        assert!(matches!(err, LdtkError::MalformedFieldType { .. }));
    }

    #[test]
    fn test_value_shape_mismatch() {
        let err = normalize("Int", json!("three")).unwrap_err();
        assert!(matches!(
            err,
            LdtkError::FieldValueMismatch { expected: FieldKind::Int, .. }
        ));
    }

    #[test]
    fn test_field_map_last_write_wins_in_place() {
        let defs = defs();
        let mut first = raw_field("Int", json!(1));
        first.identifier = "hp".into();
        let mut second = raw_field("Bool", json!(false));
        second.identifier = "alive".into();
        let mut third = raw_field("Int", json!(5));
        third.identifier = "hp".into();

        let map = FieldMap::from_raw(&[first, second, third], "Hero", &defs).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("hp").unwrap().value.as_int(), Some(5));
        let order: Vec<_> = map.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(order, vec!["hp", "alive"]);
    }
}
