//! The codec turns effects into the json objects the led controller understands and back again.
//!
//! Every variant describes its fields once, as an ordered list of [`Field`] entries. A single
//! generic routine walks that schema in both directions; fields named `color` (case-insensitive)
//! hold a packed `0xRRGGBB` integer in memory and a `[red, green, blue]` array on the wire.

use serde_json::{Map, Number, Value};

use crate::color;

/// The static table mapping wire names to decoders.
pub mod registry;

/// Building effects from `field=value` text, e.g. command line arguments.
pub mod text;

/// The json object produced by encoding an effect. The effect name is never part of it; it travels
/// next to the properties (url path segment, separate record column).
pub type Properties = Map<String, Value>;

/// Name of the field that carries the color role.
pub const COLOR_FIELD: &str = "color";

/// Everything that can go wrong while encoding or decoding an effect. Each variant names the effect
/// and, where relevant, the offending field.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
  #[allow(clippy::missing_docs_in_private_items)]
  #[error("unknown effect '{name}'")]
  UnknownEffect { name: String },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: missing field '{field}'")]
  MissingField { effect: &'static str, field: &'static str },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: field '{field}' is not a valid {expected}")]
  TypeMismatch {
    effect: &'static str,
    field: &'static str,
    expected: FieldKind,
  },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: field '{field}' is not a [red, green, blue] array of 0-255 integers")]
  MalformedColor { effect: &'static str, field: &'static str },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: field '{field}' has a type that cannot be encoded")]
  UnsupportedFieldType { effect: &'static str, field: &'static str },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: field '{field}' is not a finite number")]
  NonFinite { effect: &'static str, field: &'static str },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: unknown field '{field}'")]
  UnknownField { effect: &'static str, field: String },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: unable to parse '{value}' for field '{field}'")]
  InvalidValue {
    effect: &'static str,
    field: &'static str,
    value: String,
  },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("{effect}: properties are not a json object")]
  NotAnObject { effect: &'static str },

  #[allow(clippy::missing_docs_in_private_items)]
  #[error("invalid json - {0}")]
  Json(#[from] serde_json::Error),
}

impl From<CodecError> for std::io::Error {
  fn from(error: CodecError) -> Self {
    std::io::Error::new(std::io::ErrorKind::InvalidData, error)
  }
}

/// The primitive kind a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  #[allow(clippy::missing_docs_in_private_items)]
  Integer,
  #[allow(clippy::missing_docs_in_private_items)]
  Float,
  #[allow(clippy::missing_docs_in_private_items)]
  Boolean,
  #[allow(clippy::missing_docs_in_private_items)]
  Text,
}

impl std::fmt::Display for FieldKind {
  fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      FieldKind::Integer => write!(formatter, "integer"),
      FieldKind::Float => write!(formatter, "float"),
      FieldKind::Boolean => write!(formatter, "boolean"),
      FieldKind::Text => write!(formatter, "string"),
    }
  }
}

/// One entry of a variant's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
  /// The json key; also the name used when assembling effects from text.
  pub name: &'static str,

  /// The in-memory kind. Color fields are packed integers.
  pub kind: FieldKind,
}

impl Field {
  #[allow(clippy::missing_docs_in_private_items)]
  pub const fn new(name: &'static str, kind: FieldKind) -> Self {
    Self { name, kind }
  }

  /// Color fields are recognized by name alone.
  pub fn is_color(&self) -> bool {
    self.name.eq_ignore_ascii_case(COLOR_FIELD)
  }
}

/// A single field value, as read from or handed to a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  #[allow(clippy::missing_docs_in_private_items)]
  Integer(i64),
  #[allow(clippy::missing_docs_in_private_items)]
  Float(f64),
  #[allow(clippy::missing_docs_in_private_items)]
  Boolean(bool),
  #[allow(clippy::missing_docs_in_private_items)]
  Text(String),
}

impl FieldValue {
  /// The kind of this value, compared against the schema before encoding.
  pub fn kind(&self) -> FieldKind {
    match self {
      FieldValue::Integer(_) => FieldKind::Integer,
      FieldValue::Float(_) => FieldKind::Float,
      FieldValue::Boolean(_) => FieldKind::Boolean,
      FieldValue::Text(_) => FieldKind::Text,
    }
  }
}

impl From<i32> for FieldValue {
  fn from(value: i32) -> Self {
    FieldValue::Integer(i64::from(value))
  }
}

impl From<u32> for FieldValue {
  fn from(value: u32) -> Self {
    FieldValue::Integer(i64::from(value))
  }
}

impl From<f64> for FieldValue {
  fn from(value: f64) -> Self {
    FieldValue::Float(value)
  }
}

impl From<bool> for FieldValue {
  fn from(value: bool) -> Self {
    FieldValue::Boolean(value)
  }
}

impl From<String> for FieldValue {
  fn from(value: String) -> Self {
    FieldValue::Text(value)
  }
}

/// The decoded, schema-checked values handed to [`Variant::from_fields`].
#[derive(Debug)]
pub struct Fields {
  /// Used in error messages.
  effect: &'static str,

  /// Values in schema order.
  values: Vec<(&'static str, FieldValue)>,
}

impl Fields {
  /// An empty set of values for the given effect.
  fn new(effect: &'static str, capacity: usize) -> Self {
    Self {
      effect,
      values: Vec::with_capacity(capacity),
    }
  }

  /// Records the value of a field.
  fn push(&mut self, field: &'static str, value: FieldValue) {
    self.values.push((field, value));
  }

  /// Returns the raw value of a field, along with the static name used for errors.
  fn get(&self, field: &'static str) -> Result<&FieldValue, CodecError> {
    self
      .values
      .iter()
      .find(|(name, _)| *name == field)
      .map(|(_, value)| value)
      .ok_or(CodecError::MissingField {
        effect: self.effect,
        field,
      })
  }

  /// Error for a value that does not fit the requested kind.
  fn mismatch(&self, field: &'static str, expected: FieldKind) -> CodecError {
    CodecError::TypeMismatch {
      effect: self.effect,
      field,
      expected,
    }
  }

  /// Reads an integer field into any integer type it fits in; out-of-range values are a type
  /// mismatch rather than being truncated.
  pub fn integer<T>(&self, field: &'static str) -> Result<T, CodecError>
  where
    T: TryFrom<i64>,
  {
    match self.get(field)? {
      FieldValue::Integer(value) => T::try_from(*value).map_err(|_| self.mismatch(field, FieldKind::Integer)),
      _ => Err(self.mismatch(field, FieldKind::Integer)),
    }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn float(&self, field: &'static str) -> Result<f64, CodecError> {
    match self.get(field)? {
      FieldValue::Float(value) => Ok(*value),
      _ => Err(self.mismatch(field, FieldKind::Float)),
    }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn boolean(&self, field: &'static str) -> Result<bool, CodecError> {
    match self.get(field)? {
      FieldValue::Boolean(value) => Ok(*value),
      _ => Err(self.mismatch(field, FieldKind::Boolean)),
    }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn text(&self, field: &'static str) -> Result<String, CodecError> {
    match self.get(field)? {
      FieldValue::Text(value) => Ok(value.clone()),
      _ => Err(self.mismatch(field, FieldKind::Text)),
    }
  }

  /// Reads a packed color.
  pub fn color(&self, field: &'static str) -> Result<u32, CodecError> {
    self.integer::<u32>(field).map_err(|_| CodecError::MalformedColor {
      effect: self.effect,
      field,
    })
  }
}

/// Implemented by every effect variant: its wire name, its schema, and the glue between the struct
/// and schema-ordered values.
pub trait Variant: Default + Sized {
  /// The lowercase wire name; must match the effect name on the controller.
  const NAME: &'static str;

  /// The ordered field schema.
  const FIELDS: &'static [Field];

  /// The current value of the named field, `None` for names outside the schema.
  fn value(&self, field: &str) -> Option<FieldValue>;

  /// Builds the variant from decoded values.
  fn from_fields(fields: &Fields) -> Result<Self, CodecError>;
}

/// Encodes a variant into its json properties, field by field in schema order.
pub fn encode<V>(variant: &V) -> Result<Properties, CodecError>
where
  V: Variant,
{
  let mut properties = Properties::new();

  for field in V::FIELDS {
    let value = variant.value(field.name).ok_or(CodecError::UnsupportedFieldType {
      effect: V::NAME,
      field: field.name,
    })?;

    properties.insert(field.name.to_string(), encode_field(V::NAME, field, value)?);
  }

  Ok(properties)
}

/// Converts a single value according to its schema entry.
fn encode_field(effect: &'static str, field: &Field, value: FieldValue) -> Result<Value, CodecError> {
  if value.kind() != field.kind {
    return Err(CodecError::UnsupportedFieldType {
      effect,
      field: field.name,
    });
  }

  match (field.is_color(), value) {
    (true, FieldValue::Integer(packed)) => u32::try_from(packed)
      .map(color::to_json)
      .map_err(|_| CodecError::MalformedColor {
        effect,
        field: field.name,
      }),
    (true, _) => Err(CodecError::UnsupportedFieldType {
      effect,
      field: field.name,
    }),
    (false, FieldValue::Integer(value)) => Ok(Value::from(value)),
    (false, FieldValue::Float(value)) => Number::from_f64(value)
      .map(Value::Number)
      .ok_or(CodecError::NonFinite {
        effect,
        field: field.name,
      }),
    (false, FieldValue::Boolean(value)) => Ok(Value::Bool(value)),
    (false, FieldValue::Text(value)) => Ok(Value::String(value)),
  }
}

/// Decodes json properties into a variant. Absent color fields are an error; any other absent field
/// falls back to the variant's default.
pub fn decode<V>(properties: &Properties) -> Result<V, CodecError>
where
  V: Variant,
{
  let defaults = V::default();
  let mut fields = Fields::new(V::NAME, V::FIELDS.len());

  for field in V::FIELDS {
    let missing = CodecError::MissingField {
      effect: V::NAME,
      field: field.name,
    };

    let value = match properties.get(field.name) {
      Some(raw) if field.is_color() => color::from_json(raw)
        .map(FieldValue::from)
        .ok_or(CodecError::MalformedColor {
          effect: V::NAME,
          field: field.name,
        })?,
      None if field.is_color() => return Err(missing),
      Some(raw) => decode_field(V::NAME, field, raw)?,
      None => {
        log::trace!("{}: '{}' absent, using default", V::NAME, field.name);
        defaults.value(field.name).ok_or(missing)?
      }
    };

    fields.push(field.name, value);
  }

  V::from_fields(&fields)
}

/// Reads a non-color json value as the kind the schema asks for. Integers are accepted where a
/// float is expected; the reverse is a mismatch.
fn decode_field(effect: &'static str, field: &Field, raw: &Value) -> Result<FieldValue, CodecError> {
  let value = match field.kind {
    FieldKind::Integer => raw.as_i64().map(FieldValue::Integer),
    FieldKind::Float => raw.as_f64().map(FieldValue::Float),
    FieldKind::Boolean => raw.as_bool().map(FieldValue::Boolean),
    FieldKind::Text => raw.as_str().map(|text| FieldValue::Text(text.to_string())),
  };

  value.ok_or(CodecError::TypeMismatch {
    effect,
    field: field.name,
    expected: field.kind,
  })
}

#[cfg(test)]
mod tests {
  use super::{decode, encode, CodecError, Field, FieldKind, FieldValue, Fields, Properties, Variant};
  use serde_json::{json, Value};

  /// A variant using every field kind, to exercise the parts of the codec the led effects do not.
  #[derive(Debug, Clone, PartialEq)]
  struct Probe {
    color: u32,
    label: String,
    enabled: bool,
    ratio: f64,
    count: i32,
  }

  impl Default for Probe {
    fn default() -> Self {
      Self {
        color: 0x102030,
        label: "probe".into(),
        enabled: true,
        ratio: 0.5,
        count: 3,
      }
    }
  }

  impl Variant for Probe {
    const NAME: &'static str = "probe";
    const FIELDS: &'static [Field] = &[
      Field::new("Color", FieldKind::Integer),
      Field::new("label", FieldKind::Text),
      Field::new("enabled", FieldKind::Boolean),
      Field::new("ratio", FieldKind::Float),
      Field::new("count", FieldKind::Integer),
    ];

    fn value(&self, field: &str) -> Option<FieldValue> {
      match field {
        "Color" => Some(self.color.into()),
        "label" => Some(self.label.clone().into()),
        "enabled" => Some(self.enabled.into()),
        "ratio" => Some(self.ratio.into()),
        "count" => Some(self.count.into()),
        _ => None,
      }
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
      Ok(Self {
        color: fields.color("Color")?,
        label: fields.text("label")?,
        enabled: fields.boolean("enabled")?,
        ratio: fields.float("ratio")?,
        count: fields.integer("count")?,
      })
    }
  }

  /// A variant whose accessor disagrees with its own schema.
  #[derive(Debug, Default)]
  struct Broken;

  impl Variant for Broken {
    const NAME: &'static str = "broken";
    const FIELDS: &'static [Field] = &[Field::new("delay", FieldKind::Float)];

    fn value(&self, field: &str) -> Option<FieldValue> {
      match field {
        "delay" => Some(FieldValue::Text("soon".into())),
        _ => None,
      }
    }

    fn from_fields(_: &Fields) -> Result<Self, CodecError> {
      Ok(Broken)
    }
  }

  fn properties(value: Value) -> Properties {
    match value {
      Value::Object(map) => map,
      _ => panic!("not an object"),
    }
  }

  #[test]
  fn encodes_every_kind() {
    let probe = Probe {
      color: 0xFF00FF,
      label: "hello".into(),
      enabled: false,
      ratio: 1.25,
      count: -4,
    };

    let encoded = encode(&probe).expect("encodes");
    assert_eq!(
      Value::Object(encoded.clone()),
      json!({ "Color": [255, 0, 255], "label": "hello", "enabled": false, "ratio": 1.25, "count": -4 })
    );
    assert!(encoded["count"].is_i64());
    assert!(encoded["ratio"].is_f64());

    assert_eq!(decode::<Probe>(&encoded).expect("decodes"), probe);
  }

  #[test]
  fn color_role_is_case_insensitive() {
    assert!(Field::new("COLOR", FieldKind::Integer).is_color());
    assert!(Field::new("color", FieldKind::Integer).is_color());
    assert!(!Field::new("colors", FieldKind::Integer).is_color());
  }

  #[test]
  fn missing_fields_use_defaults_except_color() {
    let decoded = decode::<Probe>(&properties(json!({ "Color": [1, 2, 3] }))).expect("decodes");
    assert_eq!(
      decoded,
      Probe {
        color: 0x010203,
        ..Probe::default()
      }
    );

    let result = decode::<Probe>(&properties(json!({ "label": "x" })));
    assert!(matches!(
      result,
      Err(CodecError::MissingField {
        effect: "probe",
        field: "Color"
      })
    ));
  }

  #[test]
  fn wrong_kinds_are_mismatches() {
    let cases = [
      (json!({ "Color": [0, 0, 0], "label": 4 }), "label"),
      (json!({ "Color": [0, 0, 0], "enabled": "yes" }), "enabled"),
      (json!({ "Color": [0, 0, 0], "ratio": "fast" }), "ratio"),
      (json!({ "Color": [0, 0, 0], "count": 1.5 }), "count"),
      (json!({ "Color": [0, 0, 0], "count": 4294967296u64 }), "count"),
    ];

    for (input, expected) in cases {
      match decode::<Probe>(&properties(input)) {
        Err(CodecError::TypeMismatch { effect, field, .. }) => {
          assert_eq!(effect, "probe");
          assert_eq!(field, expected);
        }
        other => panic!("expected mismatch on {expected}, got {other:?}"),
      }
    }
  }

  #[test]
  fn integers_are_accepted_as_floats() {
    let decoded = decode::<Probe>(&properties(json!({ "Color": [0, 0, 0], "ratio": 2 }))).expect("decodes");
    assert_eq!(decoded.ratio, 2.0);
  }

  #[test]
  fn malformed_colors_are_rejected() {
    let result = decode::<Probe>(&properties(json!({ "Color": "red" })));
    assert!(matches!(result, Err(CodecError::MalformedColor { field: "Color", .. })));
  }

  #[test]
  fn encode_fails_loudly_on_schema_disagreement() {
    assert!(matches!(
      encode(&Broken),
      Err(CodecError::UnsupportedFieldType {
        effect: "broken",
        field: "delay"
      })
    ));
  }

  #[test]
  fn non_finite_floats_are_not_encoded() {
    let probe = Probe {
      ratio: f64::NAN,
      ..Probe::default()
    };
    assert!(matches!(encode(&probe), Err(CodecError::NonFinite { field: "ratio", .. })));
  }
}
