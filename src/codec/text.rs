use serde_json::{Number, Value};

use super::{registry::REGISTRY, CodecError, Field, FieldKind};
use crate::color;
use crate::effects::Effect;

/// Splits a `field=value` argument.
pub fn split_pair(input: &str) -> Option<(&str, &str)> {
  input
    .split_once('=')
    .map(|(field, value)| (field.trim(), value.trim()))
    .filter(|(field, _)| !field.is_empty())
}

/// Builds the named effect from its defaults, replacing the fields named in `pairs` with their
/// parsed textual values. Field names are matched case-insensitively against the variant's schema.
pub fn assemble<I, K, V>(name: &str, pairs: I) -> Result<Effect, CodecError>
where
  I: IntoIterator<Item = (K, V)>,
  K: AsRef<str>,
  V: AsRef<str>,
{
  let entry = REGISTRY.lookup(name)?;
  let mut properties = entry.default_effect().encode()?;

  for (key, raw) in pairs {
    let key = key.as_ref();
    let field = entry
      .fields()
      .iter()
      .find(|field| field.name.eq_ignore_ascii_case(key))
      .ok_or_else(|| CodecError::UnknownField {
        effect: entry.name(),
        field: key.to_string(),
      })?;

    log::debug!("{}: setting '{}' from '{}'", entry.name(), field.name, raw.as_ref());
    properties.insert(field.name.to_string(), parse_value(entry.name(), field, raw.as_ref())?);
  }

  entry.decode(&properties)
}

/// Parses text into the json value the codec expects for the field.
fn parse_value(effect: &'static str, field: &Field, raw: &str) -> Result<Value, CodecError> {
  let trimmed = raw.trim();

  let value = if field.is_color() {
    color::parse(trimmed).map(color::to_json)
  } else {
    match field.kind {
      FieldKind::Integer => trimmed.parse::<i64>().ok().map(Value::from),
      FieldKind::Float => trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number),
      FieldKind::Boolean => trimmed.parse::<bool>().ok().map(Value::Bool),
      FieldKind::Text => Some(Value::String(raw.to_string())),
    }
  };

  value.ok_or_else(|| CodecError::InvalidValue {
    effect,
    field: field.name,
    value: raw.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::{assemble, split_pair};
  use crate::codec::CodecError;
  use crate::color;
  use crate::effects::{Effect, Flash, Kitt, Snake};

  #[test]
  fn splits_pairs() {
    assert_eq!(split_pair("color=cyan"), Some(("color", "cyan")));
    assert_eq!(split_pair(" delay = 0.5 "), Some(("delay", "0.5")));
    assert_eq!(split_pair("loops"), None);
    assert_eq!(split_pair("=4"), None);
  }

  #[test]
  fn no_pairs_gives_defaults() {
    let effect = assemble("snake", Vec::<(&str, &str)>::new()).expect("assembles");
    assert_eq!(effect, Effect::Snake(Snake::default()));
  }

  #[test]
  fn overrides_fields() {
    let effect = assemble("Flash", [("color", "cyan"), ("FLASHES", "42")]).expect("assembles");
    assert_eq!(effect, Effect::Flash(Flash::new(color::CYAN, 0.2, 42)));

    let effect = assemble("kitt", [("delay", "0.05"), ("color", "#123456"), ("loops", "0")]).expect("assembles");
    assert_eq!(effect, Effect::Kitt(Kitt::new(0x123456, 0.05, 10, 0)));
  }

  #[test]
  fn rejects_unknown_fields() {
    let result = assemble("snake", [("loops", "3")]);
    assert!(matches!(result, Err(CodecError::UnknownField { effect: "snake", ref field }) if field == "loops"));
  }

  #[test]
  fn rejects_unparsable_values() {
    let cases = [("color", "purple"), ("delay", "soon"), ("length", "1.5"), ("delay", "NaN")];

    for (field, value) in cases {
      match assemble("snake", [(field, value)]) {
        Err(CodecError::InvalidValue { effect: "snake", .. }) => (),
        other => panic!("expected invalid value for {field}={value}, got {other:?}"),
      }
    }
  }

  #[test]
  fn out_of_range_integers_are_mismatches() {
    let result = assemble("snake", [("length", "99999999999")]);
    assert!(matches!(result, Err(CodecError::TypeMismatch { field: "length", .. })));
  }
}
