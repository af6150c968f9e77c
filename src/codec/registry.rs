use super::{CodecError, Field, Properties, Variant};
use crate::effects::{Effect, Flash, Kitt, Snake};

/// Decodes the properties of one specific variant.
pub type Decoder = fn(&Properties) -> Result<Effect, CodecError>;

/// A single row of the registry.
pub struct Entry {
  /// The lowercase wire name.
  name: &'static str,

  /// The variant's schema, for introspection.
  fields: &'static [Field],

  /// Builds the variant from json.
  decoder: Decoder,

  /// Builds the variant with all default values.
  fallback: fn() -> Effect,
}

impl Entry {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn name(&self) -> &'static str {
    self.name
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn fields(&self) -> &'static [Field] {
    self.fields
  }

  /// The variant with every field at its default.
  pub fn default_effect(&self) -> Effect {
    (self.fallback)()
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn decode(&self, properties: &Properties) -> Result<Effect, CodecError> {
    (self.decoder)(properties)
  }
}

/// The explicit mapping from wire name to variant. Adding an effect means adding one row.
pub struct Registry {
  #[allow(clippy::missing_docs_in_private_items)]
  entries: &'static [Entry],
}

/// Every effect the controller knows about.
pub static REGISTRY: Registry = Registry {
  entries: &[
    Entry {
      name: Flash::NAME,
      fields: Flash::FIELDS,
      decoder: decode_into::<Flash>,
      fallback: default_of::<Flash>,
    },
    Entry {
      name: Snake::NAME,
      fields: Snake::FIELDS,
      decoder: decode_into::<Snake>,
      fallback: default_of::<Snake>,
    },
    Entry {
      name: Kitt::NAME,
      fields: Kitt::FIELDS,
      decoder: decode_into::<Kitt>,
      fallback: default_of::<Kitt>,
    },
  ],
};

#[allow(clippy::missing_docs_in_private_items)]
fn decode_into<V>(properties: &Properties) -> Result<Effect, CodecError>
where
  V: Variant,
  Effect: From<V>,
{
  super::decode::<V>(properties).map(Effect::from)
}

#[allow(clippy::missing_docs_in_private_items)]
fn default_of<V>() -> Effect
where
  V: Variant,
  Effect: From<V>,
{
  Effect::from(V::default())
}

impl Registry {
  /// Case-insensitive exact lookup.
  pub fn lookup(&self, name: &str) -> Result<&Entry, CodecError> {
    self
      .entries
      .iter()
      .find(|entry| entry.name.eq_ignore_ascii_case(name))
      .ok_or_else(|| {
        log::warn!("no effect registered under '{name}'");
        CodecError::UnknownEffect { name: name.to_string() }
      })
  }

  /// Looks up the variant for `name` and decodes the properties with it.
  pub fn decode(&self, name: &str, properties: &Properties) -> Result<Effect, CodecError> {
    let entry = self.lookup(name)?;
    log::debug!("decoding '{}' effect from {properties:?}", entry.name);
    entry.decode(properties)
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn entries(&self) -> impl Iterator<Item = &Entry> {
    self.entries.iter()
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.entries.iter().map(|entry| entry.name)
  }
}

#[cfg(test)]
mod tests {
  use super::REGISTRY;
  use crate::codec::{CodecError, Properties};
  use crate::effects::{Effect, Flash};

  #[test]
  fn names_are_lowercase_and_unique() {
    let names = REGISTRY.names().collect::<Vec<&str>>();
    assert_eq!(names, vec!["flash", "snake", "kitt"]);

    for name in &names {
      assert_eq!(name.to_lowercase(), *name);
    }
  }

  #[test]
  fn entries_agree_with_their_variant() {
    for entry in REGISTRY.entries() {
      let effect = entry.default_effect();
      assert_eq!(effect.name(), entry.name());
      assert_eq!(effect.fields(), entry.fields());
      assert_eq!(entry.fields().iter().filter(|field| field.is_color()).count(), 1);
    }
  }

  #[test]
  fn lookup_ignores_case() {
    for name in ["kitt", "KITT", "Kitt"] {
      assert_eq!(REGISTRY.lookup(name).map(|entry| entry.name()).ok(), Some("kitt"));
    }
  }

  #[test]
  fn unknown_names_are_errors() {
    let result = REGISTRY.decode("bogus", &Properties::new());
    assert!(matches!(result, Err(CodecError::UnknownEffect { ref name }) if name == "bogus"));

    assert!(REGISTRY.lookup("flashes").is_err());
    assert!(REGISTRY.lookup("").is_err());
    assert!(REGISTRY.lookup(" kitt ").is_err());
  }

  #[test]
  fn decodes_through_the_table() {
    let properties = Effect::from(Flash::default()).encode().expect("encodes");
    assert_eq!(
      REGISTRY.decode("Flash", &properties).expect("decodes"),
      Effect::Flash(Flash::default())
    );
  }
}
