use crate::codec::{self, registry::REGISTRY, CodecError, Field, FieldKind, FieldValue, Fields, Properties, Variant};
use crate::color;

/// Seconds between animation steps when none is given.
pub const DEFAULT_DELAY: f64 = 0.2;

/// Length, in leds, of snakes and kitt scanners when none is given.
pub const DEFAULT_LENGTH: i32 = 10;

#[allow(clippy::missing_docs_in_private_items)]
const COLOR: Field = Field::new(codec::COLOR_FIELD, FieldKind::Integer);
#[allow(clippy::missing_docs_in_private_items)]
const DELAY: Field = Field::new("delay", FieldKind::Float);
#[allow(clippy::missing_docs_in_private_items)]
const LENGTH: Field = Field::new("length", FieldKind::Integer);

/// Blinks the whole strip `flashes` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
  /// Packed `0xRRGGBB`; only set through `new` or decoding, which strip any alpha byte.
  color: u32,

  /// Seconds the strip stays on (and off) per flash.
  pub delay: f64,

  #[allow(clippy::missing_docs_in_private_items)]
  pub flashes: i32,
}

impl Flash {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new(color: u32, delay: f64, flashes: i32) -> Self {
    let color = color::from_argb(color);
    Self { color, delay, flashes }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn color(&self) -> u32 {
    self.color
  }
}

impl Default for Flash {
  fn default() -> Self {
    Self::new(color::RED, DEFAULT_DELAY, 1)
  }
}

impl Variant for Flash {
  const NAME: &'static str = "flash";
  const FIELDS: &'static [Field] = &[COLOR, DELAY, Field::new("flashes", FieldKind::Integer)];

  fn value(&self, field: &str) -> Option<FieldValue> {
    match field {
      "color" => Some(self.color.into()),
      "delay" => Some(self.delay.into()),
      "flashes" => Some(self.flashes.into()),
      _ => None,
    }
  }

  fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
    Ok(Self {
      color: fields.color("color")?,
      delay: fields.float("delay")?,
      flashes: fields.integer("flashes")?,
    })
  }
}

/// A run of `length` lit leds travelling along the strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snake {
  /// Packed `0xRRGGBB`; only set through `new` or decoding, which strip any alpha byte.
  color: u32,

  /// Seconds per step.
  pub delay: f64,

  #[allow(clippy::missing_docs_in_private_items)]
  pub length: i32,
}

impl Snake {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new(color: u32, delay: f64, length: i32) -> Self {
    let color = color::from_argb(color);
    Self { color, delay, length }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn color(&self) -> u32 {
    self.color
  }
}

impl Default for Snake {
  fn default() -> Self {
    Self::new(color::RED, DEFAULT_DELAY, DEFAULT_LENGTH)
  }
}

impl Variant for Snake {
  const NAME: &'static str = "snake";
  const FIELDS: &'static [Field] = &[COLOR, DELAY, LENGTH];

  fn value(&self, field: &str) -> Option<FieldValue> {
    match field {
      "color" => Some(self.color.into()),
      "delay" => Some(self.delay.into()),
      "length" => Some(self.length.into()),
      _ => None,
    }
  }

  fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
    Ok(Self {
      color: fields.color("color")?,
      delay: fields.float("delay")?,
      length: fields.integer("length")?,
    })
  }
}

/// The scanner bouncing back and forth, `loops` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kitt {
  /// Packed `0xRRGGBB`; only set through `new` or decoding, which strip any alpha byte.
  color: u32,

  /// Seconds per step.
  pub delay: f64,

  #[allow(clippy::missing_docs_in_private_items)]
  pub length: i32,

  #[allow(clippy::missing_docs_in_private_items)]
  pub loops: i32,
}

impl Kitt {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new(color: u32, delay: f64, length: i32, loops: i32) -> Self {
    Self {
      color: color::from_argb(color),
      delay,
      length,
      loops,
    }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn color(&self) -> u32 {
    self.color
  }
}

impl Default for Kitt {
  fn default() -> Self {
    Self::new(color::RED, DEFAULT_DELAY, DEFAULT_LENGTH, 1)
  }
}

impl Variant for Kitt {
  const NAME: &'static str = "kitt";
  const FIELDS: &'static [Field] = &[COLOR, DELAY, LENGTH, Field::new("loops", FieldKind::Integer)];

  fn value(&self, field: &str) -> Option<FieldValue> {
    match field {
      "color" => Some(self.color.into()),
      "delay" => Some(self.delay.into()),
      "length" => Some(self.length.into()),
      "loops" => Some(self.loops.into()),
      _ => None,
    }
  }

  fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
    Ok(Self {
      color: fields.color("color")?,
      delay: fields.float("delay")?,
      length: fields.integer("length")?,
      loops: fields.integer("loops")?,
    })
  }
}

/// Any effect the led controller can run. The variant's wire name doubles as the tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
  #[allow(clippy::missing_docs_in_private_items)]
  Flash(Flash),
  #[allow(clippy::missing_docs_in_private_items)]
  Snake(Snake),
  #[allow(clippy::missing_docs_in_private_items)]
  Kitt(Kitt),
}

impl From<Flash> for Effect {
  fn from(flash: Flash) -> Self {
    Effect::Flash(flash)
  }
}

impl From<Snake> for Effect {
  fn from(snake: Snake) -> Self {
    Effect::Snake(snake)
  }
}

impl From<Kitt> for Effect {
  fn from(kitt: Kitt) -> Self {
    Effect::Kitt(kitt)
  }
}

impl Effect {
  /// The lowercase name the controller knows this effect by.
  pub fn name(&self) -> &'static str {
    match self {
      Effect::Flash(_) => Flash::NAME,
      Effect::Snake(_) => Snake::NAME,
      Effect::Kitt(_) => Kitt::NAME,
    }
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub fn fields(&self) -> &'static [Field] {
    match self {
      Effect::Flash(_) => Flash::FIELDS,
      Effect::Snake(_) => Snake::FIELDS,
      Effect::Kitt(_) => Kitt::FIELDS,
    }
  }

  /// The json properties sent to the controller. The name is not included.
  pub fn encode(&self) -> Result<Properties, CodecError> {
    match self {
      Effect::Flash(flash) => codec::encode(flash),
      Effect::Snake(snake) => codec::encode(snake),
      Effect::Kitt(kitt) => codec::encode(kitt),
    }
  }

  /// Rebuilds an effect from its name and properties.
  pub fn decode(name: &str, properties: &Properties) -> Result<Self, CodecError> {
    REGISTRY.decode(name, properties)
  }

  /// The encoded properties as json text.
  pub fn to_json_string(&self) -> Result<String, CodecError> {
    let properties = self.encode()?;
    serde_json::to_string(&properties).map_err(CodecError::from)
  }

  /// Parses json text holding the properties of the named effect.
  pub fn from_json_str(name: &str, source: &str) -> Result<Self, CodecError> {
    let entry = REGISTRY.lookup(name)?;

    match serde_json::from_str::<serde_json::Value>(source)? {
      serde_json::Value::Object(properties) => entry.decode(&properties),
      _ => Err(CodecError::NotAnObject { effect: entry.name() }),
    }
  }
}

impl std::fmt::Display for Effect {
  fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Effect::Flash(Flash { color, delay, flashes }) => write!(
        formatter,
        "flash(color={}, delay={delay}, flashes={flashes})",
        color::to_hex(*color)
      ),
      Effect::Snake(Snake { color, delay, length }) => write!(
        formatter,
        "snake(color={}, delay={delay}, length={length})",
        color::to_hex(*color)
      ),
      Effect::Kitt(Kitt {
        color,
        delay,
        length,
        loops,
      }) => write!(
        formatter,
        "kitt(color={}, delay={delay}, length={length}, loops={loops})",
        color::to_hex(*color)
      ),
    }
  }
}
