//! Packed 24-bit colors. Effects hold their color as a single `0xRRGGBB` integer; the controller
//! expects a `[red, green, blue]` array on the wire.

use serde_json::Value;

/// Mask covering the three color channels of a packed value. Anything above it (alpha) is ignored.
const RGB_MASK: u32 = 0x00FF_FFFF;

#[allow(clippy::missing_docs_in_private_items)]
pub const BLACK: u32 = 0x000000;
#[allow(clippy::missing_docs_in_private_items)]
pub const DARK_GRAY: u32 = 0x444444;
#[allow(clippy::missing_docs_in_private_items)]
pub const GRAY: u32 = 0x888888;
#[allow(clippy::missing_docs_in_private_items)]
pub const LIGHT_GRAY: u32 = 0xCCCCCC;
#[allow(clippy::missing_docs_in_private_items)]
pub const WHITE: u32 = 0xFFFFFF;
#[allow(clippy::missing_docs_in_private_items)]
pub const RED: u32 = 0xFF0000;
#[allow(clippy::missing_docs_in_private_items)]
pub const GREEN: u32 = 0x00FF00;
#[allow(clippy::missing_docs_in_private_items)]
pub const BLUE: u32 = 0x0000FF;
#[allow(clippy::missing_docs_in_private_items)]
pub const YELLOW: u32 = 0xFFFF00;
#[allow(clippy::missing_docs_in_private_items)]
pub const CYAN: u32 = 0x00FFFF;
#[allow(clippy::missing_docs_in_private_items)]
pub const MAGENTA: u32 = 0xFF00FF;

/// Names accepted by [`parse`], lowercase.
const NAMED: &[(&str, u32)] = &[
  ("black", BLACK),
  ("darkgray", DARK_GRAY),
  ("gray", GRAY),
  ("lightgray", LIGHT_GRAY),
  ("white", WHITE),
  ("red", RED),
  ("green", GREEN),
  ("blue", BLUE),
  ("yellow", YELLOW),
  ("cyan", CYAN),
  ("magenta", MAGENTA),
];

/// Combines the three channels into a packed color.
#[inline]
pub fn pack(red: u8, green: u8, blue: u8) -> u32 {
  (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue)
}

/// Splits a packed color into its channels. Bits above the blue/green/red bytes are ignored.
#[inline]
pub fn unpack(color: u32) -> (u8, u8, u8) {
  let [_, red, green, blue] = (color & RGB_MASK).to_be_bytes();
  (red, green, blue)
}

/// Drops the alpha channel of an `0xAARRGGBB` value.
#[inline]
pub fn from_argb(argb: u32) -> u32 {
  argb & RGB_MASK
}

/// The wire representation of a packed color, `[red, green, blue]`.
pub fn to_json(color: u32) -> Value {
  let (red, green, blue) = unpack(color);
  Value::Array(vec![red.into(), green.into(), blue.into()])
}

/// Reads a `[red, green, blue]` array back into a packed color. Anything other than exactly three
/// integers in `0..=255` is rejected.
pub fn from_json(value: &Value) -> Option<u32> {
  let channels = value.as_array()?;

  if channels.len() != 3 {
    return None;
  }

  let mut bytes = channels
    .iter()
    .map(|channel| channel.as_u64().and_then(|number| u8::try_from(number).ok()));

  let red = bytes.next()??;
  let green = bytes.next()??;
  let blue = bytes.next()??;
  Some(pack(red, green, blue))
}

/// Parses user-provided color text: a known name (`"cyan"`), or six hex digits optionally prefixed
/// with `#` or `0x`.
pub fn parse(input: &str) -> Option<u32> {
  let trimmed = input.trim();
  let lowered = trimmed.to_ascii_lowercase();

  if let Some((_, color)) = NAMED.iter().find(|(name, _)| *name == lowered) {
    return Some(*color);
  }

  let digits = lowered
    .strip_prefix('#')
    .or_else(|| lowered.strip_prefix("0x"))
    .unwrap_or(&lowered);

  if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
    return None;
  }

  u32::from_str_radix(digits, 16).ok()
}

/// Formats a packed color as `#rrggbb`.
pub fn to_hex(color: u32) -> String {
  format!("#{:06x}", color & RGB_MASK)
}

#[cfg(test)]
mod tests {
  use super::{from_argb, from_json, pack, parse, to_hex, to_json, unpack, CYAN, LIGHT_GRAY, MAGENTA, RED, WHITE};
  use serde_json::json;

  #[test]
  fn pack_unpack_all_channels() {
    for red in (0..=255u8).step_by(5) {
      for green in (0..=255u8).step_by(3) {
        for blue in [0u8, 1, 127, 128, 254, 255] {
          assert_eq!(unpack(pack(red, green, blue)), (red, green, blue));
        }
      }
    }
  }

  #[test]
  fn magenta_packs_and_encodes() {
    assert_eq!(pack(255, 0, 255), 0xFF00FF);
    assert_eq!(pack(255, 0, 255), MAGENTA);
    assert_eq!(to_json(MAGENTA), json!([255, 0, 255]));
  }

  #[test]
  fn named_colors_survive_json() {
    for color in [RED, CYAN, WHITE, LIGHT_GRAY, 0, 0x123456] {
      assert_eq!(from_json(&to_json(color)), Some(color));
    }
  }

  #[test]
  fn alpha_is_ignored() {
    assert_eq!(unpack(0xFF00FFFF), (0, 255, 255));
    assert_eq!(from_argb(0xFFFF0000), RED);
    assert_eq!(to_json(0x80FF00FF), json!([255, 0, 255]));
  }

  #[test]
  fn rejects_malformed_arrays() {
    assert_eq!(from_json(&json!([255, 0])), None);
    assert_eq!(from_json(&json!([255, 0, 0, 0])), None);
    assert_eq!(from_json(&json!([256, 0, 0])), None);
    assert_eq!(from_json(&json!([-1, 0, 0])), None);
    assert_eq!(from_json(&json!([1.5, 0, 0])), None);
    assert_eq!(from_json(&json!(["ff", 0, 0])), None);
    assert_eq!(from_json(&json!(16711680)), None);
  }

  #[test]
  fn parses_text() {
    assert_eq!(parse("cyan"), Some(CYAN));
    assert_eq!(parse("LightGray"), Some(LIGHT_GRAY));
    assert_eq!(parse("#ff00ff"), Some(MAGENTA));
    assert_eq!(parse("0x00FFFF"), Some(CYAN));
    assert_eq!(parse("123456"), Some(0x123456));
    assert_eq!(parse("#fff"), None);
    assert_eq!(parse("purple"), None);
    assert_eq!(parse("#gg0000"), None);
  }

  #[test]
  fn formats_hex() {
    assert_eq!(to_hex(CYAN), "#00ffff");
    assert_eq!(to_hex(0xAA123456), "#123456");
  }
}
