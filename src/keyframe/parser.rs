// src/keyframe/parser.rs
use bevy::log::warn;
use serde::{Deserialize, Serialize};

use super::element::ConfigElement;
use super::error::{ConfigError, Result};
use super::types::KeyframeSpec;

/// Attributes every keyframe node must carry, in the order they are read.
pub const KEYFRAME_ATTRIBUTES: [&str; 5] = ["t", "x", "y", "z", "o"];

/// How malformed numeric attribute strings are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumericPolicy {
    /// C `atof` semantics: the longest leading decimal number is used and a
    /// string without one reads as `0.0`. Values that overflow `f32`, and the
    /// `inf`/`nan` spellings, also read as `0.0`.
    #[default]
    Lenient,
    /// The whole (trimmed) string must be a finite number.
    Strict,
}

impl NumericPolicy {
    pub fn from_attribute(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(NumericPolicy::Lenient),
            "strict" => Ok(NumericPolicy::Strict),
            _ => Err(ConfigError::InvalidPolicy(value.to_string())),
        }
    }

    pub fn parse(self, node: &str, attribute: &str, value: &str) -> Result<f32> {
        match self {
            NumericPolicy::Lenient => {
                let (parsed, consumed_all) = parse_leading_float(value);
                if !consumed_all {
                    warn!(
                        "<{}> {}={:?} is not a clean number, using {}",
                        node, attribute, value, parsed
                    );
                }
                Ok(parsed)
            }
            NumericPolicy::Strict => match value.trim().parse::<f32>() {
                Ok(parsed) if parsed.is_finite() => Ok(parsed),
                _ => Err(ConfigError::InvalidNumber {
                    node: node.to_string(),
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                }),
            },
        }
    }
}

/// Reads the longest decimal float prefix of `s` after leading whitespace.
///
/// Returns the value (0.0 when there is no numeric prefix) and whether the
/// whole trimmed string was consumed. A prefix that overflows `f32` yields
/// `(0.0, false)` so no non-finite value leaves this function.
pub fn parse_leading_float(s: &str) -> (f32, bool) {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return (0.0, false);
    }
    // exponent only counts if at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    match trimmed[..end].parse::<f32>() {
        Ok(value) if value.is_finite() => (value, trimmed[end..].trim().is_empty()),
        _ => (0.0, false),
    }
}

/// Reads `t`, `x`, `y`, `z`, `o` from one keyframe node. `index` is the node's
/// position among its siblings and only feeds error messages.
pub fn parse_keyframe(
    node: &ConfigElement,
    index: usize,
    policy: NumericPolicy,
) -> Result<KeyframeSpec> {
    let mut values = [0.0f32; 5];
    for (slot, attribute) in values.iter_mut().zip(KEYFRAME_ATTRIBUTES) {
        let raw = node
            .attribute(attribute)
            .ok_or_else(|| ConfigError::MissingAttribute {
                index,
                node: node.name.clone(),
                attribute,
            })?;
        *slot = policy.parse(&node.name, attribute, raw)?;
    }
    let [t, x, y, z, o] = values;
    Ok(KeyframeSpec { t, x, y, z, o })
}

/// Every child element is a keyframe, whatever its tag. The first bad node
/// fails the whole sequence.
pub fn parse_keyframes<'a, I>(nodes: I, policy: NumericPolicy) -> Result<Vec<KeyframeSpec>>
where
    I: IntoIterator<Item = &'a ConfigElement>,
{
    nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| parse_keyframe(node, index, policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(t: &str, x: &str, y: &str, z: &str, o: &str) -> ConfigElement {
        ConfigElement::new("key")
            .with_attribute("t", t)
            .with_attribute("x", x)
            .with_attribute("y", y)
            .with_attribute("z", z)
            .with_attribute("o", o)
    }

    #[test]
    fn leading_float_matches_atof() {
        assert_eq!(parse_leading_float("1.5"), (1.5, true));
        assert_eq!(parse_leading_float("  -2e2 "), (-200.0, true));
        assert_eq!(parse_leading_float("1.5m"), (1.5, false));
        assert_eq!(parse_leading_float("3e"), (3.0, false));
        assert_eq!(parse_leading_float(".25"), (0.25, true));
        assert_eq!(parse_leading_float("abc"), (0.0, false));
        assert_eq!(parse_leading_float(""), (0.0, false));
        assert_eq!(parse_leading_float("-"), (0.0, false));
        assert_eq!(parse_leading_float("."), (0.0, false));
    }

    #[test]
    fn leading_float_never_returns_non_finite() {
        assert_eq!(parse_leading_float("1e39"), (0.0, false));
        assert_eq!(parse_leading_float("-1e39"), (0.0, false));
        assert_eq!(parse_leading_float("inf"), (0.0, false));
        assert_eq!(parse_leading_float("NaN"), (0.0, false));
        assert_eq!(parse_leading_float("3e38"), (3e38, true));
    }

    #[test]
    fn lenient_policy_zeroes_non_finite_values() {
        for raw in ["1e39", "inf", "NaN"] {
            let node = key("0", raw, "2", "3", "0");
            let spec = parse_keyframe(&node, 0, NumericPolicy::Lenient).unwrap();
            assert_eq!(spec.x, 0.0, "x={raw}");
            assert_eq!(spec.y, 2.0);
        }
    }

    #[test]
    fn strict_policy_rejects_non_finite_values() {
        for raw in ["1e39", "inf", "NaN"] {
            let node = key("0", raw, "2", "3", "0");
            let err = parse_keyframe(&node, 0, NumericPolicy::Strict).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidNumber { attribute, value, .. }
                    if attribute == "x" && value == raw),
                "x={raw}: {err}"
            );
        }
    }

    #[test]
    fn lenient_policy_zeroes_garbage() {
        let node = key("0", "abc", "2", "3", "0");
        for _ in 0..3 {
            let spec = parse_keyframe(&node, 0, NumericPolicy::Lenient).unwrap();
            assert_eq!(spec.x, 0.0);
            assert_eq!(spec.y, 2.0);
        }
    }

    #[test]
    fn strict_policy_rejects_garbage() {
        let node = key("0", "abc", "2", "3", "0");
        let err = parse_keyframe(&node, 0, NumericPolicy::Strict).unwrap_err();
        match err {
            ConfigError::InvalidNumber {
                attribute, value, ..
            } => {
                assert_eq!(attribute, "x");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_policy_accepts_padded_numbers() {
        let node = key(" 5 ", "1", "2", "3", "1.57");
        let spec = parse_keyframe(&node, 0, NumericPolicy::Strict).unwrap();
        assert_eq!(spec.t, 5.0);
        assert_eq!(spec.o, 1.57);
    }

    #[test]
    fn missing_attribute_fails_the_sequence() {
        let plugin = ConfigElement::new("plugin")
            .with_child(key("0", "0", "0", "0", "0"))
            .with_child(ConfigElement::new("key").with_attribute("t", "1"));

        let err = parse_keyframes(&plugin.children, NumericPolicy::Lenient).unwrap_err();
        match err {
            ConfigError::MissingAttribute {
                index, attribute, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(attribute, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn policy_names_are_case_insensitive() {
        assert_eq!(
            NumericPolicy::from_attribute("Strict").unwrap(),
            NumericPolicy::Strict
        );
        assert!(NumericPolicy::from_attribute("loose").is_err());
    }
}
