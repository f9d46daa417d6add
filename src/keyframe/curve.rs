// src/keyframe/curve.rs
use bevy::math::Vec3;

use super::element::ConfigElement;
use super::error::{ConfigError, Result};
use super::parser::NumericPolicy;
use super::types::{AnimationSettings, KeyframeSpec, PoseCurve, PoseSample};

/// One sample per spec, same order. Times are not sorted or deduplicated.
pub fn build_pose_curve(specs: &[KeyframeSpec], settings: &AnimationSettings) -> PoseCurve {
    let samples = specs
        .iter()
        .map(|spec| PoseSample {
            time: spec.t,
            translation: Vec3::new(spec.x, spec.y, spec.z),
            yaw: spec.o,
        })
        .collect();

    PoseCurve {
        name: settings.name.clone(),
        duration: settings.duration,
        looped: settings.looped,
        samples,
    }
}

impl AnimationSettings {
    /// Reads the optional `animation_name`, `duration` and `loop` attributes of a
    /// `<plugin>` element; anything absent keeps its default.
    pub fn from_plugin_element(plugin: &ConfigElement, policy: NumericPolicy) -> Result<Self> {
        let mut settings = AnimationSettings::default();
        if let Some(name) = plugin.attribute("animation_name") {
            settings.name = name.to_string();
        }
        if let Some(raw) = plugin.attribute("duration") {
            let duration = policy.parse(&plugin.name, "duration", raw)?;
            if !(duration.is_finite() && duration > 0.0) {
                return Err(ConfigError::InvalidValue {
                    attribute: "duration",
                    element: plugin.name.clone(),
                    message: format!("expected a positive number of seconds, got {raw:?}"),
                });
            }
            settings.duration = duration;
        }
        if let Some(raw) = plugin.attribute("loop") {
            settings.looped = parse_bool(raw).ok_or_else(|| ConfigError::InvalidValue {
                attribute: "loop",
                element: plugin.name.clone(),
                message: format!("expected true/false, got {raw:?}"),
            })?;
        }
        Ok(settings)
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl PoseCurve {
    /// Writes every sample back as a `<key t x y z o/>` element. Values use the
    /// shortest representation that parses back to the same `f32`.
    pub fn to_keyframe_elements(&self) -> Vec<ConfigElement> {
        self.samples
            .iter()
            .map(|sample| {
                ConfigElement::new("key")
                    .with_attribute("t", sample.time.to_string())
                    .with_attribute("x", sample.translation.x.to_string())
                    .with_attribute("y", sample.translation.y.to_string())
                    .with_attribute("z", sample.translation.z.to_string())
                    .with_attribute("o", sample.yaw.to_string())
            })
            .collect()
    }

    pub fn to_keyframe_specs(&self) -> Vec<KeyframeSpec> {
        self.samples
            .iter()
            .map(|s| {
                let Vec3 { x, y, z } = s.translation;
                KeyframeSpec::new(s.time, x, y, z, s.yaw)
            })
            .collect()
    }
}
