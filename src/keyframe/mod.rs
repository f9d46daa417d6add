// src/keyframe/mod.rs

pub mod curve;
pub mod element;
pub mod error;
pub mod parser;
pub mod types;

pub use curve::build_pose_curve;
pub use element::ConfigElement;
pub use error::{ConfigError, Result};
pub use parser::{NumericPolicy, parse_keyframe, parse_keyframes};
pub use types::{AnimationSettings, KeyframeSpec, PoseCurve, PoseSample};

/// Builds the curve described by a `<plugin>` element: its optional
/// `numeric_policy` selects how attributes are parsed and every child element
/// is read as one keyframe.
pub fn curve_from_plugin_element(plugin: &ConfigElement) -> Result<PoseCurve> {
    let policy = match plugin.attribute("numeric_policy") {
        Some(raw) => NumericPolicy::from_attribute(raw)?,
        None => NumericPolicy::default(),
    };
    let settings = AnimationSettings::from_plugin_element(plugin, policy)?;
    let specs = parse_keyframes(&plugin.children, policy)?;
    Ok(build_pose_curve(&specs, &settings))
}
