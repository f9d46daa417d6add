// src/animated_box.rs
use bevy::log::{info, warn};

use crate::keyframe::{ConfigElement, Result, curve_from_plugin_element};
use crate::registry::{ModelHost, ModelPlugin};

/// Registry ids the plugin answers to: the shared-library name world files
/// reference and a plain name.
pub const ANIMATED_BOX_IDS: [&str; 2] = ["libanimated_box.so", "animated_box"];

/// Reads the keyframes under its `<plugin>` element and puts the model on a
/// looped pose animation.
#[derive(Debug, Default)]
pub struct AnimatedBox;

impl AnimatedBox {
    pub fn boxed() -> Box<dyn ModelPlugin> {
        Box::new(AnimatedBox)
    }
}

impl ModelPlugin for AnimatedBox {
    fn on_load(&mut self, model: &mut dyn ModelHost, sdf: &ConfigElement) -> Result<()> {
        let curve = curve_from_plugin_element(sdf)?;
        if !curve.is_playable() {
            warn!(
                "Model '{}': plugin has no keyframes, no animation installed",
                model.model_name()
            );
            return Ok(());
        }
        info!(
            "Model '{}': animation '{}' with {} keyframes over {}s (loop: {})",
            model.model_name(),
            curve.name,
            curve.len(),
            curve.duration,
            curve.looped
        );
        model.set_animation(curve);
        Ok(())
    }
}
