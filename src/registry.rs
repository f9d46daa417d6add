// src/registry.rs
use std::collections::HashMap;

use bevy::log::warn;
use bevy::prelude::*;

use crate::keyframe::{ConfigElement, PoseCurve, Result};

/// What a model plugin can reach on the model it is attached to.
pub trait ModelHost {
    fn model_name(&self) -> &str;
    /// Registers `curve` as the model's animation. The repeat flag travels in
    /// `curve.looped`.
    fn set_animation(&mut self, curve: PoseCurve);
}

/// A plugin attached to a model by a `<plugin>` element. `on_load` runs once
/// when the model is spawned.
pub trait ModelPlugin: Send + Sync {
    fn on_load(&mut self, model: &mut dyn ModelHost, sdf: &ConfigElement) -> Result<()>;
}

pub type ModelPluginConstructor = fn() -> Box<dyn ModelPlugin>;

#[derive(Resource, Default)]
pub struct ModelPluginRegistry {
    constructors: HashMap<String, ModelPluginConstructor>,
}

impl ModelPluginRegistry {
    pub fn register(&mut self, id: impl Into<String>, constructor: ModelPluginConstructor) {
        let id = id.into();
        if self.constructors.insert(id.clone(), constructor).is_some() {
            warn!("Model plugin '{}' registered twice, keeping the last one", id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    pub fn create(&self, id: &str) -> Option<Box<dyn ModelPlugin>> {
        self.constructors.get(id).map(|constructor| constructor())
    }

    /// Looks a `<plugin>` element up by its `filename`, then by its `name`.
    pub fn create_for_element(&self, plugin: &ConfigElement) -> Option<Box<dyn ModelPlugin>> {
        ["filename", "name"]
            .iter()
            .filter_map(|key| plugin.attribute(key))
            .find_map(|id| self.create(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

pub trait RegisterModelPlugin {
    fn register_model_plugin(
        &mut self,
        id: impl Into<String>,
        constructor: ModelPluginConstructor,
    ) -> &mut Self;
}

impl RegisterModelPlugin for App {
    fn register_model_plugin(
        &mut self,
        id: impl Into<String>,
        constructor: ModelPluginConstructor,
    ) -> &mut Self {
        self.init_resource::<ModelPluginRegistry>();
        self.world_mut()
            .resource_mut::<ModelPluginRegistry>()
            .register(id, constructor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl ModelPlugin for Noop {
        fn on_load(&mut self, _model: &mut dyn ModelHost, _sdf: &ConfigElement) -> Result<()> {
            Ok(())
        }
    }

    fn noop() -> Box<dyn ModelPlugin> {
        Box::new(Noop)
    }

    #[test]
    fn lookup_prefers_filename_then_name() {
        let mut registry = ModelPluginRegistry::default();
        registry.register("by_name", noop);

        let by_name = ConfigElement::new("plugin")
            .with_attribute("name", "by_name")
            .with_attribute("filename", "libunknown.so");
        assert!(registry.create_for_element(&by_name).is_some());

        let unknown = ConfigElement::new("plugin").with_attribute("filename", "libother.so");
        assert!(registry.create_for_element(&unknown).is_none());
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn app_extension_populates_the_resource() {
        let mut app = App::new();
        app.register_model_plugin("a", noop)
            .register_model_plugin("b", noop);
        let registry = app.world().resource::<ModelPluginRegistry>();
        let mut ids: Vec<&str> = registry.ids().collect();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
    }
}
