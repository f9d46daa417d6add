// src/world/mod.rs

pub mod loader;
pub mod spawner;

pub use loader::{
    ModelDescription, ModelFlags, PluginDescription, WorldAssetLoader, WorldDescription,
    load_world_file, load_world_str,
};
pub use spawner::{
    LoadedWorldScene, SimModel, SimulationRoot, WorldScene, load_model_plugins, spawn_world_models,
};
