use bevy::prelude::*;
pub mod animated_box;
pub mod animation;
pub mod keyframe;
pub mod registry;
pub mod world;
use animated_box::{ANIMATED_BOX_IDS, AnimatedBox};
use animation::install_pose_animations;
pub use keyframe::{
    AnimationSettings, ConfigElement, ConfigError, KeyframeSpec, NumericPolicy, PoseCurve,
    PoseSample, build_pose_curve, curve_from_plugin_element, parse_keyframe, parse_keyframes,
};
use registry::{ModelPluginRegistry, RegisterModelPlugin};
use world::{WorldAssetLoader, WorldDescription, spawn_world_models};

/// Loads `.sdf`/`.world` assets, spawns their models, runs the model plugins
/// attached to them and plays the pose animations they install.
///
/// Needs `AssetPlugin` and `AnimationPlugin` (both part of `DefaultPlugins`).
pub struct PoseKeyframesPlugin;
impl Plugin for PoseKeyframesPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<WorldDescription>()
            .init_asset_loader::<WorldAssetLoader>()
            .init_resource::<ModelPluginRegistry>()
            .add_systems(Update, (spawn_world_models, install_pose_animations).chain());
        for id in ANIMATED_BOX_IDS {
            app.register_model_plugin(id, AnimatedBox::boxed);
        }
    }
}
