use std::f32::consts::FRAC_PI_4;

use anyhow::Context;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use bevy_pose_keyframes::PoseKeyframesPlugin;
use bevy_pose_keyframes::animation::PoseAnimationInstalled;
use bevy_pose_keyframes::world::{WorldScene, load_world_file};
use bevy_third_person_camera::*;

const WORLD_PATH: &str = "animated_box.world";

fn main() -> anyhow::Result<()> {
    // Surface configuration errors before a window is opened.
    let world = load_world_file(format!("assets/{WORLD_PATH}"))
        .with_context(|| format!("failed to load assets/{WORLD_PATH}"))?;
    for model in &world.models {
        for plugin in &model.plugins {
            bevy_pose_keyframes::curve_from_plugin_element(&plugin.element).with_context(|| {
                format!("model '{}', plugin '{}'", model.name, plugin.name)
            })?;
        }
    }

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: true,
        })
        .add_plugins(WorldInspectorPlugin::new())
        .add_plugins(ThirdPersonCameraPlugin)
        .add_plugins(PoseKeyframesPlugin)
        .insert_resource(AmbientLight {
            color: Color::srgb(1.0, 0.95, 0.9),
            brightness: 200.0,
            ..default()
        })
        .add_systems(Startup, setup_scene)
        .add_systems(Update, follow_animated_model)
        .run();
    Ok(())
}

fn setup_scene(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn(WorldScene(asset_server.load(WORLD_PATH)));
    commands.spawn((
        Camera3d::default(),
        ThirdPersonCamera::default(),
        Transform::from_xyz(8.0, 8.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::ZYX, 0.0, 0.0, -FRAC_PI_4)),
    ));
}

fn follow_animated_model(
    mut commands: Commands,
    installed: Query<(Entity, &Name), Added<PoseAnimationInstalled>>,
    targets: Query<(), With<ThirdPersonCameraTarget>>,
) {
    if !targets.is_empty() {
        return;
    }
    if let Some((entity, name)) = installed.iter().next() {
        info!("Camera following '{}'", name);
        commands.entity(entity).insert(ThirdPersonCameraTarget);
    }
}
