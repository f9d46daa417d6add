// src/world/spawner.rs
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use super::loader::{ModelDescription, ModelFlags, WorldDescription};
use crate::animation::PoseAnimation;
use crate::keyframe::PoseCurve;
use crate::registry::{ModelHost, ModelPluginRegistry};

#[derive(Component, Debug, Clone)]
pub struct WorldScene(pub Handle<WorldDescription>);

#[derive(Component)]
pub struct LoadedWorldScene;

/// Parent of every spawned model. Rotates the Z-up simulator frame into Bevy's
/// Y-up frame.
#[derive(Component)]
pub struct SimulationRoot;

#[derive(Component, Debug, Clone)]
pub struct SimModel {
    pub name: String,
    pub flags: ModelFlags,
}

pub fn simulation_root_transform() -> Transform {
    Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2))
}

/// The model a plugin sees during `on_load`. Keeps the last animation set.
pub struct LoadingModel<'a> {
    name: &'a str,
    animation: Option<PoseCurve>,
}

impl<'a> LoadingModel<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            animation: None,
        }
    }

    pub fn into_animation(self) -> Option<PoseCurve> {
        self.animation
    }
}

impl ModelHost for LoadingModel<'_> {
    fn model_name(&self) -> &str {
        self.name
    }

    fn set_animation(&mut self, curve: PoseCurve) {
        if let Some(previous) = self.animation.replace(curve) {
            warn!(
                "Model '{}': animation '{}' replaced by a later plugin",
                self.name, previous.name
            );
        }
    }
}

/// Instantiates and loads every plugin attached to `model`. Unknown plugins and
/// plugins that fail to load are logged and skipped; the returned curve is the
/// animation the model should play, if any.
pub fn load_model_plugins(
    registry: &ModelPluginRegistry,
    model: &ModelDescription,
) -> Option<PoseCurve> {
    if !model.flags.contains(ModelFlags::HAS_PLUGINS) {
        return None;
    }
    let mut host = LoadingModel::new(&model.name);
    for plugin in &model.plugins {
        let Some(mut instance) = registry.create_for_element(&plugin.element) else {
            warn!(
                "Model '{}': no model plugin registered for '{}' ({})",
                model.name, plugin.filename, plugin.name
            );
            continue;
        };
        if let Err(e) = instance.on_load(&mut host, &plugin.element) {
            error!(
                "Model '{}': plugin '{}' failed to load: {}",
                model.name, plugin.name, e
            );
        }
    }
    host.into_animation()
}

pub fn spawn_world_models(
    mut commands: Commands,
    new_scenes: Query<(Entity, &WorldScene), Without<LoadedWorldScene>>,
    world_assets: Res<Assets<WorldDescription>>,
    registry: Res<ModelPluginRegistry>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    for (scene_entity, scene) in new_scenes.iter() {
        let Some(world) = world_assets.get(&scene.0) else {
            continue;
        };
        info!("Spawning world '{}' ({} models)", world.name, world.models.len());

        commands.entity(scene_entity).insert((
            LoadedWorldScene,
            SimulationRoot,
            simulation_root_transform(),
            Visibility::default(),
        ));

        for model in &world.models {
            let mut model_entity = commands.spawn((
                Name::new(model.name.clone()),
                SimModel {
                    name: model.name.clone(),
                    flags: model.flags,
                },
                model.pose,
                Visibility::default(),
                ChildOf(scene_entity),
            ));

            if let (Some(meshes), Some(materials)) = (meshes.as_mut(), materials.as_mut()) {
                model_entity.insert((
                    Mesh3d(meshes.add(Cuboid::from_size(model.size))),
                    MeshMaterial3d(materials.add(StandardMaterial {
                        base_color: if model.flags.contains(ModelFlags::STATIC) {
                            Color::srgb(0.6, 0.6, 0.6)
                        } else {
                            Color::srgb(0.8, 0.4, 0.1)
                        },
                        ..default()
                    })),
                ));
            }

            if let Some(curve) = load_model_plugins(&registry, model) {
                model_entity.insert(PoseAnimation(curve));
            }
        }
    }
}
