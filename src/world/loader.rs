// src/world/loader.rs
use std::path::Path;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use bitflags::bitflags;

use crate::keyframe::curve::parse_bool;
use crate::keyframe::parser::parse_leading_float;
use crate::keyframe::{ConfigElement, ConfigError, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModelFlags: u8 {
        const STATIC   = 1 << 0;
        /// At least one `<plugin>` element is attached.
        const HAS_PLUGINS = 1 << 1;
    }
}

/// One `<plugin name filename>` element, kept whole so the plugin can read
/// whatever children it defines.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescription {
    pub name: String,
    pub filename: String,
    pub element: ConfigElement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescription {
    pub name: String,
    /// Pose in the Z-up simulator frame.
    pub pose: Transform,
    /// Extent of the first `<visual>` geometry. A `<plane>` becomes a box
    /// [`PLANE_THICKNESS`] thick; `<mesh>` and anything else fall back to a
    /// unit cube.
    pub size: Vec3,
    pub flags: ModelFlags,
    pub plugins: Vec<PluginDescription>,
}

/// Height given to `<plane>` geometry so it renders as a flat box.
pub const PLANE_THICKNESS: f32 = 0.01;

#[derive(Asset, TypePath, Debug, Clone, PartialEq)]
pub struct WorldDescription {
    pub name: String,
    pub models: Vec<ModelDescription>,
}

impl WorldDescription {
    /// Accepts `<sdf><world>...</world></sdf>` or a bare `<world>`.
    pub fn from_element(root: &ConfigElement) -> Result<Self> {
        let world = match root.name.as_str() {
            "world" => root,
            "sdf" => root.child("world").ok_or_else(|| ConfigError::MissingElement {
                element: "world",
                context: "<sdf>".to_string(),
            })?,
            _ => {
                return Err(ConfigError::MissingElement {
                    element: "sdf",
                    context: format!("document rooted at <{}>", root.name),
                });
            }
        };

        let models = world
            .children_named("model")
            .map(ModelDescription::from_element)
            .collect::<Result<Vec<_>>>()?;

        Ok(WorldDescription {
            name: world.attribute("name").unwrap_or("default").to_string(),
            models,
        })
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescription> {
        self.models.iter().find(|m| m.name == name)
    }
}

impl ModelDescription {
    pub fn from_element(model: &ConfigElement) -> Result<Self> {
        let name = model
            .attribute("name")
            .ok_or_else(|| ConfigError::InvalidValue {
                attribute: "name",
                element: "model".to_string(),
                message: "models must be named".to_string(),
            })?
            .to_string();

        let pose = match model.child_text("pose") {
            Some(text) => parse_pose(text, &name)?,
            None => Transform::IDENTITY,
        };

        let geometry = model
            .child("link")
            .and_then(|link| link.child("visual"))
            .and_then(|visual| visual.child("geometry"));
        let size = match geometry {
            Some(geometry) => parse_geometry_size(geometry, &name)?,
            None => Vec3::ONE,
        };

        let plugins: Vec<PluginDescription> = model
            .children_named("plugin")
            .map(|element| PluginDescription {
                name: element.attribute("name").unwrap_or_default().to_string(),
                filename: element.attribute("filename").unwrap_or_default().to_string(),
                element: element.clone(),
            })
            .collect();

        let mut flags = ModelFlags::empty();
        if model.child_text("static").and_then(parse_bool).unwrap_or(false) {
            flags |= ModelFlags::STATIC;
        }
        if !plugins.is_empty() {
            flags |= ModelFlags::HAS_PLUGINS;
        }

        Ok(ModelDescription {
            name,
            pose,
            size,
            flags,
            plugins,
        })
    }
}

fn parse_geometry_size(geometry: &ConfigElement, model: &str) -> Result<Vec3> {
    if let Some(text) = geometry.child("box").and_then(|b| b.child_text("size")) {
        return parse_floats::<3>(text, "size", model).map(Vec3::from_array);
    }
    if let Some(text) = geometry.child("plane").and_then(|p| p.child_text("size")) {
        let [width, length] = parse_floats::<2>(text, "size", model)?;
        return Ok(Vec3::new(width, length, PLANE_THICKNESS));
    }
    if let Some(shape) = geometry.children.first() {
        debug!("Model '{}': <{}> geometry drawn as a unit cube", model, shape.name);
    }
    Ok(Vec3::ONE)
}

/// `x y z roll pitch yaw`.
fn parse_pose(text: &str, model: &str) -> Result<Transform> {
    let [x, y, z, roll, pitch, yaw] = parse_floats::<6>(text, "pose", model)?;
    Ok(Transform {
        translation: Vec3::new(x, y, z),
        rotation: Quat::from_euler(EulerRot::ZYX, yaw, pitch, roll),
        scale: Vec3::ONE,
    })
}

fn parse_floats<const N: usize>(
    text: &str,
    attribute: &'static str,
    model: &str,
) -> Result<[f32; N]> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != N {
        return Err(ConfigError::InvalidValue {
            attribute,
            element: format!("model '{}'", model),
            message: format!("expected {} values, got {}: {:?}", N, parts.len(), text),
        });
    }
    let mut values = [0.0f32; N];
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = parse_leading_float(part).0;
    }
    Ok(values)
}

pub fn load_world_str(xml: &str) -> Result<WorldDescription> {
    WorldDescription::from_element(&ConfigElement::parse_str(xml)?)
}

pub fn load_world_file(path: impl AsRef<Path>) -> Result<WorldDescription> {
    let xml = std::fs::read_to_string(path)?;
    load_world_str(&xml)
}

#[derive(Default)]
pub struct WorldAssetLoader;

impl AssetLoader for WorldAssetLoader {
    type Asset = WorldDescription;
    type Settings = ();
    type Error = ConfigError;
    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> std::result::Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes).await {
            error!("WorldAssetLoader: failed to read {:?}: {:?}", load_context.path(), e);
            return Err(ConfigError::Io(e));
        }
        let xml = String::from_utf8(bytes).map_err(|e| ConfigError::Xml(e.to_string()))?;
        let world = load_world_str(&xml)?;
        info!(
            "Loaded world '{}' from {:?} with {} models",
            world.name,
            load_context.path(),
            world.models.len()
        );
        Ok(world)
    }

    fn extensions(&self) -> &[&str] {
        &["sdf", "world"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_models_poses_and_plugins() {
        let world = load_world_str(
            r#"<sdf version='1.6'><world name='default'>
                 <model name="EgoVehicle">
                   <pose>1 2 0.5  0 0 1.5</pose>
                   <static>true</static>
                   <link name="body"><visual name="visual"><geometry>
                     <box><size>0.3 0.2 0.08</size></box>
                   </geometry></visual></link>
                   <plugin name="push_animate" filename="libanimated_box.so"/>
                 </model>
                 <model name="ground"/>
               </world></sdf>"#,
        )
        .unwrap();

        assert_eq!(world.name, "default");
        assert_eq!(world.models.len(), 2);
        let ego = world.model("EgoVehicle").unwrap();
        assert_eq!(ego.pose.translation, Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(ego.size, Vec3::new(0.3, 0.2, 0.08));
        assert!(ego.flags.contains(ModelFlags::STATIC | ModelFlags::HAS_PLUGINS));
        assert_eq!(ego.plugins[0].filename, "libanimated_box.so");

        let ground = world.model("ground").unwrap();
        assert_eq!(ground.pose, Transform::IDENTITY);
        assert_eq!(ground.size, Vec3::ONE);
        assert!(ground.flags.is_empty());
    }

    #[test]
    fn ground_plane_tile_becomes_a_thin_box() {
        let world = load_world_str(
            r#"<sdf version='1.6'><world name='default'>
                 <model name='Tile_0_0'>
                   <static>1</static>
                   <link name='link'>
                     <collision name='collision'><geometry>
                       <plane><normal>0 0 1</normal><size>4 4</size></plane>
                     </geometry></collision>
                     <visual name='visual'><geometry>
                       <plane><normal>0 0 1</normal><size>4 4</size></plane>
                     </geometry></visual>
                   </link>
                   <pose frame=''>2 2 0 0 0 0</pose>
                 </model>
                 <model name='ego'>
                   <link name='link'><visual name='visual'><geometry>
                     <mesh><uri>model://ego/meshes/car.dae</uri></mesh>
                   </geometry></visual></link>
                 </model>
               </world></sdf>"#,
        )
        .unwrap();

        let tile = world.model("Tile_0_0").unwrap();
        assert_eq!(tile.size, Vec3::new(4.0, 4.0, PLANE_THICKNESS));
        assert_eq!(tile.pose.translation, Vec3::new(2.0, 2.0, 0.0));
        assert!(tile.flags.contains(ModelFlags::STATIC));
        assert_eq!(world.model("ego").unwrap().size, Vec3::ONE);
    }

    #[test]
    fn plane_size_needs_two_values() {
        let err = load_world_str(
            r#"<world><model name="m"><link><visual><geometry>
                 <plane><size>4 4 4</size></plane>
               </geometry></visual></link></model></world>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { attribute: "size", .. }));
    }

    #[test]
    fn bare_world_root_is_accepted() {
        let world = load_world_str(r#"<world name="w"><model name="m"/></world>"#).unwrap();
        assert_eq!(world.name, "w");
    }

    #[test]
    fn short_pose_is_an_error() {
        let err = load_world_str(r#"<world><model name="m"><pose>1 2 3</pose></model></world>"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { attribute: "pose", .. }));
    }

    #[test]
    fn sdf_without_world_is_an_error() {
        assert!(matches!(
            load_world_str("<sdf version='1.6'/>"),
            Err(ConfigError::MissingElement { element: "world", .. })
        ));
    }
}
