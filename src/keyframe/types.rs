// src/keyframe/types.rs
use bevy::math::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One `<key t x y z o>` record as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyframeSpec {
    /// Time offset in seconds.
    pub t: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Yaw in radians.
    pub o: f32,
}

impl KeyframeSpec {
    pub fn new(t: f32, x: f32, y: f32, z: f32, o: f32) -> Self {
        Self { t, x, y, z, o }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub time: f32,
    pub translation: Vec3,
    /// Rotation about the simulator Z axis. Roll and pitch are always zero.
    pub yaw: f32,
}

impl PoseSample {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.yaw, 0.0, 0.0)
    }

    pub fn as_tuple(&self) -> (f32, Vec3, f32) {
        (self.time, self.translation, self.yaw)
    }
}

/// Name, length and loop flag of the animation a curve is played as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    pub name: String,
    /// Total clip length in seconds, independent of the keyframe times.
    pub duration: f32,
    pub looped: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            name: "test".to_string(),
            duration: 100.0,
            looped: true,
        }
    }
}

/// Samples in input order wrapped with the settings they are played with.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseCurve {
    pub name: String,
    pub duration: f32,
    pub looped: bool,
    pub samples: Vec<PoseSample>,
}

impl PoseCurve {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback may only be requested for a curve with at least one sample.
    pub fn is_playable(&self) -> bool {
        !self.samples.is_empty()
    }

    pub fn translation_keys(&self) -> Vec<(f32, Vec3)> {
        self.samples.iter().map(|s| (s.time, s.translation)).collect()
    }

    pub fn rotation_keys(&self) -> Vec<(f32, Quat)> {
        self.samples.iter().map(|s| (s.time, s.rotation())).collect()
    }
}
