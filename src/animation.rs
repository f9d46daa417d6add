// src/animation.rs
use bevy::prelude::*;
use bevy_animation::animatable::Animatable;
use bevy_animation::animation_curves::AnimatableKeyframeCurve;
use bevy_animation::{AnimationTarget, AnimationTargetId, animated_field};

use crate::keyframe::PoseCurve;

/// A curve handed over by a model plugin, waiting to become an `AnimationClip`.
#[derive(Component, Debug, Clone)]
pub struct PoseAnimation(pub PoseCurve);

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PoseAnimationInstalled {
    pub name: String,
    pub sample_count: usize,
    pub node_index: AnimationNodeIndex,
}

/// Keyframe curve over `keyframes`. Fewer than two distinct times hold the first
/// value from 0 to `hold_until`.
pub fn make_bevy_curve<T: Animatable + Copy>(
    keyframes: &[(f32, T)],
    hold_until: f32,
) -> Option<AnimatableKeyframeCurve<T>> {
    match AnimatableKeyframeCurve::new(keyframes.iter().copied()) {
        Ok(curve) => Some(curve),
        Err(_) => {
            let (_, value) = *keyframes.first()?;
            AnimatableKeyframeCurve::new([(0.0, value), (hold_until, value)]).ok()
        }
    }
}

/// Translation and rotation curves for `target`, with the clip length pinned to
/// the curve's duration. `None` for an unplayable curve.
pub fn build_animation_clip(
    curve: &PoseCurve,
    target: AnimationTargetId,
) -> Option<AnimationClip> {
    if !curve.is_playable() {
        return None;
    }
    let translation = make_bevy_curve(&curve.translation_keys(), curve.duration)?;
    let rotation = make_bevy_curve(&curve.rotation_keys(), curve.duration)?;

    let mut clip = AnimationClip::default();
    clip.add_curve_to_target(
        target,
        AnimatableCurve::new(animated_field!(Transform::translation), translation),
    );
    clip.add_curve_to_target(
        target,
        AnimatableCurve::new(animated_field!(Transform::rotation), rotation),
    );
    // adding curves stretches the clip to the last key; the configured length wins
    clip.set_duration(curve.duration);
    Some(clip)
}

pub fn install_pose_animations(
    pending: Query<(Entity, Option<&Name>, &PoseAnimation)>,
    mut animation_clips: ResMut<Assets<AnimationClip>>,
    mut animation_graphs: ResMut<Assets<AnimationGraph>>,
    mut commands: Commands,
) {
    for (entity, name, pose_animation) in pending.iter() {
        let curve = &pose_animation.0;
        let name = name
            .cloned()
            .unwrap_or_else(|| Name::new(format!("pose_animation_{}", entity)));
        let target_id = AnimationTargetId::from_name(&name);

        commands.entity(entity).remove::<PoseAnimation>();
        let Some(clip) = build_animation_clip(curve, target_id) else {
            warn!("{}: pose animation '{}' has no samples, skipped", name, curve.name);
            continue;
        };

        let clip_handle = animation_clips.add(clip);
        let (animation_graph, node_index) = AnimationGraph::from_clip(clip_handle);
        let mut animation_player = AnimationPlayer::default();
        let active = animation_player.play(node_index);
        if curve.looped {
            active.repeat();
        }

        debug!(
            "{}: playing '{}' ({} samples, {}s)",
            name,
            curve.name,
            curve.len(),
            curve.duration
        );
        commands.entity(entity).insert((
            name,
            AnimationTarget {
                id: target_id,
                player: entity,
            },
            animation_player,
            AnimationGraphHandle(animation_graphs.add(animation_graph)),
            PoseAnimationInstalled {
                name: curve.name.clone(),
                sample_count: curve.len(),
                node_index,
            },
        ));
    }
}
