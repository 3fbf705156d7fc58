//! Keyframed clip: a serde-loadable [`PoseClip`] implementation.
//!
//! Model:
//! - Each bone may have one track with separate translation / rotation / scale
//!   key lists. Keys carry normalized stamps in [0,1].
//! - Translation and scale interpolate linearly, rotation uses shortest-arc NLERP.
//! - Before the first key / after the last key the end key is held.
//! - Bones without a track (or channels without keys) sample as identity.
//!
//! JSON shape:
//! `{ "name": "walk", "duration": 1000, "boneCount": 2,
//!    "tracks": [{ "bone": 0, "translation": [{ "stamp": 0.0, "value": [0,0,0] }] }] }`

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::clip::PoseClip;
use crate::error::PoseError;
use crate::pose::BonePose;

/// A single key at normalized time `stamp`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Key<T> {
    pub stamp: f32,
    pub value: T,
}

/// Key lists for one bone.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoneTrack {
    pub bone: usize,
    #[serde(default)]
    pub translation: Vec<Key<Vec3>>,
    #[serde(default)]
    pub rotation: Vec<Key<Quat>>,
    #[serde(default)]
    pub scale: Vec<Key<Vec3>>,
}

/// Stored (wire) form of a keyframed clip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredClip {
    name: String,
    /// Duration in milliseconds.
    #[serde(rename = "duration")]
    duration_ms: u32,
    bone_count: usize,
    #[serde(default)]
    tracks: Vec<BoneTrack>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "StoredClip", into = "StoredClip")]
pub struct KeyframeClip {
    name: String,
    duration_ms: u32,
    bone_count: usize,
    tracks: Vec<BoneTrack>,
    /// bone index -> position in `tracks`
    bone_slots: Vec<Option<usize>>,
}

impl KeyframeClip {
    /// Build and validate a clip.
    pub fn new(
        name: impl Into<String>,
        duration_ms: u32,
        bone_count: usize,
        tracks: Vec<BoneTrack>,
    ) -> Result<Self, PoseError> {
        let name = name.into();
        validate(&name, duration_ms, bone_count, &tracks)?;

        let mut bone_slots = vec![None; bone_count];
        for (slot, track) in tracks.iter().enumerate() {
            bone_slots[track.bone] = Some(slot);
        }

        Ok(Self {
            name,
            duration_ms,
            bone_count,
            tracks,
            bone_slots,
        })
    }

    /// Parse a clip from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, PoseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PoseError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    fn track_for(&self, bone: usize) -> Option<&BoneTrack> {
        self.bone_slots
            .get(bone)
            .copied()
            .flatten()
            .map(|slot| &self.tracks[slot])
    }
}

fn validate(
    name: &str,
    duration_ms: u32,
    bone_count: usize,
    tracks: &[BoneTrack],
) -> Result<(), PoseError> {
    let invalid = |reason: String| PoseError::InvalidClip {
        clip: name.to_string(),
        reason,
    };

    if duration_ms == 0 {
        return Err(invalid("duration must be > 0 ms".into()));
    }

    let mut seen = vec![false; bone_count];
    for track in tracks {
        if track.bone >= bone_count {
            return Err(invalid(format!(
                "track targets bone {} but the clip has {} bones",
                track.bone, bone_count
            )));
        }
        if std::mem::replace(&mut seen[track.bone], true) {
            return Err(invalid(format!("bone {} has more than one track", track.bone)));
        }

        let stamps = [
            track.translation.iter().map(|k| k.stamp).collect::<Vec<_>>(),
            track.rotation.iter().map(|k| k.stamp).collect(),
            track.scale.iter().map(|k| k.stamp).collect(),
        ];
        for channel in &stamps {
            let mut last = f32::NEG_INFINITY;
            for &stamp in channel {
                if !stamp.is_finite() || !(0.0..=1.0).contains(&stamp) {
                    return Err(invalid(format!(
                        "key stamp {stamp} on bone {} must be finite and in [0,1]",
                        track.bone
                    )));
                }
                if stamp < last {
                    return Err(invalid(format!(
                        "key stamps on bone {} must be non-decreasing",
                        track.bone
                    )));
                }
                last = stamp;
            }
        }
    }
    Ok(())
}

impl TryFrom<StoredClip> for KeyframeClip {
    type Error = PoseError;

    fn try_from(stored: StoredClip) -> Result<Self, Self::Error> {
        KeyframeClip::new(stored.name, stored.duration_ms, stored.bone_count, stored.tracks)
    }
}

impl From<KeyframeClip> for StoredClip {
    fn from(clip: KeyframeClip) -> Self {
        StoredClip {
            name: clip.name,
            duration_ms: clip.duration_ms,
            bone_count: clip.bone_count,
            tracks: clip.tracks,
        }
    }
}

/// Sample one channel at normalized time `u`, holding the end keys outside the
/// keyed range.
fn sample_channel<T: Copy>(
    keys: &[Key<T>],
    u: f32,
    fallback: T,
    mix: impl Fn(T, T, f32) -> T,
) -> T {
    match keys {
        [] => fallback,
        [only] => only.value,
        _ => {
            let u = u.clamp(0.0, 1.0);
            let upper = keys.partition_point(|k| k.stamp <= u);
            if upper == 0 {
                return keys[0].value;
            }
            if upper == keys.len() {
                return keys[keys.len() - 1].value;
            }
            let left = &keys[upper - 1];
            let right = &keys[upper];
            let span = (right.stamp - left.stamp).max(f32::EPSILON);
            let t = ((u - left.stamp) / span).clamp(0.0, 1.0);
            mix(left.value, right.value, t)
        }
    }
}

impl PoseClip for KeyframeClip {
    fn bone_count(&self) -> usize {
        self.bone_count
    }

    fn duration_seconds(&self) -> f32 {
        self.duration_ms as f32 / 1000.0
    }

    fn sample_bone(&self, bone: usize, normalized_time: f32) -> BonePose {
        let Some(track) = self.track_for(bone) else {
            return BonePose::IDENTITY;
        };
        BonePose {
            translation: sample_channel(&track.translation, normalized_time, Vec3::ZERO, |a, b, t| {
                a.lerp(b, t)
            }),
            rotation: sample_channel(&track.rotation, normalized_time, Quat::IDENTITY, |a, b, t| {
                a.lerp(b, t)
            }),
            scale: sample_channel(&track.scale, normalized_time, Vec3::ONE, |a, b, t| a.lerp(b, t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_clip() -> KeyframeClip {
        KeyframeClip::new(
            "line",
            1000,
            2,
            vec![BoneTrack {
                bone: 0,
                translation: vec![
                    Key { stamp: 0.0, value: Vec3::ZERO },
                    Key { stamp: 1.0, value: Vec3::new(4.0, 0.0, 0.0) },
                ],
                ..Default::default()
            }],
        )
        .unwrap()
    }

    #[test]
    fn interpolates_between_keys() {
        let clip = line_clip();
        let pose = clip.sample_bone(0, 0.25);
        assert!(pose.translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
        assert_eq!(pose.rotation, Quat::IDENTITY);
        assert_eq!(pose.scale, Vec3::ONE);
    }

    #[test]
    fn untracked_bone_is_identity() {
        assert_eq!(line_clip().sample_bone(1, 0.5), BonePose::IDENTITY);
        assert_eq!(line_clip().sample_bone(7, 0.5), BonePose::IDENTITY);
    }

    #[test]
    fn rejects_out_of_order_stamps() {
        let err = KeyframeClip::new(
            "bad",
            500,
            1,
            vec![BoneTrack {
                bone: 0,
                scale: vec![
                    Key { stamp: 0.6, value: Vec3::ONE },
                    Key { stamp: 0.2, value: Vec3::ONE },
                ],
                ..Default::default()
            }],
        )
        .unwrap_err();
        assert!(matches!(err, PoseError::InvalidClip { .. }));
    }

    #[test]
    fn rejects_track_outside_skeleton() {
        let err = KeyframeClip::new(
            "bad",
            500,
            1,
            vec![BoneTrack { bone: 3, ..Default::default() }],
        )
        .unwrap_err();
        assert!(matches!(err, PoseError::InvalidClip { .. }));
    }

    #[test]
    fn json_round_trip_keeps_sampling() {
        let json = r#"{
            "name": "lift",
            "duration": 2000,
            "boneCount": 1,
            "tracks": [{
                "bone": 0,
                "translation": [
                    { "stamp": 0.0, "value": [0.0, 0.0, 0.0] },
                    { "stamp": 0.5, "value": [0.0, 2.0, 0.0] }
                ]
            }]
        }"#;
        let clip = KeyframeClip::from_json(json).unwrap();
        assert_eq!(clip.duration_seconds(), 2.0);
        let held = clip.sample_bone(0, 0.9);
        assert!(held.translation.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));

        let again = KeyframeClip::from_json(&clip.to_json().unwrap()).unwrap();
        assert_eq!(again.tracks(), clip.tracks());
    }

    #[test]
    fn zero_duration_fails_to_parse() {
        let json = r#"{ "name": "x", "duration": 0, "boneCount": 1 }"#;
        assert!(KeyframeClip::from_json(json).is_err());
    }
}
