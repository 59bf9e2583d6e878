//! Skeleton pose assembly and animation-track grouping.
//!
//! A [`SkeletonDef`] only carries each bone's *default* track reference —
//! the `"POS"` pose. Additional animations live as independently named
//! `0x13` fragments scattered elsewhere in the document; this module finds
//! them, groups them by animation name, and samples the resulting
//! hierarchy at a given frame into world-relative bone transforms.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::parser::{FragmentRef, FragmentType, SkeletonDef, SkeletonTrackRef, WldDoc};

/// The name every skeleton's default, node-authored pose is stored under.
pub const POSE: &str = "POS";

/// A skeleton's known animations, each a per-bone array of `0x13` track
/// references in node order (same order and length as the skeleton's
/// `entries`).
#[derive(Debug)]
pub struct AnimationSet {
    pub animations: BTreeMap<String, Vec<FragmentRef<SkeletonTrackRef>>>,
}

impl AnimationSet {
    /// Build the pose plus every other animation found in `doc` for a
    /// skeleton keyed by its `*_HS_DEF` 3-character prefix.
    pub fn build(doc: &WldDoc, skeleton_key: &str, skeleton: &SkeletonDef) -> Self {
        let pose: Vec<FragmentRef<SkeletonTrackRef>> =
            skeleton.entries.iter().map(|e| e.track_reference).collect();

        let bone_slot_by_track_name: BTreeMap<String, usize> = skeleton
            .entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let track_ref = doc.get(&entry.track_reference)?;
                let name = doc.get_string(track_ref.name_reference)?;
                Some((name, idx))
            })
            .collect();

        let mut animations = BTreeMap::new();
        animations.insert(POSE.to_string(), pose.clone());

        for (zero_based_index, fragment) in doc.iter().enumerate() {
            let FragmentType::SkeletonTrackRef(track_ref) = fragment else {
                continue;
            };
            let Some(name) = doc.get_string(track_ref.name_reference) else {
                continue;
            };
            if !is_track_name(&name) {
                continue;
            }
            let anim_name = &name[0..3];
            let key = &name[3..6];
            if key != skeleton_key {
                continue;
            }
            let suffix = &name[3..];
            let Some(&slot) = bone_slot_by_track_name.get(suffix) else {
                continue;
            };

            let this_ref = FragmentRef::<SkeletonTrackRef>::new((zero_based_index + 1) as i32);
            animations
                .entry(anim_name.to_string())
                .or_insert_with(|| pose.clone())[slot] = this_ref;
        }

        AnimationSet { animations }
    }
}

/// Is `s` the `*_HS_DEF` name of a skeleton definition: exactly three
/// alphanumeric characters followed by the literal suffix `_HS_DEF`.
pub fn is_skeleton_def_name(s: &str) -> bool {
    let Some(prefix) = s.strip_suffix("_HS_DEF") else {
        return false;
    };
    prefix.len() == 3 && prefix.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Is `s` an animation track name: one letter, two digits, arbitrary
/// middle, literal suffix `_TRACK`.
fn is_track_name(s: &str) -> bool {
    let Some(_) = s.strip_suffix("_TRACK") else {
        return false;
    };
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    chars.next().is_some_and(|c| c.is_ascii_digit()) && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// A bone's world-relative transform at a sampled animation frame.
#[derive(Debug, Clone)]
pub struct BoneTransform {
    pub name: Option<String>,
    pub location: Vec3,
    pub rotation: Quat,
}

/// Sample every bone of `skeleton` at `frame`, composing each child's
/// local transform with its parent's accumulated transform:
/// `location' = parent_rotation * location + parent_location`,
/// `rotation' = parent_rotation * rotation`.
pub fn transformations(
    doc: &WldDoc,
    skeleton: &SkeletonDef,
    animation: &[FragmentRef<SkeletonTrackRef>],
    frame: usize,
) -> BTreeMap<usize, BoneTransform> {
    let mut out = BTreeMap::new();
    let mut is_child = vec![false; skeleton.entries.len()];
    for entry in &skeleton.entries {
        for &child in &entry.sub_dags {
            if let Some(slot) = is_child.get_mut(child as usize) {
                *slot = true;
            }
        }
    }

    for (idx, _) in skeleton.entries.iter().enumerate() {
        if !is_child[idx] {
            walk(doc, skeleton, animation, frame, idx, Vec3::ZERO, Quat::IDENTITY, &mut out);
        }
    }
    out
}

fn walk(
    doc: &WldDoc,
    skeleton: &SkeletonDef,
    animation: &[FragmentRef<SkeletonTrackRef>],
    frame: usize,
    idx: usize,
    parent_location: Vec3,
    parent_rotation: Quat,
    out: &mut BTreeMap<usize, BoneTransform>,
) {
    let Some(entry) = skeleton.entries.get(idx) else {
        return;
    };
    let name = doc.get_string(entry.name_reference);
    let track_ref = animation.get(idx).copied().unwrap_or(entry.track_reference);
    let (local_location, local_rotation) = sample(doc, track_ref, frame);

    let rotation = parent_rotation * local_rotation;
    let location = parent_rotation * local_location + parent_location;

    out.insert(
        idx,
        BoneTransform {
            name,
            location,
            rotation,
        },
    );

    for &child in &entry.sub_dags {
        walk(doc, skeleton, animation, frame, child as usize, location, rotation, out);
    }
}

fn sample(doc: &WldDoc, track_ref: FragmentRef<SkeletonTrackRef>, frame: usize) -> (Vec3, Quat) {
    let identity = (Vec3::ZERO, Quat::IDENTITY);
    let Some(track_ref) = doc.get(&track_ref) else {
        return identity;
    };
    let Some(track) = doc.get(&track_ref.reference) else {
        return identity;
    };
    if track.frames.is_empty() {
        return identity;
    }

    let sampled = track.frame(frame);
    let location = sampled
        .location
        .map(|(x, y, z)| Vec3::new(x, y, z))
        .unwrap_or(Vec3::ZERO);
    let rotation = sampled
        .rotation
        .map(|(w, x, y, z)| Quat::from_xyzw(x, y, z, w))
        .unwrap_or(Quat::IDENTITY);
    (location, rotation)
}
