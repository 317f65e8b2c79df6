use std::collections::BTreeMap;

use crate::camera::rig::{self, CameraRig};
use crate::foundation::core::Affine;
use crate::foundation::error::{CelError, CelResult};
use crate::model::keyframe::{KeyContent, KeyFrame};

/// Last frame a range edit may write to.
pub const MAX_FRAME: u32 = 9999;

/// Content kind of a layer. Every key on a layer has matching content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Raster images.
    Bitmap,
    /// Vector curves.
    Vector,
    /// Camera moves.
    Camera,
    /// Audio clips.
    Sound,
    /// Camera with per-plane depth. Treated like `Camera`.
    MultiPlaneCamera,
}

impl LayerKind {
    /// `Camera` or `MultiPlaneCamera`.
    pub fn is_camera(self) -> bool {
        matches!(self, Self::Camera | Self::MultiPlaneCamera)
    }

    /// Layers whose keys produce pixels on the canvas.
    pub fn is_drawable(self) -> bool {
        matches!(self, Self::Bitmap | Self::Vector)
    }
}

/// Ordered sparse set of keyframes of one content kind.
///
/// Frames between keys hold the content of the nearest key at or before them.
#[derive(Clone, Debug)]
pub struct Layer {
    name: String,
    kind: LayerKind,
    visible: bool,
    pub(crate) keys: BTreeMap<u32, KeyFrame>,
    pub(crate) rig: Option<CameraRig>,
}

impl Layer {
    /// Empty visible layer. Camera layers get a default rig.
    pub fn new(kind: LayerKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            visible: true,
            keys: BTreeMap::new(),
            rig: kind.is_camera().then(CameraRig::default),
        }
    }

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Content kind.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Whether the layer is painted.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flip visibility.
    pub fn switch_visibility(&mut self) {
        self.visible = !self.visible;
    }

    /// Framing state of a camera layer.
    pub fn rig(&self) -> Option<&CameraRig> {
        self.rig.as_ref()
    }

    /// Mutable framing state of a camera layer.
    pub fn rig_mut(&mut self) -> Option<&mut CameraRig> {
        self.rig.as_mut()
    }

    /// Number of keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Keys in ascending position order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyFrame> {
        self.keys.values()
    }

    /// True when a key sits exactly at `pos`.
    pub fn key_exists(&self, pos: u32) -> bool {
        self.keys.contains_key(&pos)
    }

    /// Key exactly at `pos`.
    pub fn key_at(&self, pos: u32) -> Option<&KeyFrame> {
        self.keys.get(&pos)
    }

    /// Mutable key exactly at `pos`.
    pub fn key_at_mut(&mut self, pos: u32) -> Option<&mut KeyFrame> {
        self.keys.get_mut(&pos)
    }

    /// The key covering `pos`: the nearest key at or before it.
    pub fn last_key_at(&self, pos: u32) -> Option<&KeyFrame> {
        self.keys.range(..=pos).next_back().map(|(_, k)| k)
    }

    /// Mutable key covering `pos`.
    pub fn last_key_at_mut(&mut self, pos: u32) -> Option<&mut KeyFrame> {
        self.keys.range_mut(..=pos).next_back().map(|(_, k)| k)
    }

    /// The key whose span `[key.pos, key.pos + length)` contains `pos`.
    pub fn key_which_covers(&self, pos: u32) -> Option<&KeyFrame> {
        self.last_key_at(pos)
            .filter(|k| u64::from(k.pos()) + u64::from(k.length()) > u64::from(pos))
    }

    /// True when some key's span contains `pos`.
    pub fn key_exists_which_covers(&self, pos: u32) -> bool {
        self.key_which_covers(pos).is_some()
    }

    /// First key position strictly after `pos`.
    pub fn next_key_position(&self, pos: u32) -> Option<u32> {
        self.keys
            .range(pos.saturating_add(1)..)
            .next()
            .map(|(p, _)| *p)
    }

    /// Last key position strictly before `pos`.
    pub fn previous_key_position(&self, pos: u32) -> Option<u32> {
        self.keys.range(..pos).next_back().map(|(p, _)| *p)
    }

    /// Position of the first key.
    pub fn first_key_position(&self) -> Option<u32> {
        self.keys.keys().next().copied()
    }

    /// Position of the last key.
    pub fn max_key_position(&self) -> Option<u32> {
        self.keys.keys().next_back().copied()
    }

    /// Frame before `pos`: the previous key when stepping by keys, else `pos - 1`.
    pub fn previous_frame_number(&self, pos: u32, by_keys: bool) -> Option<u32> {
        let prev = if by_keys {
            self.previous_key_position(pos)?
        } else {
            pos.checked_sub(1)?
        };
        (prev >= 1 && prev < pos).then_some(prev)
    }

    /// Frame after `pos`: the next key when stepping by keys, else `pos + 1`.
    pub fn next_frame_number(&self, pos: u32, by_keys: bool) -> Option<u32> {
        let next = if by_keys {
            self.next_key_position(pos)?
        } else {
            pos.checked_add(1)?
        };
        (next > pos).then_some(next)
    }

    /// Insert an existing key. Refused when the slot is taken, the position is zero or the
    /// content does not belong on this layer.
    pub fn insert_key(&mut self, key: KeyFrame) -> bool {
        if key.pos() == 0 || self.key_exists(key.pos()) || !key.content().fits(self.kind) {
            return false;
        }
        self.keys.insert(key.pos(), key);
        true
    }

    /// Replace whatever key sits at `key.pos()`.
    pub(crate) fn put_key(&mut self, key: KeyFrame) -> bool {
        if key.pos() == 0 || !key.content().fits(self.kind) {
            return false;
        }
        self.keys.insert(key.pos(), key);
        true
    }

    /// Create an empty key at `pos`. Camera keys are seeded from their neighbours.
    pub fn add_new_key_at(&mut self, pos: u32) -> bool {
        if pos == 0 || self.key_exists(pos) {
            return false;
        }
        let key = if self.kind.is_camera() {
            rig::create_camera_key(self, pos)
        } else {
            KeyFrame::new(pos, KeyContent::empty_for(self.kind))
        };
        self.keys.insert(pos, key);
        true
    }

    /// Remove and return the key at `pos`.
    pub fn remove_key(&mut self, pos: u32) -> Option<KeyFrame> {
        self.keys.remove(&pos)
    }

    /// Interpolated camera view at `frame`; identity for layers without camera keys.
    pub fn view_at_frame(&self, frame: u32) -> Affine {
        rig::view_transform_at_frame(self, frame)
    }

    /// Copy keys in `[start, end]` `loops` times back to back from `dest_start`, onto `target`
    /// or onto this layer when `target` is `None`. Destination keys are overwritten.
    pub fn copy_frames(
        &mut self,
        start: u32,
        end: u32,
        loops: u32,
        dest_start: u32,
        target: Option<&mut Layer>,
    ) -> CelResult<()> {
        let span = check_range(start, end)?;
        if loops == 0 {
            return Err(CelError::validation("copy needs at least one loop"));
        }
        check_dest(dest_start, u64::from(span) * u64::from(loops))?;
        let source: Vec<KeyFrame> = self.keys.range(start..=end).map(|(_, k)| k.clone()).collect();
        let target = match target {
            Some(t) => {
                check_kinds(self.kind, t.kind)?;
                t
            }
            None => self,
        };
        for lap in 0..loops {
            for key in &source {
                let pos = dest_start + lap * span + (key.pos() - start);
                target.put_key(key.clone_at(pos));
            }
        }
        Ok(())
    }

    /// Move keys in `[start, end]` so the range begins at `dest_start`.
    pub fn move_frames(
        &mut self,
        start: u32,
        end: u32,
        dest_start: u32,
        target: Option<&mut Layer>,
    ) -> CelResult<()> {
        let span = check_range(start, end)?;
        check_dest(dest_start, u64::from(span))?;
        if let Some(t) = target.as_ref() {
            check_kinds(self.kind, t.kind)?;
        }
        let positions: Vec<u32> = self.keys.range(start..=end).map(|(p, _)| *p).collect();
        let moved: Vec<KeyFrame> = positions
            .into_iter()
            .filter_map(|p| self.keys.remove(&p))
            .collect();
        let target = target.unwrap_or(self);
        for key in moved {
            let pos = dest_start + (key.pos() - start);
            target.put_key(key.clone_at(pos));
        }
        Ok(())
    }

    /// Write the keys of `[start, end]` in reverse order from `dest_start`.
    pub fn reverse_frames(&mut self, start: u32, end: u32, dest_start: u32) -> CelResult<()> {
        let span = check_range(start, end)?;
        check_dest(dest_start, u64::from(span))?;
        let source: Vec<KeyFrame> = self.keys.range(start..=end).map(|(_, k)| k.clone()).collect();
        for key in source {
            let pos = dest_start + (end - key.pos());
            self.put_key(key.clone_at(pos));
        }
        Ok(())
    }

    /// Remove every key in `[start, end]`.
    pub fn delete_frames(&mut self, start: u32, end: u32) -> CelResult<()> {
        check_range(start, end)?;
        self.keys.retain(|p, _| *p < start || *p > end);
        Ok(())
    }

    /// Last frame that holds content, counting sound spans.
    pub fn animation_end(&self) -> u32 {
        self.keys
            .values()
            .map(|k| {
                let last = (u64::from(k.pos()) + u64::from(k.length())).saturating_sub(1);
                u32::try_from(last).unwrap_or(u32::MAX)
            })
            .max()
            .unwrap_or(0)
    }
}

fn check_range(start: u32, end: u32) -> CelResult<u32> {
    if start == 0 || start > end {
        return Err(CelError::validation(format!(
            "frame range {start}..={end} is not valid"
        )));
    }
    Ok(end - start + 1)
}

fn check_dest(dest_start: u32, len: u64) -> CelResult<()> {
    if dest_start == 0 {
        return Err(CelError::validation("destination frame must be at least 1"));
    }
    let last = (u64::from(dest_start) + len).saturating_sub(1);
    if last > u64::from(MAX_FRAME) {
        return Err(CelError::validation(format!(
            "range would end at frame {last}, past {MAX_FRAME}"
        )));
    }
    Ok(())
}

fn check_kinds(from: LayerKind, to: LayerKind) -> CelResult<()> {
    if from != to {
        return Err(CelError::validation(format!(
            "cannot transfer keys from a {from:?} layer to a {to:?} layer"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/layer.rs"]
mod tests;
