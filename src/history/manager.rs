use crate::history::element::{BackupContent, BackupElement, HistoryOptions};
use crate::model::keyframe::{KeyContent, KeyFrame};
use crate::model::layer::{Layer, LayerKind};
use crate::model::object::Object;
use crate::model::selection::Selection;
use crate::model::sound::{SoundClip, SoundLoader};

/// Label of the synthetic backup pushed when undoing the newest edit.
pub const NOOP_LABEL: &str = "NoOp";

/// Live editing state the history reads from and restores into.
pub struct HistoryContext<'a> {
    /// Document being edited.
    pub object: &'a mut Object,
    /// Live selection.
    pub selection: &'a mut Selection,
    /// Reloads sound clips on restore.
    pub sound_loader: &'a mut dyn SoundLoader,
    /// Layer a new backup captures.
    pub current_layer: usize,
    /// Frame a new backup captures.
    pub current_frame: u32,
    /// Location of the last committed edit, if any.
    pub last_modified: Option<(usize, u32)>,
}

/// Where a restore landed; the caller scrubs there and refreshes the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restored {
    /// Layer index.
    pub layer: usize,
    /// Frame.
    pub frame: u32,
}

/// Bounded linear undo list with a single cursor.
///
/// The cursor points at the most recently applied element, `None` when nothing is left to undo.
#[derive(Clone, Debug, Default)]
pub struct History {
    elements: Vec<BackupElement>,
    index: Option<usize>,
    options: HistoryOptions,
    autosave_counter: u32,
    needs_save: bool,
}

impl History {
    /// Empty history.
    pub fn new(options: HistoryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Capacity and autosave settings.
    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    /// Number of retained backups.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True with no backups.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Cursor position, `None` when nothing is left to undo.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Retained backups, oldest first.
    pub fn elements(&self) -> &[BackupElement] {
        &self.elements
    }

    /// Labels of the retained backups, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.label.as_str()).collect()
    }

    /// True when an undo would restore something.
    pub fn can_undo(&self) -> bool {
        self.index.is_some()
    }

    /// True when a redo would restore something.
    pub fn can_redo(&self) -> bool {
        self.cursor() < self.elements.len() as isize - 2
    }

    /// Element under the cursor.
    pub fn current_backup(&self) -> Option<&BackupElement> {
        self.index.and_then(|i| self.elements.get(i))
    }

    /// Drop every backup and reset the autosave counter.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index = None;
    }

    /// Whether enough backups accumulated for an autosave; reading resets the flag.
    pub fn take_needs_save(&mut self) -> bool {
        std::mem::take(&mut self.needs_save)
    }

    fn cursor(&self) -> isize {
        self.index.map_or(-1, |i| i as isize)
    }

    fn set_cursor(&mut self, cursor: isize) {
        self.index = usize::try_from(cursor).ok();
    }

    /// Back up the last modified location and, when it differs, the current position too.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn backup(&mut self, ctx: &mut HistoryContext<'_>, label: &str) {
        let current = (ctx.current_layer, ctx.current_frame);
        if let Some((layer, frame)) = ctx.last_modified
            && let Some(frame) = backup_frame(ctx.object.layer(layer), frame)
        {
            self.backup_at(ctx, layer, frame, label);
        }
        if ctx.last_modified != Some(current)
            && let Some(frame) = backup_frame(ctx.object.layer(current.0), current.1)
        {
            self.backup_at(ctx, current.0, frame, label);
        }
    }

    /// Snapshot `layer` at `frame`. Returns whether an element was appended.
    ///
    /// The redo branch is discarded and the oldest elements evicted first, even when nothing
    /// ends up being captured.
    pub fn backup_at(
        &mut self,
        ctx: &mut HistoryContext<'_>,
        layer: usize,
        frame: u32,
        label: &str,
    ) -> bool {
        self.elements.truncate(self.index.map_or(0, |i| i + 1));
        while self.elements.len() >= self.options.capacity.max(1) {
            self.elements.remove(0);
            self.set_cursor(self.cursor() - 1);
            tracing::debug!(capacity = self.options.capacity, "oldest backup evicted");
        }

        let Some(element) = capture(ctx, layer, frame, label) else {
            return false;
        };
        self.elements.push(element);
        self.set_cursor(self.cursor() + 1);
        self.bump_autosave();
        true
    }

    fn bump_autosave(&mut self) {
        if !self.options.autosave {
            return;
        }
        self.autosave_counter += 1;
        if self.autosave_counter >= self.options.autosave_interval {
            self.autosave_counter = 0;
            self.needs_save = true;
        }
    }

    /// Step back one edit. A no-op on an empty or fully undone history.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn undo(&mut self, ctx: &mut HistoryContext<'_>) -> Option<Restored> {
        let index = self.index?;
        if index + 1 == self.elements.len() {
            // Redo needs something to come back to after undoing the newest edit.
            let newest = &self.elements[index];
            let (layer, frame) = (newest.layer, newest.frame);
            if self.backup_at(ctx, layer, frame, NOOP_LABEL) {
                self.set_cursor(self.cursor() - 1);
            }
        }

        let index = self.index?;
        let restored = self.restore(ctx, index);
        self.set_cursor(self.cursor() - 1);

        ctx.selection.cancel_transform();
        ctx.selection.reset_selection_transform();
        if let Some(layer) = ctx.object.layer(ctx.current_layer) {
            let frame = restored.map_or(ctx.current_frame, |r| r.frame);
            if let Some(image) = layer.last_key_at(frame).and_then(KeyFrame::as_vector) {
                ctx.selection.set_selection(image.calculate_selection_rect());
            }
        }
        restored
    }

    /// Re-apply the next edit, if any.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn redo(&mut self, ctx: &mut HistoryContext<'_>) -> Option<Restored> {
        if !self.can_redo() {
            return None;
        }
        self.set_cursor(self.cursor() + 1);
        let target = usize::try_from(self.cursor() + 1).ok()?;
        self.restore(ctx, target)
    }

    /// Write element `idx` back into the live layer and selection.
    pub fn restore(&self, ctx: &mut HistoryContext<'_>, idx: usize) -> Option<Restored> {
        let element = self.elements.get(idx)?;
        let restored = Restored {
            layer: element.layer,
            frame: element.frame,
        };
        let Some(layer) = ctx.object.layer_mut(element.layer) else {
            tracing::debug!(layer = element.layer, "backup layer no longer exists");
            return Some(restored);
        };
        if layer.kind() != element.content.layer_kind() {
            tracing::debug!(layer = element.layer, "backup kind no longer matches the layer");
            return Some(restored);
        }

        match &element.content {
            BackupContent::Bitmap { image, selection } => {
                replace_key(layer, element.frame, KeyContent::Bitmap(image.clone()));
                ctx.selection.restore_state(*selection);
            }
            BackupContent::Vector { image, selection } => {
                replace_key(layer, element.frame, KeyContent::Vector(image.clone()));
                ctx.selection.restore_state(*selection);
            }
            BackupContent::Sound {
                file_name,
                display_name,
            } => {
                if !layer.key_exists(element.frame)
                    && let Some(path) = file_name
                {
                    let mut clip = SoundClip::new();
                    clip.set_display_name(display_name.as_str());
                    match ctx.sound_loader.load(&mut clip, path) {
                        Ok(()) => {
                            let mut key = KeyFrame::new(element.frame, KeyContent::Sound(clip));
                            key.set_modified(true);
                            layer.put_key(key);
                        }
                        Err(e) => {
                            tracing::warn!(
                                path = %path.display(),
                                error = %e,
                                "sound reload failed, key removed"
                            );
                            layer.remove_key(element.frame);
                        }
                    }
                }
            }
        }
        Some(restored)
    }

    /// Purge backups of the deleted layer and shift the ones above it down.
    pub fn sanitize_after_layer_deletion(&mut self, deleted: usize) {
        let mut i = 0;
        while i < self.elements.len() {
            let layer = self.elements[i].layer;
            if layer == deleted {
                if self.cursor() >= i as isize {
                    self.set_cursor(self.cursor() - 1);
                }
                self.elements.remove(i);
                continue;
            }
            if layer > deleted {
                self.elements[i].layer -= 1;
            }
            i += 1;
        }
    }

    /// Follow a swap of layers `a` and `b`.
    pub fn remap_swapped_layers(&mut self, a: usize, b: usize) {
        for e in &mut self.elements {
            if e.layer == a {
                e.layer = b;
            } else if e.layer == b {
                e.layer = a;
            }
        }
    }
}

/// Frame to back up on `layer`: sound keys are addressed by the key covering `frame`.
fn backup_frame(layer: Option<&Layer>, frame: u32) -> Option<u32> {
    let layer = layer?;
    if layer.kind() == LayerKind::Sound {
        return layer.key_which_covers(frame).map(KeyFrame::pos);
    }
    Some(frame)
}

fn capture(
    ctx: &HistoryContext<'_>,
    layer_idx: usize,
    frame: u32,
    label: &str,
) -> Option<BackupElement> {
    let layer = ctx.object.layer(layer_idx)?;
    let (frame, content) = match layer.kind() {
        LayerKind::Bitmap => {
            let key = layer.last_key_at(frame)?;
            let content = BackupContent::Bitmap {
                image: key.as_bitmap()?.clone(),
                selection: ctx.selection.state(),
            };
            (key.pos(), content)
        }
        LayerKind::Vector => {
            let key = layer.last_key_at(frame)?;
            let content = BackupContent::Vector {
                image: key.as_vector()?.clone(),
                selection: ctx.selection.state(),
            };
            (key.pos(), content)
        }
        LayerKind::Sound => {
            let key = layer.key_which_covers(frame).or_else(|| {
                layer
                    .previous_key_position(frame)
                    .and_then(|p| layer.key_at(p))
            })?;
            let clip = key.as_sound()?;
            let content = BackupContent::Sound {
                file_name: clip.file_name().map(Into::into),
                display_name: clip.display_name().to_owned(),
            };
            (frame, content)
        }
        LayerKind::Camera | LayerKind::MultiPlaneCamera => return None,
    };
    Some(BackupElement {
        layer: layer_idx,
        frame,
        label: label.to_owned(),
        content,
    })
}

/// Put `content` at `frame`, creating the key if needed.
fn replace_key(layer: &mut Layer, frame: u32, content: KeyContent) {
    if let Some(key) = layer.key_at_mut(frame) {
        key.set_content(content);
        return;
    }
    let mut key = KeyFrame::new(frame, content);
    key.set_modified(true);
    if !layer.put_key(key) {
        tracing::debug!(frame, "backup content does not fit the layer");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/manager.rs"]
mod tests;
