use crate::camera::rig;
use crate::config::EditorConfig;
use crate::editor::clipboard::{Clipboard, ClipboardContent};
use crate::foundation::core::{Affine, PixelRect, Point};
use crate::foundation::error::CelResult;
use crate::history::{History, HistoryContext, Restored};
use crate::imaging::{BitmapImage, BlendMode, Surface, VectorImage};
use crate::model::keyframe::{KeyContent, KeyFrame};
use crate::model::layer::LayerKind;
use crate::model::object::Object;
use crate::model::selection::Selection;
use crate::model::sound::{FsSoundLoader, SoundLoader};
use crate::render::{CacheScope, CanvasPainter, LayerVisibility, RenderOptions};

/// One editing session over an [`Object`].
///
/// Owns the position (current layer and frame), the selection, the undo history, the canvas
/// painter and the clipboard. History restores are reported back here and turned into scrubs
/// and cache invalidations, so the history never reaches into the painter.
pub struct Editor {
    object: Object,
    selection: Selection,
    history: History,
    painter: CanvasPainter,
    clipboard: Clipboard,
    sound_loader: Box<dyn SoundLoader>,
    current_layer: usize,
    frame: u32,
    last_modified: Option<(usize, u32)>,
}

impl Editor {
    /// Session over `object` with the filesystem sound loader.
    pub fn new(object: Object, config: EditorConfig) -> Self {
        Self::with_sound_loader(object, config, Box::new(FsSoundLoader))
    }

    /// Session with a custom sound loader, used when undo reloads sound clips.
    pub fn with_sound_loader(
        object: Object,
        config: EditorConfig,
        sound_loader: Box<dyn SoundLoader>,
    ) -> Self {
        let mut painter = CanvasPainter::new(config.render);
        painter.set_paint_settings(0, 1);
        Self {
            object,
            selection: Selection::new(),
            history: History::new(config.history),
            painter,
            clipboard: Clipboard::new(),
            sound_loader,
            current_layer: 0,
            frame: 1,
            last_modified: None,
        }
    }

    /// The edited document.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Mutable selection. Changes do not mark the frame modified.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Undo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Canvas painter with its caches and counters.
    pub fn painter(&self) -> &CanvasPainter {
        &self.painter
    }

    /// Clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Mutable clipboard.
    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    /// Layer and frame of the last edit, if any.
    pub fn last_modified(&self) -> Option<(usize, u32)> {
        self.last_modified
    }

    // Position

    /// Index of the layer being edited.
    pub fn current_layer_index(&self) -> usize {
        self.current_layer
    }

    /// Switch the current layer. Returns `false` for an out-of-range index.
    pub fn set_current_layer_index(&mut self, index: usize) -> bool {
        if index >= self.object.layer_count() {
            return false;
        }
        self.current_layer = index;
        self.sync_camera_rect();
        true
    }

    /// Frame under the playhead, starting at 1.
    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    /// Move the playhead; frames start at 1.
    pub fn scrub_to(&mut self, frame: u32) {
        self.frame = frame.max(1);
        self.sync_camera_rect();
    }

    /// Step one frame forward.
    pub fn scrub_forward(&mut self) {
        self.scrub_to(self.frame.saturating_add(1));
    }

    /// Step one frame back, stopping at frame 1.
    pub fn scrub_backward(&mut self) {
        if self.frame > 1 {
            self.scrub_to(self.frame - 1);
        }
    }

    /// Jump to the next key of the current layer.
    pub fn scrub_next_keyframe(&mut self) {
        let next = self
            .object
            .layer(self.current_layer)
            .and_then(|l| l.next_key_position(self.frame));
        if let Some(next) = next {
            self.scrub_to(next);
        }
    }

    /// Jump to the previous key of the current layer.
    pub fn scrub_previous_keyframe(&mut self) {
        let prev = self
            .object
            .layer(self.current_layer)
            .and_then(|l| l.previous_key_position(self.frame));
        if let Some(prev) = prev {
            self.scrub_to(prev);
        }
    }

    fn sync_camera_rect(&mut self) {
        let frame = self.frame;
        if let Some(layer) = self.object.layer_mut(self.current_layer)
            && layer.kind().is_camera()
        {
            rig::update_cam_rect(layer, frame);
        }
    }

    // Keys

    /// Add an empty key on `layer` at the first free slot from `frame`, then scrub there.
    pub fn add_key_frame(&mut self, layer: usize, frame: u32) -> bool {
        let Some(target) = self.object.layer_mut(layer) else {
            return false;
        };
        if !target.is_visible() {
            return false;
        }
        let mut frame = frame.max(1);
        while let Some(key) = target.key_at(frame) {
            if key.as_sound().is_some_and(|clip| clip.file_name().is_none()) {
                target.remove_key(frame);
                break;
            }
            frame = match frame.checked_add(1) {
                Some(f) => f,
                None => return false,
            };
        }
        if !target.add_new_key_at(frame) {
            return false;
        }
        tracing::debug!(layer, frame, "key added");
        self.painter.invalidate(CacheScope::Layer(layer));
        self.scrub_to(frame);
        true
    }

    /// Add a key under the playhead on the current layer.
    pub fn add_new_key(&mut self) -> bool {
        self.add_key_frame(self.current_layer, self.frame)
    }

    /// Remove the key under the playhead on the current layer, backing it up first.
    pub fn remove_key(&mut self) -> bool {
        let Some(layer) = self.object.layer(self.current_layer) else {
            return false;
        };
        if !layer.is_visible() {
            return false;
        }
        let Some(pos) = layer.key_which_covers(self.frame).map(KeyFrame::pos) else {
            return false;
        };
        self.backup("Remove frame");
        self.deselect_all();
        if let Some(layer) = self.object.layer_mut(self.current_layer) {
            layer.remove_key(pos);
        }
        self.painter.invalidate(CacheScope::Layer(self.current_layer));
        self.scrub_backward();
        true
    }

    // Layers

    /// Delete layer `index`. The last remaining layer is kept.
    pub fn delete_layer(&mut self, index: usize) -> bool {
        if self.object.layer_count() <= 1 || self.object.delete_layer(index).is_none() {
            return false;
        }
        self.history.sanitize_after_layer_deletion(index);
        self.last_modified = match self.last_modified {
            Some((l, _)) if l == index => None,
            Some((l, f)) if l > index => Some((l - 1, f)),
            other => other,
        };
        if self.current_layer > index || self.current_layer >= self.object.layer_count() {
            self.current_layer = self.current_layer.saturating_sub(1);
        }
        self.painter.reset_cache();
        true
    }

    /// Swap two layers. The current layer index follows its layer.
    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        if a == b || !self.object.swap_layers(a, b) {
            return false;
        }
        let follow = |i: usize| {
            if i == a {
                b
            } else if i == b {
                a
            } else {
                i
            }
        };
        self.current_layer = follow(self.current_layer);
        self.last_modified = self.last_modified.map(|(l, f)| (follow(l), f));
        self.history.remap_swapped_layers(a, b);
        self.painter.reset_cache();
        true
    }

    /// Toggle visibility of the layer at `index`.
    pub fn switch_visibility_of_layer(&mut self, index: usize) -> bool {
        let Some(layer) = self.object.layer_mut(index) else {
            return false;
        };
        layer.switch_visibility();
        self.painter.invalidate(CacheScope::Layer(index));
        true
    }

    /// Set the layer visibility mode.
    pub fn set_layer_visibility(&mut self, mode: LayerVisibility) {
        let mut options = self.painter.options().clone();
        options.layer_visibility = mode;
        self.painter.set_options(options);
    }

    /// Cycle the layer visibility mode forward.
    pub fn increase_layer_visibility_index(&mut self) {
        self.set_layer_visibility(self.painter.options().layer_visibility.next());
    }

    /// Cycle the layer visibility mode backward.
    pub fn decrease_layer_visibility_index(&mut self) {
        self.set_layer_visibility(self.painter.options().layer_visibility.prev());
    }

    /// Replace the paint options. Drops both caches.
    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.painter.set_options(options);
    }

    /// Set the world-to-device transform.
    pub fn set_view_transform(&mut self, view: Affine) {
        let inverse = view.inverse();
        self.painter.set_view_transform(view, inverse);
    }

    // Editing

    /// Edit the bitmap key covering the playhead on the current layer.
    pub fn modify_current_bitmap(&mut self, f: impl FnOnce(&mut BitmapImage)) -> bool {
        let frame = self.frame;
        let Some(image) = self
            .object
            .layer_mut(self.current_layer)
            .and_then(|l| l.last_key_at_mut(frame))
            .and_then(KeyFrame::as_bitmap_mut)
        else {
            return false;
        };
        f(image);
        self.mark_modified();
        true
    }

    /// Edit the vector key covering the playhead on the current layer.
    pub fn modify_current_vector(&mut self, f: impl FnOnce(&mut VectorImage)) -> bool {
        let frame = self.frame;
        let Some(image) = self
            .object
            .layer_mut(self.current_layer)
            .and_then(|l| l.last_key_at_mut(frame))
            .and_then(KeyFrame::as_vector_mut)
        else {
            return false;
        };
        f(image);
        self.mark_modified();
        true
    }

    fn mark_modified(&mut self) {
        self.last_modified = Some((self.current_layer, self.frame));
        self.painter.invalidate(CacheScope::Layer(self.current_layer));
    }

    /// Select the whole current frame. Vector curves are flagged as selected.
    pub fn select_all(&mut self) {
        let rect = match self.current_key_mut().map(KeyFrame::content_mut) {
            Some(KeyContent::Bitmap(image)) => Some(image.bounds().to_rect()),
            Some(KeyContent::Vector(image)) => {
                image.select_all();
                Some(image.calculate_selection_rect())
            }
            _ => None,
        };
        if let Some(rect) = rect {
            self.selection.set_selection(rect);
        }
    }

    /// Clear the selection and the curve selection flags.
    pub fn deselect_all(&mut self) {
        if let Some(image) = self.current_key_mut().and_then(KeyFrame::as_vector_mut) {
            image.deselect_all();
        }
        self.selection.clear();
    }

    /// Erase the selected region or curves, backing up first.
    pub fn delete_selection(&mut self) -> bool {
        if !self.selection.something_selected() {
            return false;
        }
        self.backup("Delete Selection");
        let region = PixelRect::from_rect(self.selection.selection_rect());
        match self.current_kind() {
            Some(LayerKind::Bitmap) => self.modify_current_bitmap(|image| image.clear(region)),
            Some(LayerKind::Vector) => self.modify_current_vector(VectorImage::delete_selection),
            _ => false,
        }
    }

    fn current_kind(&self) -> Option<LayerKind> {
        self.object.layer(self.current_layer).map(|l| l.kind())
    }

    fn current_key(&self) -> Option<&KeyFrame> {
        self.object
            .layer(self.current_layer)
            .and_then(|l| l.last_key_at(self.frame))
    }

    fn current_key_mut(&mut self) -> Option<&mut KeyFrame> {
        let frame = self.frame;
        self.object
            .layer_mut(self.current_layer)
            .and_then(|l| l.last_key_at_mut(frame))
    }

    // Clipboard

    /// Copy the selection, or the whole bitmap when nothing is selected.
    pub fn copy(&mut self) -> bool {
        let Some(key) = self.current_key() else {
            return false;
        };
        let content = match key.content() {
            KeyContent::Bitmap(image) => {
                let copied = if self.selection.something_selected() {
                    image.copy(PixelRect::from_rect(self.selection.selection_rect()))
                } else {
                    image.clone()
                };
                ClipboardContent::Bitmap(copied)
            }
            KeyContent::Vector(image) => ClipboardContent::Vector(image.selected_copy()),
            _ => return false,
        };
        self.clipboard.set(content);
        true
    }

    /// Copy the selection, then delete it.
    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.delete_selection();
        self.deselect_all();
        true
    }

    /// Paste the clipboard onto the current key. Bitmaps land at the selection's top-left, or
    /// are scaled into it when they do not fit.
    pub fn paste(&mut self) -> bool {
        match (self.current_kind(), self.clipboard.content().cloned()) {
            (Some(LayerKind::Bitmap), Some(ClipboardContent::Bitmap(mut pasted))) => {
                if pasted.is_empty() || self.current_key().is_none() {
                    return false;
                }
                self.backup("Paste");
                if self.selection.something_selected() {
                    let target = PixelRect::from_rect(self.selection.selection_rect());
                    let size = pasted.bounds();
                    if size.width <= target.width && size.height <= target.height {
                        pasted.move_top_left(Point::new(f64::from(target.x), f64::from(target.y)));
                    } else {
                        pasted = pasted.scaled_to(target, self.painter.options().antialias);
                    }
                }
                self.modify_current_bitmap(|image| image.paste(&pasted, BlendMode::SourceOver))
            }
            (Some(LayerKind::Vector), Some(ClipboardContent::Vector(pasted))) => {
                if self.current_key().is_none() {
                    return false;
                }
                self.backup("Paste");
                let mut rect = None;
                self.modify_current_vector(|image| {
                    image.paste(&pasted);
                    rect = Some(image.calculate_selection_rect());
                });
                if let Some(rect) = rect {
                    self.selection.set_selection(rect);
                }
                true
            }
            _ => false,
        }
    }

    // History

    fn with_history<R>(&mut self, f: impl FnOnce(&mut History, &mut HistoryContext<'_>) -> R) -> R {
        let mut ctx = HistoryContext {
            object: &mut self.object,
            selection: &mut self.selection,
            sound_loader: &mut *self.sound_loader,
            current_layer: self.current_layer,
            current_frame: self.frame,
            last_modified: self.last_modified,
        };
        f(&mut self.history, &mut ctx)
    }

    /// Back up the current layer and frame under `label`.
    pub fn backup(&mut self, label: &str) {
        self.with_history(|history, ctx| history.backup(ctx, label));
    }

    /// Step back one backup. The playhead moves to the restored key.
    pub fn undo(&mut self) -> Option<Restored> {
        let restored = self.with_history(|history, ctx| history.undo(ctx))?;
        self.apply_restored(restored);
        Some(restored)
    }

    /// Reapply the last undone backup.
    pub fn redo(&mut self) -> Option<Restored> {
        let restored = self.with_history(|history, ctx| history.redo(ctx))?;
        self.apply_restored(restored);
        Some(restored)
    }

    fn apply_restored(&mut self, restored: Restored) {
        self.painter.invalidate(CacheScope::Layer(restored.layer));
        self.scrub_to(restored.frame);
    }

    /// Whether the history asked for an autosave since the last call.
    pub fn take_needs_save(&mut self) -> bool {
        self.history.take_needs_save()
    }

    // Rendering

    /// Composite the current frame onto `canvas`, with `buffer` as the live stroke.
    pub fn render(&mut self, canvas: &mut Surface, buffer: Option<&BitmapImage>) -> CelResult<()> {
        self.painter.set_paint_settings(self.current_layer, self.frame);
        if self.selection.is_transforming() && self.current_kind() == Some(LayerKind::Bitmap) {
            self.painter.set_transformed_selection(
                PixelRect::from_rect(self.selection.selection_rect()),
                self.selection.transform(),
            );
        } else {
            self.painter.ignore_transformed_selection();
        }
        self.painter.paint(&self.object, buffer, canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
