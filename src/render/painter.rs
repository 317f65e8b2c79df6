use std::ops::Range;

use kurbo::{BezPath, Line};

use crate::foundation::core::{Affine, PixelRect, Rect, affine_scale};
use crate::foundation::error::{CelError, CelResult};
use crate::imaging::raster::{self, FillItem};
use crate::imaging::{BitmapImage, BlendMode, Surface};
use crate::model::keyframe::KeyFrame;
use crate::model::layer::{Layer, LayerKind};
use crate::model::object::Object;
use crate::render::onion::plan_onion_skin;
use crate::render::options::{LayerVisibility, RenderOptions};
use crate::render::overlay;

/// Which cached composite an edit made stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheScope {
    /// Everything.
    All,
    /// Layers below the current one plus the current layer's onion skin.
    PreLayers,
    /// Layers above the current one.
    PostLayers,
    /// Content of one layer changed; drops whichever cache holds it.
    Layer(usize),
}

/// Counters of the work done by [`CanvasPainter`], for tests and profiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Calls to `paint`.
    pub frames_painted: u64,
    /// Layer frames composited, onion frames included.
    pub layer_draws: u64,
    /// Onion frames composited.
    pub onion_draws: u64,
    /// Layer frames skipped because the image and the live buffer were both empty.
    pub skipped_empty: u64,
    /// Passes served from cache.
    pub cache_hits: u64,
    /// Passes re-rendered.
    pub cache_rebuilds: u64,
}

#[derive(Clone, Copy, Debug)]
struct FrameDraw {
    frame: u32,
    /// Covering key when set, exact key otherwise.
    use_last_key: bool,
    /// Current layer at the current frame: receives the live buffer and the selection preview.
    is_current: bool,
    opacity: f32,
    tint: Option<[u8; 4]>,
}

/// Composites a project frame onto a device canvas in three passes: layers below the current
/// one (plus onion skin), the current layer, layers above it (plus the axis).
///
/// The first and last pass are cached between paints. Changing the current layer, frame, view,
/// options or canvas size drops the caches; content edits must be reported with
/// [`CanvasPainter::invalidate`].
#[derive(Debug)]
pub struct CanvasPainter {
    options: RenderOptions,
    view: Affine,
    view_inverse: Affine,
    current_layer: usize,
    frame: u32,
    selection_preview: Option<(PixelRect, Affine)>,
    pre_cache: Option<Surface>,
    post_cache: Option<Surface>,
    camera_rect: Option<Rect>,
    stats: PaintStats,
}

impl Default for CanvasPainter {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl CanvasPainter {
    /// Painter with empty caches, an identity view, layer 0 and frame 1.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            view: Affine::IDENTITY,
            view_inverse: Affine::IDENTITY,
            current_layer: 0,
            frame: 1,
            selection_preview: None,
            pre_cache: None,
            post_cache: None,
            camera_rect: None,
            stats: PaintStats::default(),
        }
    }

    /// Current paint options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Replace the paint options. Drops both caches.
    pub fn set_options(&mut self, options: RenderOptions) {
        if options != self.options {
            self.options = options;
            self.reset_cache();
        }
    }

    /// World-to-device transform.
    pub fn view(&self) -> Affine {
        self.view
    }

    /// World-to-device transform and its inverse.
    pub fn set_view_transform(&mut self, view: Affine, inverse: Affine) {
        if view != self.view || inverse != self.view_inverse {
            self.view = view;
            self.view_inverse = inverse;
            self.reset_cache();
        }
    }

    /// Set the current layer and frame. Drops both caches when either changes.
    pub fn set_paint_settings(&mut self, current_layer: usize, frame: u32) {
        if current_layer != self.current_layer || frame != self.frame {
            tracing::debug!(current_layer, frame, "paint settings changed");
            self.current_layer = current_layer;
            self.frame = frame;
            self.reset_cache();
        }
    }

    /// Preview `selection` of the current bitmap frame moved by `transform`. Empty selections
    /// turn the preview off.
    pub fn set_transformed_selection(&mut self, selection: PixelRect, transform: Affine) {
        if selection.is_empty() {
            self.ignore_transformed_selection();
        } else {
            self.selection_preview = Some((selection, transform));
        }
    }

    /// Turn the selection preview off.
    pub fn ignore_transformed_selection(&mut self) {
        self.selection_preview = None;
    }

    /// Drop both cached passes.
    pub fn reset_cache(&mut self) {
        self.invalidate(CacheScope::All);
    }

    /// Drop the cached pass affected by `scope`.
    pub fn invalidate(&mut self, scope: CacheScope) {
        let (pre, post) = match scope {
            CacheScope::All => (true, true),
            CacheScope::PreLayers => (true, false),
            CacheScope::PostLayers => (false, true),
            CacheScope::Layer(i) => (i <= self.current_layer, i > self.current_layer),
        };
        if pre {
            self.pre_cache = None;
        }
        if post {
            self.post_cache = None;
        }
    }

    /// Whether the pre and post passes are cached.
    pub fn has_cached_layers(&self) -> (bool, bool) {
        (self.pre_cache.is_some(), self.post_cache.is_some())
    }

    /// Device-space frame of the first visible camera at the last painted frame.
    pub fn camera_rect(&self) -> Option<Rect> {
        self.camera_rect
    }

    /// Counters since construction.
    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Paint the frame using the cached layer composites where valid.
    #[tracing::instrument(level = "debug", skip_all, fields(layer = self.current_layer, frame = self.frame))]
    pub fn paint(
        &mut self,
        object: &Object,
        buffer: Option<&BitmapImage>,
        canvas: &mut Surface,
    ) -> CelResult<()> {
        check_canvas(canvas)?;
        let size = canvas.size();
        if self.pre_cache.as_ref().is_some_and(|s| s.size() != size)
            || self.post_cache.as_ref().is_some_and(|s| s.size() != size)
        {
            self.reset_cache();
        }
        canvas.clear();

        if let Some(cached) = self.pre_cache.as_ref() {
            canvas.draw_surface(cached, 1.0)?;
            self.stats.cache_hits += 1;
        } else {
            self.render_pre_layers(object, canvas);
            self.pre_cache = Some(canvas.clone());
            self.stats.cache_rebuilds += 1;
        }

        self.render_current_layer(object, buffer, canvas);

        if let Some(cached) = self.post_cache.as_ref() {
            canvas.draw_surface(cached, 1.0)?;
            self.stats.cache_hits += 1;
        } else {
            let mut post = Surface::new(size.0, size.1);
            self.render_post_layers(object, &mut post);
            canvas.draw_surface(&post, 1.0)?;
            self.post_cache = Some(post);
            self.stats.cache_rebuilds += 1;
        }

        self.paint_overlays(object, canvas);
        self.stats.frames_painted += 1;
        Ok(())
    }

    /// Paint every pass directly, neither reading nor filling the caches.
    pub fn paint_uncached(
        &mut self,
        object: &Object,
        buffer: Option<&BitmapImage>,
        canvas: &mut Surface,
    ) -> CelResult<()> {
        check_canvas(canvas)?;
        canvas.clear();
        self.render_pre_layers(object, canvas);
        self.render_current_layer(object, buffer, canvas);
        self.render_post_layers(object, canvas);
        self.paint_overlays(object, canvas);
        self.stats.frames_painted += 1;
        Ok(())
    }

    fn stack_visible(&self, object: &Object) -> bool {
        self.options.layer_visibility != LayerVisibility::CurrentOnly
            || current_is_camera(object, self.current_layer)
    }

    fn render_pre_layers(&mut self, object: &Object, target: &mut Surface) {
        if self.stack_visible(object) {
            self.paint_layers(object, None, target, 0..self.current_layer);
        }
        self.paint_onion_skin(object, target);
    }

    fn render_current_layer(
        &mut self,
        object: &Object,
        buffer: Option<&BitmapImage>,
        target: &mut Surface,
    ) {
        let cur = self.current_layer;
        self.paint_layers(object, buffer, target, cur..cur + 1);
    }

    fn render_post_layers(&mut self, object: &Object, target: &mut Surface) {
        if self.stack_visible(object) {
            let end = object.layer_count();
            self.paint_layers(object, None, target, self.current_layer + 1..end);
        }
        if self.options.axis {
            let items: Vec<FillItem> = overlay::axis_lines()
                .into_iter()
                .map(|(line, color)| FillItem {
                    path: device_stroke(line, self.view, &[]),
                    color,
                })
                .collect();
            self.draw_fills(target, &items);
        }
    }

    fn paint_layers(
        &mut self,
        object: &Object,
        buffer: Option<&BitmapImage>,
        target: &mut Surface,
        range: Range<usize>,
    ) {
        let related = self.options.layer_visibility == LayerVisibility::Related
            && !current_is_camera(object, self.current_layer);
        for i in range {
            let Some(layer) = object.layer(i) else {
                continue;
            };
            if !layer.is_visible() {
                continue;
            }
            let opacity = if related {
                self.options.related_opacity(i, self.current_layer)
            } else {
                1.0
            };
            let draw = FrameDraw {
                frame: self.frame,
                use_last_key: true,
                is_current: i == self.current_layer,
                opacity,
                tint: None,
            };
            self.paint_layer_frame(layer, draw, buffer, target);
        }
    }

    fn paint_onion_skin(&mut self, object: &Object, target: &mut Surface) {
        let Some(layer) = object.layer(self.current_layer) else {
            return;
        };
        for ghost in plan_onion_skin(layer, self.frame, &self.options) {
            let draw = FrameDraw {
                frame: ghost.frame,
                use_last_key: false,
                is_current: false,
                opacity: ghost.opacity,
                tint: ghost.tint(self.frame),
            };
            if self.paint_layer_frame(layer, draw, None, target) {
                self.stats.onion_draws += 1;
            }
        }
    }

    /// Returns whether anything was composited.
    fn paint_layer_frame(
        &mut self,
        layer: &Layer,
        draw: FrameDraw,
        buffer: Option<&BitmapImage>,
        target: &mut Surface,
    ) -> bool {
        let result = match layer.kind() {
            LayerKind::Bitmap => self.paint_bitmap_frame(layer, draw, buffer, target),
            LayerKind::Vector => self.paint_vector_frame(layer, draw, buffer, target),
            LayerKind::Camera | LayerKind::MultiPlaneCamera | LayerKind::Sound => Ok(false),
        };
        match result {
            Ok(drawn) => {
                if drawn {
                    self.stats.layer_draws += 1;
                }
                drawn
            }
            Err(e) => {
                tracing::warn!(layer = layer.name(), frame = draw.frame, error = %e, "layer frame not painted");
                false
            }
        }
    }

    fn paint_bitmap_frame(
        &mut self,
        layer: &Layer,
        draw: FrameDraw,
        buffer: Option<&BitmapImage>,
        target: &mut Surface,
    ) -> CelResult<bool> {
        let Some(image) = frame_key(layer, draw).and_then(KeyFrame::as_bitmap) else {
            return Ok(false);
        };
        let buffer = buffer.filter(|b| draw.is_current && !b.is_empty());
        if image.is_empty() && buffer.is_none() {
            tracing::debug!(layer = layer.name(), frame = draw.frame, "empty bitmap frame skipped");
            self.stats.skipped_empty += 1;
            return Ok(false);
        }

        let mut paint = image.clone();
        let opacity = image.opacity() - (1.0 - draw.opacity);
        if let Some(b) = buffer {
            paint.paste(b, self.options.buffer_blend_mode);
        }
        if let Some(tint) = draw.tint {
            paint.colorize(tint);
        }

        let preview = self
            .selection_preview
            .filter(|_| draw.is_current && draw.frame == self.frame);
        if let Some((selection, _)) = preview {
            paint.clear(selection);
        }

        self.blit_bitmap(&paint, opacity, target)?;

        if let Some((selection, transform)) = preview
            && let Some(source) = layer.last_key_at(self.frame).and_then(KeyFrame::as_bitmap)
        {
            let moved = source.transformed(selection, transform, self.options.antialias);
            moved.draw_onto(target, self.view, opacity, self.options.antialias)?;
        }
        Ok(true)
    }

    /// Blit a world-space bitmap, shrinking it to the view scale first when zoomed out.
    fn blit_bitmap(&self, image: &BitmapImage, opacity: f32, target: &mut Surface) -> CelResult<()> {
        if opacity <= 0.0 {
            return Ok(());
        }
        let scale = affine_scale(self.view);
        if scale >= 1.0 {
            return image.draw_onto(target, self.view, opacity, self.options.antialias);
        }
        let small = image.prescaled(scale)?;
        let (b, s) = (image.bounds(), small.bounds());
        let placement = self.view
            * Affine::translate((f64::from(b.x), f64::from(b.y)))
            * Affine::scale_non_uniform(
                f64::from(b.width) / f64::from(s.width),
                f64::from(b.height) / f64::from(s.height),
            );
        target.draw_pixels(
            small.pixels(),
            s.width,
            s.height,
            placement,
            opacity,
            BlendMode::SourceOver,
            true,
        )
    }

    fn paint_vector_frame(
        &mut self,
        layer: &Layer,
        draw: FrameDraw,
        buffer: Option<&BitmapImage>,
        target: &mut Surface,
    ) -> CelResult<bool> {
        let Some(image) = frame_key(layer, draw).and_then(KeyFrame::as_vector) else {
            return Ok(false);
        };
        let buffer = buffer.filter(|b| draw.is_current && !b.is_empty());
        if image.is_empty() && buffer.is_none() {
            tracing::debug!(layer = layer.name(), frame = draw.frame, "empty vector frame skipped");
            self.stats.skipped_empty += 1;
            return Ok(false);
        }

        let (w, h) = target.size();
        let o = &self.options;
        let mut strokes = image.output_image(w, h, self.view, o.outlines, o.thin_lines, o.antialias)?;
        if let Some(tint) = draw.tint {
            strokes.colorize(tint);
        }
        if let Some(b) = buffer {
            let bounds = b.bounds();
            let placement =
                self.view * Affine::translate((f64::from(bounds.x), f64::from(bounds.y)));
            strokes.draw_pixels(
                b.pixels(),
                bounds.width,
                bounds.height,
                placement,
                b.opacity(),
                o.buffer_blend_mode,
                o.antialias,
            )?;
        }
        let opacity = image.opacity() - (1.0 - draw.opacity);
        if opacity > 0.0 {
            target.draw_surface(&strokes, opacity)?;
        }
        Ok(true)
    }

    fn paint_overlays(&mut self, object: &Object, canvas: &mut Surface) {
        let (w, h) = canvas.size();
        if self.options.grid {
            let visible = self
                .view_inverse
                .transform_rect_bbox(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
            let items: Vec<FillItem> =
                overlay::grid_lines(visible, self.options.grid_width, self.options.grid_height)
                    .into_iter()
                    .map(|line| FillItem {
                        path: device_stroke(line, self.view, &[]),
                        color: overlay::GRID_COLOR,
                    })
                    .collect();
            self.draw_fills(canvas, &items);
        }

        self.camera_rect = None;
        let Some(camera) = object
            .first_visible_camera()
            .and_then(|i| object.layer(i))
        else {
            return;
        };
        let Some(rig) = camera.rig() else {
            return;
        };
        let frame_poly = overlay::camera_frame(camera.view_at_frame(self.frame), rig.view_rect());
        let device: Vec<_> = frame_poly.iter().map(|p| self.view * *p).collect();
        self.camera_rect = device
            .iter()
            .map(|p| Rect::from_points(*p, *p))
            .reduce(|a, b| a.union(b));

        if !self.options.guides.any() {
            return;
        }
        let paths: Vec<BezPath> = overlay::guide_lines(&frame_poly, &self.options.guides)
            .into_iter()
            .map(|line| device_stroke(line, self.view, &overlay::GUIDE_DASHES))
            .collect();
        let inverted = raster::coverage_mask(w, h, paths)
            .and_then(|mask| canvas.invert_under_mask(&mask));
        if let Err(e) = inverted {
            tracing::warn!(error = %e, "camera guides not painted");
        }
    }

    fn draw_fills(&self, target: &mut Surface, items: &[FillItem]) {
        let (w, h) = target.size();
        let drawn = raster::fill_paths(w, h, items).and_then(|s| target.draw_surface(&s, 1.0));
        if let Err(e) = drawn {
            tracing::warn!(error = %e, "overlay not painted");
        }
    }
}

fn frame_key(layer: &Layer, draw: FrameDraw) -> Option<&KeyFrame> {
    if draw.use_last_key {
        layer.last_key_at(draw.frame)
    } else {
        layer.key_at(draw.frame)
    }
}

fn current_is_camera(object: &Object, current: usize) -> bool {
    object
        .layer(current)
        .is_some_and(|l| l.kind().is_camera())
}

/// One-pixel (cosmetic) outline of a world-space line mapped to device space.
fn device_stroke(line: Line, view: Affine, dashes: &[f64]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(view * line.p0);
    path.line_to(view * line.p1);
    raster::stroke_to_fill(&path, 1.0, dashes)
}

fn check_canvas(canvas: &Surface) -> CelResult<()> {
    let max = u32::from(u16::MAX);
    if canvas.width > max || canvas.height > max {
        return Err(CelError::render(format!(
            "canvas {}x{} exceeds {max}x{max}",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
