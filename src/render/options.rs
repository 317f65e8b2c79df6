use std::{fs::File, io::Read, path::Path};

use crate::foundation::error::{CelError, CelResult};
use crate::imaging::BlendMode;

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// How layers other than the current one are composited.
pub enum LayerVisibility {
    /// Every visible layer at full opacity.
    #[default]
    All,
    /// Only the current layer (camera layers still show the whole stack).
    CurrentOnly,
    /// Opacity falls off with distance from the current layer.
    Related,
}

impl LayerVisibility {
    /// Next mode in the toolbar cycle `CurrentOnly -> Related -> All`.
    pub fn next(self) -> Self {
        match self {
            Self::CurrentOnly => Self::Related,
            Self::Related => Self::All,
            Self::All => Self::CurrentOnly,
        }
    }

    /// Previous mode in the toolbar cycle.
    pub fn prev(self) -> Self {
        match self {
            Self::CurrentOnly => Self::All,
            Self::Related => Self::CurrentOnly,
            Self::All => Self::Related,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Stepping used by the onion skin walk.
pub enum OnionStep {
    /// Jump from keyframe to keyframe.
    #[default]
    Keyframes,
    /// Step one frame at a time.
    Frames,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Camera guides drawn over the first visible camera's frame.
pub struct OverlayGuides {
    /// Centre cross.
    pub center: bool,
    /// Rule-of-thirds lines.
    pub thirds: bool,
    /// Golden-ratio lines.
    pub golden_ratio: bool,
    /// Safe-area rectangles.
    pub safe_areas: bool,
    /// Draw the action-safe rectangle with the safe areas.
    pub action_safe: bool,
    /// Draw the title-safe rectangle with the safe areas.
    pub title_safe: bool,
    /// One-point perspective rays from the frame centre.
    pub perspective: bool,
    /// Action-safe margin, percent of the frame.
    pub action_safe_pct: u32,
    /// Title-safe margin, percent of the frame.
    pub title_safe_pct: u32,
}

impl Default for OverlayGuides {
    fn default() -> Self {
        Self {
            center: false,
            thirds: false,
            golden_ratio: false,
            safe_areas: false,
            action_safe: true,
            title_safe: true,
            perspective: false,
            action_safe_pct: 5,
            title_safe_pct: 10,
        }
    }
}

impl OverlayGuides {
    /// True when at least one guide is switched on.
    pub fn any(&self) -> bool {
        self.center || self.thirds || self.golden_ratio || self.safe_areas || self.perspective
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Inputs of one paint pass. The painter never mutates them.
pub struct RenderOptions {
    /// Compositing mode for the other layers.
    pub layer_visibility: LayerVisibility,
    /// Base of the related-visibility falloff, in `(0, 1)`.
    pub layer_visibility_threshold: f32,

    /// Draw frames before the current one.
    pub onion_prev: bool,
    /// Draw frames after the current one.
    pub onion_next: bool,
    /// Number of previous onion frames.
    pub onion_prev_count: u32,
    /// Number of next onion frames.
    pub onion_next_count: u32,
    /// Opacity of the farthest onion frame.
    pub onion_min_opacity: f32,
    /// Opacity of the nearest onion frame.
    pub onion_max_opacity: f32,
    /// Tint previous frames red.
    pub onion_colorize_prev: bool,
    /// Tint next frames blue.
    pub onion_colorize_next: bool,
    /// Walk by keys or by frames.
    pub onion_step: OnionStep,
    /// Keep drawing onion frames while the animation plays.
    pub onion_while_playback: bool,
    /// Playback is running.
    pub is_playing: bool,

    /// Draw the grid.
    pub grid: bool,
    /// Grid cell width in world units.
    pub grid_width: u32,
    /// Grid cell height in world units.
    pub grid_height: u32,
    /// Camera guides.
    pub guides: OverlayGuides,
    /// Draw the world axes.
    pub axis: bool,

    /// How the live edit buffer is merged onto the current frame.
    pub buffer_blend_mode: BlendMode,
    /// Smooth sampling and antialiased bitmap edges.
    pub antialias: bool,
    /// Draw vector curves as hairline outlines.
    pub outlines: bool,
    /// Draw vector strokes one device pixel wide.
    pub thin_lines: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layer_visibility: LayerVisibility::All,
            layer_visibility_threshold: 0.5,
            onion_prev: true,
            onion_next: false,
            onion_prev_count: 3,
            onion_next_count: 3,
            onion_min_opacity: 0.1,
            onion_max_opacity: 0.5,
            onion_colorize_prev: false,
            onion_colorize_next: false,
            onion_step: OnionStep::Keyframes,
            onion_while_playback: false,
            is_playing: false,
            grid: false,
            grid_width: 100,
            grid_height: 100,
            guides: OverlayGuides::default(),
            axis: false,
            buffer_blend_mode: BlendMode::SourceOver,
            antialias: true,
            outlines: false,
            thin_lines: false,
        }
    }
}

impl RenderOptions {
    /// Reject out-of-range opacities, thresholds and grid sizes.
    pub fn validate(&self) -> CelResult<()> {
        let t = self.layer_visibility_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(CelError::config(format!(
                "layer_visibility_threshold must be in (0, 1), got {t}"
            )));
        }
        for (name, v) in [
            ("onion_min_opacity", self.onion_min_opacity),
            ("onion_max_opacity", self.onion_max_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CelError::config(format!("{name} must be in [0, 1], got {v}")));
            }
        }
        if self.onion_min_opacity > self.onion_max_opacity {
            return Err(CelError::config(
                "onion_min_opacity must not exceed onion_max_opacity",
            ));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(CelError::config("grid size must be non-zero"));
        }
        if self.guides.action_safe_pct > 100 || self.guides.title_safe_pct > 100 {
            return Err(CelError::config("safe area percentages must be <= 100"));
        }
        Ok(())
    }

    /// Parse and validate options from JSON.
    pub fn from_reader(reader: impl Read) -> CelResult<Self> {
        let opts: Self = serde_json::from_reader(reader)
            .map_err(|e| CelError::config(format!("parse render options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Load from a JSON file. Config errors are prefixed with the path.
    pub fn from_path(path: impl AsRef<Path>) -> CelResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CelError::config(format!("open '{}': {e}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(file)).map_err(|e| match e {
            CelError::Config(msg) => CelError::config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Whether the onion skin should be drawn at all this pass.
    pub fn onion_enabled(&self) -> bool {
        (self.onion_prev || self.onion_next) && (!self.is_playing || self.onion_while_playback)
    }

    /// Opacity of layer `index` under the related falloff, relative to `current`.
    pub fn related_opacity(&self, index: usize, current: usize) -> f32 {
        let distance = index.abs_diff(current);
        if distance == 0 {
            return 1.0;
        }
        let exp = i32::try_from(distance).unwrap_or(i32::MAX);
        self.layer_visibility_threshold.powi(exp)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/options.rs"]
mod tests;
