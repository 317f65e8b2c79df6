use smallvec::SmallVec;

use crate::model::layer::Layer;
use crate::render::options::{OnionStep, RenderOptions};

/// Which side of the current frame an onion frame sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnionDirection {
    /// Before the current frame.
    Prev,
    /// After the current frame.
    Next,
}

/// One ghost frame to draw under the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnionFrame {
    /// Frame to draw.
    pub frame: u32,
    /// Opacity the frame is drawn at.
    pub opacity: f32,
    /// Side of the current frame.
    pub direction: OnionDirection,
    /// Tint with the direction colour.
    pub colorize: bool,
}

impl OnionFrame {
    /// Source-in tint colour: red before the current frame, blue after it, none on it.
    pub fn tint(&self, current_frame: u32) -> Option<[u8; 4]> {
        if !self.colorize {
            return None;
        }
        match self.frame.cmp(&current_frame) {
            std::cmp::Ordering::Less => Some([255, 0, 0, 255]),
            std::cmp::Ordering::Greater => Some([0, 0, 255, 255]),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Onion frames of one layer in drawing order.
pub type OnionPlan = SmallVec<[OnionFrame; 8]>;

/// Ghost frames of `layer` around `frame`, previous ones first, nearest first in each direction.
///
/// Empty while playing (unless configured), for hidden or keyless layers and for layer kinds
/// that have no pixels.
pub fn plan_onion_skin(layer: &Layer, frame: u32, opts: &RenderOptions) -> OnionPlan {
    let mut plan = OnionPlan::new();
    if !opts.onion_enabled()
        || !layer.is_visible()
        || layer.key_count() == 0
        || !layer.kind().is_drawable()
    {
        return plan;
    }
    let by_keys = opts.onion_step == OnionStep::Keyframes;
    let (min, max) = (opts.onion_min_opacity, opts.onion_max_opacity);

    if opts.onion_prev && frame > 1 && opts.onion_prev_count > 0 {
        let step = (max - min) / opts.onion_prev_count as f32;
        // By keys, the walk starts from the key holding the current frame.
        let start = if by_keys {
            layer.last_key_at(frame).map(|k| k.pos())
        } else {
            Some(frame)
        };
        let mut onion = start.and_then(|f| layer.previous_frame_number(f, by_keys));
        let mut opacity = max;
        for _ in 0..opts.onion_prev_count {
            let Some(f) = onion else { break };
            plan.push(OnionFrame {
                frame: f,
                opacity,
                direction: OnionDirection::Prev,
                colorize: opts.onion_colorize_prev,
            });
            opacity -= step;
            onion = layer.previous_frame_number(f, by_keys);
        }
    }

    if opts.onion_next && opts.onion_next_count > 0 {
        let step = (max - min) / opts.onion_next_count as f32;
        let mut onion = layer.next_frame_number(frame, by_keys);
        let mut opacity = max;
        for _ in 0..opts.onion_next_count {
            let Some(f) = onion else { break };
            plan.push(OnionFrame {
                frame: f,
                opacity,
                direction: OnionDirection::Next,
                colorize: opts.onion_colorize_next,
            });
            opacity -= step;
            onion = layer.next_frame_number(f, by_keys);
        }
    }

    tracing::debug!(frame, ghosts = plan.len(), "onion skin planned");
    plan
}

#[cfg(test)]
#[path = "../../tests/unit/render/onion.rs"]
mod tests;
