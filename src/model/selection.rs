use crate::foundation::core::{Affine, Rect};

/// Selection geometry captured with every bitmap/vector backup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionState {
    /// Whether anything is selected.
    pub something_selected: bool,
    /// Rectangle originally selected, in world space.
    pub selection: Rect,
    /// Last committed transformed rectangle.
    pub transformed: Rect,
    /// Rectangle being dragged during an uncommitted transform.
    pub temp_transformed: Rect,
    /// Pending rotation in degrees.
    pub rotation: f64,
    /// Pending selection transform in world space.
    pub transform: Affine,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            something_selected: false,
            selection: Rect::ZERO,
            transformed: Rect::ZERO,
            temp_transformed: Rect::ZERO,
            rotation: 0.0,
            transform: Affine::IDENTITY,
        }
    }
}

/// Live selection of the editing session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    state: SelectionState,
}

impl Selection {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the full selection state.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Replace the whole state, as undo does.
    pub fn restore_state(&mut self, state: SelectionState) {
        self.state = state;
    }

    /// Whether anything is selected.
    pub fn something_selected(&self) -> bool {
        self.state.something_selected
    }

    /// Selected rectangle in world space.
    pub fn selection_rect(&self) -> Rect {
        self.state.selection
    }

    /// Pending transform of the selection.
    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    /// Select `rect`; an empty rect clears the selection.
    pub fn set_selection(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.state = SelectionState {
            something_selected: rect.width() > 0.0 && rect.height() > 0.0,
            selection: rect,
            transformed: rect,
            temp_transformed: rect,
            rotation: 0.0,
            transform: Affine::IDENTITY,
        };
    }

    /// Rectangle being dragged. Recomputes the pending transform.
    pub fn set_temp_transformed(&mut self, rect: Rect) {
        self.state.temp_transformed = rect;
        self.calculate_selection_transform();
    }

    /// Pending rotation in degrees. Recomputes the pending transform.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.state.rotation = degrees;
        self.calculate_selection_transform();
    }

    /// True while a move/scale/rotate of the selection is pending.
    pub fn is_transforming(&self) -> bool {
        self.state.something_selected && self.state.transform != Affine::IDENTITY
    }

    /// Map the original selection onto the temporary rectangle: centre to centre, scaled by the
    /// size ratio and rotated about the new centre.
    pub fn calculate_selection_transform(&mut self) {
        let s = self.state;
        let mut t = Affine::translate(s.temp_transformed.center().to_vec2())
            * Affine::rotate(s.rotation.to_radians());
        if s.selection.width() > 0.0 && s.selection.height() > 0.0 {
            t *= Affine::scale_non_uniform(
                s.temp_transformed.width() / s.selection.width(),
                s.temp_transformed.height() / s.selection.height(),
            );
        }
        self.state.transform = t * Affine::translate(-s.selection.center().to_vec2());
    }

    /// Drop the pending transform matrix only.
    pub fn reset_selection_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    /// Drop any pending transform, snapping the rectangles back to the selection.
    pub fn cancel_transform(&mut self) {
        let sel = self.state.selection;
        self.state.transformed = sel;
        self.state.temp_transformed = sel;
        self.state.rotation = 0.0;
        self.state.transform = Affine::IDENTITY;
    }

    /// Commit the pending transform: the transformed rectangle becomes the selection.
    pub fn commit_transform(&mut self) {
        let rect = self.state.temp_transformed;
        self.set_selection(rect);
    }

    /// Select nothing.
    pub fn clear(&mut self) {
        self.state = SelectionState::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/selection.rs"]
mod tests;
