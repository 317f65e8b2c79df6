use crate::model::layer::{Layer, LayerKind};

/// A project: the ordered layer stack, bottom layer first.
#[derive(Clone, Debug, Default)]
pub struct Object {
    layers: Vec<Layer>,
}

impl Object {
    /// Document without layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer at `index`, if any.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable layer at `index`, if any.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Two distinct layers borrowed mutably at once.
    pub fn layer_pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Layer, &mut Layer)> {
        if a == b || a >= self.layers.len() || b >= self.layers.len() {
            return None;
        }
        if a < b {
            let (lo, hi) = self.layers.split_at_mut(b);
            Some((&mut lo[a], &mut hi[0]))
        } else {
            let (lo, hi) = self.layers.split_at_mut(a);
            Some((&mut hi[0], &mut lo[b]))
        }
    }

    /// Append a layer on top and return its index.
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    /// Append an empty layer of `kind` and return its index.
    pub fn add_new_layer(&mut self, kind: LayerKind, name: impl Into<String>) -> usize {
        self.add_layer(Layer::new(kind, name))
    }

    /// Remove and return the layer at `index`.
    pub fn delete_layer(&mut self, index: usize) -> Option<Layer> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    /// Swap two layers. Returns `false` when either index is out of range.
    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        if a >= self.layers.len() || b >= self.layers.len() {
            return false;
        }
        self.layers.swap(a, b);
        true
    }

    /// Index of the first layer named `name`.
    pub fn find_layer_by_name(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }

    /// Index of the lowest visible camera layer.
    pub fn first_visible_camera(&self) -> Option<usize> {
        self.layers
            .iter()
            .position(|l| l.kind().is_camera() && l.is_visible())
    }

    /// Last frame holding content on any layer.
    pub fn animation_length(&self) -> u32 {
        self.layers
            .iter()
            .map(Layer::animation_end)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/object.rs"]
mod tests;
