use std::path::Path;

use crate::imaging::{BitmapImage, VectorImage};
use crate::model::camera::Camera;
use crate::model::layer::LayerKind;
use crate::model::sound::SoundClip;

/// Content anchored at a keyframe.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyContent {
    /// Raster drawing.
    Bitmap(BitmapImage),
    /// Curves.
    Vector(VectorImage),
    /// Camera transform.
    Camera(Camera),
    /// Audio clip reference.
    Sound(SoundClip),
}

impl KeyContent {
    /// Fresh empty content for a layer of `kind`.
    pub fn empty_for(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Bitmap => Self::Bitmap(BitmapImage::new()),
            LayerKind::Vector => Self::Vector(VectorImage::new()),
            LayerKind::Camera | LayerKind::MultiPlaneCamera => Self::Camera(Camera::default()),
            LayerKind::Sound => Self::Sound(SoundClip::new()),
        }
    }

    /// Whether this content may live on a layer of `kind`.
    pub fn fits(&self, kind: LayerKind) -> bool {
        matches!(
            (self, kind),
            (Self::Bitmap(_), LayerKind::Bitmap)
                | (Self::Vector(_), LayerKind::Vector)
                | (
                    Self::Camera(_),
                    LayerKind::Camera | LayerKind::MultiPlaneCamera
                )
                | (Self::Sound(_), LayerKind::Sound)
        )
    }
}

/// Content at one timeline position, with a modified flag for saving.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFrame {
    pos: u32,
    content: KeyContent,
    modified: bool,
}

impl KeyFrame {
    /// Unmodified key at `pos`.
    pub fn new(pos: u32, content: KeyContent) -> Self {
        Self {
            pos,
            content,
            modified: false,
        }
    }

    /// Timeline position, starting at 1.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Frames covered by this key starting at `pos`. Only sound clips span more than one.
    pub fn length(&self) -> u32 {
        match &self.content {
            KeyContent::Sound(clip) => clip.frame_length(),
            _ => 1,
        }
    }

    /// The key content.
    pub fn content(&self) -> &KeyContent {
        &self.content
    }

    /// Mutable content; marks the key as modified.
    pub fn content_mut(&mut self) -> &mut KeyContent {
        self.modified = true;
        &mut self.content
    }

    /// Replace the content and mark the key modified.
    pub fn set_content(&mut self, content: KeyContent) {
        self.content = content;
        self.modified = true;
    }

    /// Whether the content changed since the flag was last cleared.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set the modified flag.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Content-identical copy placed at `pos`.
    pub fn clone_at(&self, pos: u32) -> Self {
        Self {
            pos,
            content: self.content.clone(),
            modified: true,
        }
    }

    /// Audio file of a sound key.
    pub fn file_name(&self) -> Option<&Path> {
        match &self.content {
            KeyContent::Sound(clip) => clip.file_name(),
            _ => None,
        }
    }

    /// Bitmap content, if this is a bitmap key.
    pub fn as_bitmap(&self) -> Option<&BitmapImage> {
        match &self.content {
            KeyContent::Bitmap(b) => Some(b),
            _ => None,
        }
    }

    /// Mutable bitmap content. Marks the key modified.
    pub fn as_bitmap_mut(&mut self) -> Option<&mut BitmapImage> {
        self.modified = true;
        match &mut self.content {
            KeyContent::Bitmap(b) => Some(b),
            _ => None,
        }
    }

    /// Vector content, if this is a vector key.
    pub fn as_vector(&self) -> Option<&VectorImage> {
        match &self.content {
            KeyContent::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable vector content. Marks the key modified.
    pub fn as_vector_mut(&mut self) -> Option<&mut VectorImage> {
        self.modified = true;
        match &mut self.content {
            KeyContent::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Camera content, if this is a camera key.
    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.content {
            KeyContent::Camera(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable camera content. Marks the key modified.
    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        self.modified = true;
        match &mut self.content {
            KeyContent::Camera(c) => Some(c),
            _ => None,
        }
    }

    /// Sound content, if this is a sound key.
    pub fn as_sound(&self) -> Option<&SoundClip> {
        match &self.content {
            KeyContent::Sound(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable sound content. Marks the key modified.
    pub fn as_sound_mut(&mut self) -> Option<&mut SoundClip> {
        self.modified = true;
        match &mut self.content {
            KeyContent::Sound(s) => Some(s),
            _ => None,
        }
    }
}
