use crate::imaging::{BitmapImage, VectorImage};

/// What the last copy put on the clipboard.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipboardContent {
    /// Copied pixels in world space.
    Bitmap(BitmapImage),
    /// Copied curves.
    Vector(VectorImage),
}

/// Session-owned clipboard. Copy overwrites, paste leaves the content in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    /// Empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been copied.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Whatever was copied last.
    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    /// Replace the clipboard content.
    pub fn set(&mut self, content: ClipboardContent) {
        self.content = Some(content);
    }

    /// The copied bitmap, if the last copy was one.
    pub fn bitmap(&self) -> Option<&BitmapImage> {
        match &self.content {
            Some(ClipboardContent::Bitmap(b)) => Some(b),
            _ => None,
        }
    }

    /// The copied vector image, if the last copy was one.
    pub fn vector(&self) -> Option<&VectorImage> {
        match &self.content {
            Some(ClipboardContent::Vector(v)) => Some(v),
            _ => None,
        }
    }

    /// Forget the copied content.
    pub fn clear(&mut self) {
        self.content = None;
    }
}
