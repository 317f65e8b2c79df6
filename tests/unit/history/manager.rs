use std::path::{Path, PathBuf};

use super::*;
use crate::foundation::core::{PixelRect, Rect};
use crate::foundation::error::{CelError, CelResult};
use crate::imaging::BitmapImage;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

#[derive(Default)]
struct FakeLoader {
    fail: bool,
    loaded: Vec<PathBuf>,
}

impl SoundLoader for FakeLoader {
    fn load(&mut self, clip: &mut SoundClip, path: &Path) -> CelResult<()> {
        self.loaded.push(path.to_path_buf());
        if self.fail {
            return Err(CelError::Other(anyhow::anyhow!("decoder unavailable")));
        }
        clip.set_file_name(path);
        clip.set_frame_length(4);
        Ok(())
    }
}

struct Fixture {
    object: Object,
    selection: Selection,
    loader: FakeLoader,
}

impl Fixture {
    fn with_bitmap_layers(count: usize) -> Self {
        let mut object = Object::new();
        for i in 0..count {
            let idx = object.add_new_layer(LayerKind::Bitmap, format!("ink {i}"));
            let image = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
            assert!(
                object
                    .layer_mut(idx)
                    .unwrap()
                    .insert_key(KeyFrame::new(1, KeyContent::Bitmap(image)))
            );
        }
        Self {
            object,
            selection: Selection::new(),
            loader: FakeLoader::default(),
        }
    }

    fn ctx(&mut self, layer: usize, frame: u32) -> HistoryContext<'_> {
        HistoryContext {
            object: &mut self.object,
            selection: &mut self.selection,
            sound_loader: &mut self.loader,
            current_layer: layer,
            current_frame: frame,
            last_modified: None,
        }
    }

    fn bitmap(&self, layer: usize, frame: u32) -> &BitmapImage {
        self.object
            .layer(layer)
            .unwrap()
            .key_at(frame)
            .unwrap()
            .as_bitmap()
            .unwrap()
    }

    fn paint_green(&mut self, layer: usize, frame: u32) {
        self.object
            .layer_mut(layer)
            .unwrap()
            .key_at_mut(frame)
            .unwrap()
            .as_bitmap_mut()
            .unwrap()
            .fill_rect(PixelRect::new(0, 0, 1, 1), GREEN);
    }
}

#[test]
fn undo_restores_the_backed_up_content() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let before = fx.bitmap(0, 1).clone();
    let mut history = History::default();

    history.backup(&mut fx.ctx(0, 1), "Stroke");
    fx.paint_green(0, 1);
    assert_ne!(fx.bitmap(0, 1), &before);

    let restored = history.undo(&mut fx.ctx(0, 1));
    assert_eq!(restored, Some(Restored { layer: 0, frame: 1 }));
    assert_eq!(fx.bitmap(0, 1), &before);
    assert_eq!(history.labels(), vec!["Stroke", NOOP_LABEL]);
    assert_eq!(history.index(), None);
    assert!(!history.can_undo());
}

#[test]
fn redo_after_undo_brings_the_edit_back() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();

    history.backup(&mut fx.ctx(0, 1), "Stroke");
    fx.paint_green(0, 1);
    let edited = fx.bitmap(0, 1).clone();

    history.undo(&mut fx.ctx(0, 1));
    assert!(history.can_redo());
    let restored = history.redo(&mut fx.ctx(0, 1));
    assert_eq!(restored, Some(Restored { layer: 0, frame: 1 }));
    assert_eq!(fx.bitmap(0, 1), &edited);
    assert!(!history.can_redo());
    assert_eq!(history.redo(&mut fx.ctx(0, 1)), None);
}

#[test]
fn undo_on_empty_history_is_noop() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();
    assert_eq!(history.undo(&mut fx.ctx(0, 1)), None);
    assert!(history.is_empty());
}

#[test]
fn capacity_evicts_oldest() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();
    for i in 0..25 {
        history.backup(&mut fx.ctx(0, 1), &format!("edit {i}"));
    }
    assert_eq!(history.len(), 20);
    assert_eq!(history.index(), Some(19));
    assert_eq!(history.labels().first(), Some(&"edit 5"));
    assert_eq!(history.current_backup().unwrap().label, "edit 24");
}

#[test]
fn new_backup_discards_redo_branch() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();

    history.backup(&mut fx.ctx(0, 1), "A");
    fx.paint_green(0, 1);
    history.undo(&mut fx.ctx(0, 1));
    assert_eq!(history.len(), 2);

    history.backup(&mut fx.ctx(0, 1), "B");
    assert_eq!(history.labels(), vec!["B"]);
    assert_eq!(history.index(), Some(0));
    assert!(!history.can_redo());
}

#[test]
fn backup_covers_last_modified_and_current_position() {
    let mut fx = Fixture::with_bitmap_layers(2);
    let mut history = History::default();

    let mut ctx = fx.ctx(1, 1);
    ctx.last_modified = Some((0, 3));
    history.backup(&mut ctx, "Move");

    let spots: Vec<(usize, u32)> = history.elements().iter().map(|e| (e.layer, e.frame)).collect();
    // Frame 3 of layer 0 is held from the key at 1.
    assert_eq!(spots, vec![(0, 1), (1, 1)]);

    let mut ctx = fx.ctx(1, 1);
    ctx.last_modified = Some((1, 1));
    history.backup(&mut ctx, "Again");
    assert_eq!(history.len(), 3);
}

#[test]
fn backup_at_missing_layer_captures_nothing() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();
    assert!(!history.backup_at(&mut fx.ctx(0, 1), 7, 1, "Ghost"));
    assert!(history.is_empty());
    assert!(!history.backup_at(&mut fx.ctx(0, 1), 0, 0, "Before first key"));
}

#[test]
fn selection_state_travels_with_the_backup() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::default();
    let selected = Rect::new(0.0, 0.0, 2.0, 2.0);

    fx.selection.set_selection(selected);
    history.backup(&mut fx.ctx(0, 1), "Clear");
    fx.selection.clear();

    history.undo(&mut fx.ctx(0, 1));
    assert!(fx.selection.something_selected());
    assert_eq!(fx.selection.selection_rect(), selected);
}

#[test]
fn undo_selects_restored_vector_content() {
    let mut fx = Fixture::with_bitmap_layers(0);
    let idx = fx.object.add_new_layer(LayerKind::Vector, "lines");
    let mut image = crate::imaging::VectorImage::new();
    image.add_curve(crate::imaging::Curve::filled(
        kurbo::Shape::to_path(&Rect::new(1.0, 1.0, 4.0, 5.0), 0.1),
        RED,
    ));
    image.select_all();
    assert!(
        fx.object
            .layer_mut(idx)
            .unwrap()
            .insert_key(KeyFrame::new(1, KeyContent::Vector(image)))
    );
    let mut history = History::default();

    history.backup(&mut fx.ctx(idx, 1), "Delete");
    fx.object
        .layer_mut(idx)
        .unwrap()
        .key_at_mut(1)
        .unwrap()
        .as_vector_mut()
        .unwrap()
        .delete_selection();

    history.undo(&mut fx.ctx(idx, 1));
    let layer = fx.object.layer(idx).unwrap();
    assert_eq!(layer.key_at(1).unwrap().as_vector().unwrap().curves().len(), 1);
    assert_eq!(fx.selection.selection_rect(), Rect::new(1.0, 1.0, 4.0, 5.0));
}

#[test]
fn sanitize_drops_deleted_layer_and_renumbers() {
    let mut fx = Fixture::with_bitmap_layers(4);
    let mut history = History::default();
    for layer in 1..=3 {
        assert!(history.backup_at(&mut fx.ctx(layer, 1), layer, 1, "edit"));
    }
    assert_eq!(history.index(), Some(2));

    history.sanitize_after_layer_deletion(2);
    let layers: Vec<usize> = history.elements().iter().map(|e| e.layer).collect();
    assert_eq!(layers, vec![1, 2]);
    assert_eq!(history.index(), Some(1));
}

#[test]
fn sanitize_above_cursor_keeps_index() {
    let mut fx = Fixture::with_bitmap_layers(3);
    let mut history = History::default();
    assert!(history.backup_at(&mut fx.ctx(0, 1), 0, 1, "a"));
    assert!(history.backup_at(&mut fx.ctx(0, 1), 1, 1, "b"));
    assert!(history.backup_at(&mut fx.ctx(0, 1), 2, 1, "c"));
    history.undo(&mut fx.ctx(0, 1));
    let index = history.index();

    history.sanitize_after_layer_deletion(2);
    assert_eq!(history.index(), index);
    assert!(history.elements().iter().all(|e| e.layer < 2));
}

#[test]
fn swap_remaps_layer_indices() {
    let mut fx = Fixture::with_bitmap_layers(3);
    let mut history = History::default();
    assert!(history.backup_at(&mut fx.ctx(0, 1), 0, 1, "a"));
    assert!(history.backup_at(&mut fx.ctx(0, 1), 2, 1, "b"));
    history.remap_swapped_layers(0, 2);
    let layers: Vec<usize> = history.elements().iter().map(|e| e.layer).collect();
    assert_eq!(layers, vec![2, 0]);
}

#[test]
fn autosave_flag_raised_every_interval() {
    let mut fx = Fixture::with_bitmap_layers(1);
    let mut history = History::new(HistoryOptions {
        capacity: 10,
        autosave: true,
        autosave_interval: 3,
    });
    history.backup(&mut fx.ctx(0, 1), "1");
    history.backup(&mut fx.ctx(0, 1), "2");
    assert!(!history.take_needs_save());
    history.backup(&mut fx.ctx(0, 1), "3");
    assert!(history.take_needs_save());
    assert!(!history.take_needs_save());

    let mut quiet = History::new(HistoryOptions {
        autosave: false,
        ..HistoryOptions::default()
    });
    for _ in 0..30 {
        quiet.backup(&mut fx.ctx(0, 1), "edit");
    }
    assert!(!quiet.take_needs_save());
}

fn sound_fixture() -> (Fixture, usize) {
    let mut fx = Fixture::with_bitmap_layers(0);
    let idx = fx.object.add_new_layer(LayerKind::Sound, "voice");
    let mut clip = SoundClip::new();
    clip.set_file_name("/tmp/line.wav");
    clip.set_display_name("Line 1");
    clip.set_frame_length(4);
    assert!(
        fx.object
            .layer_mut(idx)
            .unwrap()
            .insert_key(KeyFrame::new(5, KeyContent::Sound(clip)))
    );
    (fx, idx)
}

#[test]
fn sound_backup_uses_the_covering_key() {
    let (mut fx, idx) = sound_fixture();
    let mut history = History::default();
    let mut ctx = fx.ctx(idx, 7);
    ctx.last_modified = Some((idx, 7));
    history.backup(&mut ctx, "Sound");

    let element = history.current_backup().unwrap();
    assert_eq!(element.frame, 5);
    assert_eq!(
        element.content,
        BackupContent::Sound {
            file_name: Some(PathBuf::from("/tmp/line.wav")),
            display_name: "Line 1".into(),
        }
    );
}

#[test]
fn sound_restore_reloads_removed_clip() {
    let (mut fx, idx) = sound_fixture();
    let mut history = History::default();
    assert!(history.backup_at(&mut fx.ctx(idx, 5), idx, 5, "Remove frame"));
    fx.object.layer_mut(idx).unwrap().remove_key(5);

    history.restore(&mut fx.ctx(idx, 5), 0);
    let key = fx.object.layer(idx).unwrap().key_at(5).unwrap();
    let clip = key.as_sound().unwrap();
    assert_eq!(clip.display_name(), "Line 1");
    assert_eq!(clip.frame_length(), 4);
    assert_eq!(fx.loader.loaded, vec![PathBuf::from("/tmp/line.wav")]);

    // Present keys are left alone.
    history.restore(&mut fx.ctx(idx, 5), 0);
    assert_eq!(fx.loader.loaded.len(), 1);
}

#[test]
fn failed_sound_reload_leaves_no_key() {
    let (mut fx, idx) = sound_fixture();
    let mut history = History::default();
    assert!(history.backup_at(&mut fx.ctx(idx, 5), idx, 5, "Remove frame"));
    fx.object.layer_mut(idx).unwrap().remove_key(5);
    fx.loader.fail = true;

    history.restore(&mut fx.ctx(idx, 5), 0);
    assert!(!fx.object.layer(idx).unwrap().key_exists(5));
}

#[test]
fn camera_layers_are_not_backed_up() {
    let mut fx = Fixture::with_bitmap_layers(0);
    let idx = fx.object.add_new_layer(LayerKind::Camera, "cam");
    assert!(fx.object.layer_mut(idx).unwrap().add_new_key_at(1));
    let mut history = History::default();
    assert!(!history.backup_at(&mut fx.ctx(idx, 1), idx, 1, "Camera"));
}

#[test]
fn history_options_validation() {
    assert!(HistoryOptions::default().validate().is_ok());
    let err = HistoryOptions::from_reader(r#"{"capacity": 1}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
    let err = HistoryOptions::from_reader(r#"{"autosave_interval": 0}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("autosave"));
    let opts = HistoryOptions::from_reader(r#"{"capacity": 50}"#.as_bytes()).unwrap();
    assert_eq!(opts.capacity, 50);
    assert!(opts.autosave);
}
