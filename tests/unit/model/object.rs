use super::*;
use crate::model::keyframe::{KeyContent, KeyFrame};
use crate::model::sound::SoundClip;

fn sample() -> Object {
    let mut obj = Object::new();
    obj.add_new_layer(LayerKind::Camera, "Camera");
    obj.add_new_layer(LayerKind::Bitmap, "Ink");
    obj.add_new_layer(LayerKind::Vector, "Lines");
    obj
}

#[test]
fn find_and_swap_layers() {
    let mut obj = sample();
    assert_eq!(obj.find_layer_by_name("Lines"), Some(2));
    assert!(obj.swap_layers(1, 2));
    assert_eq!(obj.find_layer_by_name("Lines"), Some(1));
    assert!(!obj.swap_layers(0, 9));
}

#[test]
fn delete_layer_returns_it() {
    let mut obj = sample();
    let removed = obj.delete_layer(1).unwrap();
    assert_eq!(removed.name(), "Ink");
    assert_eq!(obj.layer_count(), 2);
    assert!(obj.delete_layer(5).is_none());
}

#[test]
fn layer_pair_mut_borrows_both_orders() {
    let mut obj = sample();
    {
        let (a, b) = obj.layer_pair_mut(2, 1).unwrap();
        assert_eq!(a.name(), "Lines");
        assert_eq!(b.name(), "Ink");
    }
    assert!(obj.layer_pair_mut(1, 1).is_none());
}

#[test]
fn first_visible_camera_skips_hidden() {
    let mut obj = sample();
    assert_eq!(obj.first_visible_camera(), Some(0));
    obj.layer_mut(0).unwrap().set_visible(false);
    assert_eq!(obj.first_visible_camera(), None);
}

#[test]
fn animation_length_spans_all_layers() {
    let mut obj = sample();
    assert_eq!(obj.animation_length(), 0);
    obj.layer_mut(1).unwrap().add_new_key_at(7);
    let sound = obj.add_new_layer(LayerKind::Sound, "Music");
    let mut clip = SoundClip::new();
    clip.set_frame_length(10);
    obj.layer_mut(sound)
        .unwrap()
        .insert_key(KeyFrame::new(3, KeyContent::Sound(clip)));
    assert_eq!(obj.animation_length(), 12);
}
