use super::*;
use crate::render::LayerVisibility;

#[test]
fn empty_document_yields_defaults() {
    let config = EditorConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(config, EditorConfig::default());
}

#[test]
fn sections_parse_independently() {
    let json = r#"{
        "render": { "layer_visibility": "current_only", "grid": true },
        "history": { "capacity": 5, "autosave": false }
    }"#;
    let config = EditorConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(config.render.layer_visibility, LayerVisibility::CurrentOnly);
    assert!(config.render.grid);
    assert_eq!(config.history.capacity, 5);
    assert!(!config.history.autosave);
}

#[test]
fn nested_validation_errors_surface() {
    let err = EditorConfig::from_reader(r#"{"history": {"capacity": 0}}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("capacity"));
    let err =
        EditorConfig::from_reader(r#"{"render": {"grid_width": 0}}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("grid size"));
}

#[test]
fn file_round_trip_and_missing_path() {
    let path = std::env::temp_dir().join(format!("celpaint_config_{}.json", std::process::id()));
    let mut config = EditorConfig::default();
    config.render.axis = true;
    std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
    assert_eq!(EditorConfig::from_path(&path).unwrap(), config);
    let _ = std::fs::remove_file(&path);

    let err = EditorConfig::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("celpaint_config_"));
}
