use mist_warp::{
    controls::{updates_for_event, updates_for_key},
    data_structures::params::{ParamUpdate, ParameterSet, SuggestedRange},
    resources::texture::TextureSource,
};
use winit::{event::WindowEvent, keyboard::KeyCode};

use crate::common::test_utils::params;

mod common;

#[test]
fn should_nudge_scalars_by_one_step() {
    let current = params(0.5, 0.2, 3.0);
    let initial = ParameterSet::default();

    assert_eq!(
        updates_for_key(KeyCode::ArrowUp, &current, &initial),
        vec![ParamUpdate::Speed(SuggestedRange::SPEED.nudge(0.5, 1.0))]
    );
    assert_eq!(
        updates_for_key(KeyCode::ArrowDown, &current, &initial),
        vec![ParamUpdate::Speed(SuggestedRange::SPEED.nudge(0.5, -1.0))]
    );
    assert_eq!(
        updates_for_key(KeyCode::ArrowRight, &current, &initial),
        vec![ParamUpdate::Distortion(SuggestedRange::DISTORTION.nudge(0.2, 1.0))]
    );
    assert_eq!(
        updates_for_key(KeyCode::ArrowLeft, &current, &initial),
        vec![ParamUpdate::Distortion(SuggestedRange::DISTORTION.nudge(0.2, -1.0))]
    );
    assert_eq!(
        updates_for_key(KeyCode::PageUp, &current, &initial),
        vec![ParamUpdate::Frequency(SuggestedRange::FREQUENCY.nudge(3.0, 1.0))]
    );
    assert_eq!(
        updates_for_key(KeyCode::PageDown, &current, &initial),
        vec![ParamUpdate::Frequency(SuggestedRange::FREQUENCY.nudge(3.0, -1.0))]
    );
}

#[test]
fn should_stop_at_range_edges() {
    let current = params(1.0, 0.0, 10.0);
    let initial = ParameterSet::default();

    assert_eq!(
        updates_for_key(KeyCode::ArrowUp, &current, &initial),
        vec![ParamUpdate::Speed(1.0)]
    );
    assert_eq!(
        updates_for_key(KeyCode::ArrowLeft, &current, &initial),
        vec![ParamUpdate::Distortion(0.0)]
    );
    assert_eq!(
        updates_for_key(KeyCode::PageUp, &current, &initial),
        vec![ParamUpdate::Frequency(10.0)]
    );
}

#[test]
fn should_reset_scalars_to_initial() {
    let current = params(0.9, 0.4, 8.0);
    let initial = params(0.2, 0.01, 1.5);

    assert_eq!(
        updates_for_key(KeyCode::KeyR, &current, &initial),
        vec![
            ParamUpdate::Speed(0.2),
            ParamUpdate::Distortion(0.01),
            ParamUpdate::Frequency(1.5),
        ]
    );
}

#[test]
fn should_return_to_builtin_texture() {
    let current = ParameterSet {
        texture: TextureSource::File("rocks.jpg".into()),
        ..ParameterSet::default()
    };
    assert_eq!(
        updates_for_key(KeyCode::Backspace, &current, &ParameterSet::default()),
        vec![ParamUpdate::Texture(TextureSource::Default)]
    );
}

#[test]
fn should_ignore_unmapped_keys() {
    let p = ParameterSet::default();
    assert!(updates_for_key(KeyCode::KeyQ, &p, &p).is_empty());
    assert!(updates_for_key(KeyCode::Space, &p, &p).is_empty());
}

#[test]
fn should_switch_texture_on_file_drop() {
    let p = ParameterSet::default();
    let event = WindowEvent::DroppedFile("/tmp/waves.png".into());
    assert_eq!(
        updates_for_event(&event, &p, &p),
        vec![ParamUpdate::Texture(TextureSource::File("/tmp/waves.png".into()))]
    );
}

#[test]
fn should_ignore_other_window_events() {
    let p = ParameterSet::default();
    assert!(updates_for_event(&WindowEvent::CloseRequested, &p, &p).is_empty());
    assert!(updates_for_event(&WindowEvent::Focused(true), &p, &p).is_empty());
}
