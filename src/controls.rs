//! Keyboard and file-drop controller.
//!
//! A stand-in for slider widgets: every key press nudges one parameter by one suggested
//! step and stays inside the suggested range.
//!
//! | key                 | effect                          |
//! |---------------------|---------------------------------|
//! | `↑` / `↓`           | flow speed                      |
//! | `→` / `←`           | distortion strength             |
//! | `PageUp` / `PageDn` | noise frequency                 |
//! | `R`                 | restore the initial scalars     |
//! | `Backspace`         | back to the built-in texture    |
//!
//! Dropping an image file onto the window switches the texture to that file.

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    data_structures::params::{ParamUpdate, ParameterSet, SuggestedRange},
    resources::texture::TextureSource,
};

/// Translate a key code into the updates it stands for, given the current values.
pub fn updates_for_key(
    code: KeyCode,
    current: &ParameterSet,
    initial: &ParameterSet,
) -> Vec<ParamUpdate> {
    let speed = |steps| ParamUpdate::Speed(SuggestedRange::SPEED.nudge(current.speed, steps));
    let distortion =
        |steps| ParamUpdate::Distortion(SuggestedRange::DISTORTION.nudge(current.distortion, steps));
    let frequency =
        |steps| ParamUpdate::Frequency(SuggestedRange::FREQUENCY.nudge(current.frequency, steps));
    match code {
        KeyCode::ArrowUp => vec![speed(1.0)],
        KeyCode::ArrowDown => vec![speed(-1.0)],
        KeyCode::ArrowRight => vec![distortion(1.0)],
        KeyCode::ArrowLeft => vec![distortion(-1.0)],
        KeyCode::PageUp => vec![frequency(1.0)],
        KeyCode::PageDown => vec![frequency(-1.0)],
        KeyCode::KeyR => vec![
            ParamUpdate::Speed(initial.speed),
            ParamUpdate::Distortion(initial.distortion),
            ParamUpdate::Frequency(initial.frequency),
        ],
        KeyCode::Backspace => vec![ParamUpdate::Texture(TextureSource::Default)],
        _ => Vec::new(),
    }
}

/// Updates carried by a window event, if it is a key press or a file drop.
pub fn updates_for_event(
    event: &WindowEvent,
    current: &ParameterSet,
    initial: &ParameterSet,
) -> Vec<ParamUpdate> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => updates_for_key(*code, current, initial),
        WindowEvent::DroppedFile(path) => {
            vec![ParamUpdate::Texture(TextureSource::File(path.clone()))]
        }
        _ => Vec::new(),
    }
}
