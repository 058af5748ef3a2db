//! Pointer input for the interaction force.
//!
//! Left mouse button attracts particles toward the cursor, right button
//! repels them.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Pointer state fed to the simulation each frame.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Pointer position in world coordinates.
    pub position: Vec2,
    /// +1 attracts, -1 repels, 0 is inactive.
    pub strength: f32,
}

impl PointerInput {
    pub fn attract(position: Vec2) -> Self {
        Self { position, strength: 1.0 }
    }

    pub fn repel(position: Vec2) -> Self {
        Self { position, strength: -1.0 }
    }

    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.strength != 0.0
    }
}

/// System to track the cursor and mouse buttons.
///
/// Does nothing when the app has no window, mouse input or camera, so the
/// simulation also runs headless.
pub fn handle_pointer_input(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerInput>,
) {
    let Some(buttons) = buttons else {
        return;
    };

    if let (Ok(window), Some((camera, camera_transform))) =
        (windows.get_single(), cameras.iter().next())
    {
        if let Some(world) = window
            .cursor_position()
            .and_then(|cursor| camera.viewport_to_world_2d(camera_transform, cursor).ok())
        {
            pointer.position = world;
        }
    }

    pointer.strength = if buttons.pressed(MouseButton::Left) {
        1.0
    } else if buttons.pressed(MouseButton::Right) {
        -1.0
    } else {
        0.0
    };
}
