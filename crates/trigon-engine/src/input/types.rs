/// Keyboard key identifier.
///
/// Only keys the lessons react to are named; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    /// Any other key, by platform key code.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Keyboard and focus events, already detached from winit types.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Auto-repeat arrives as a further `Pressed` and never adds a new press.
    Key { key: Key, state: KeyState },

    /// Losing focus releases every held key.
    Focused(bool),
}
