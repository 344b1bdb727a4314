use serde::{Deserialize, Serialize};
use vantage_geometry::{Rect, Vector2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

impl MouseButton {
    /// Maps DOM button numbering (0 left, 1 middle, 2 right).
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }

    /// Normalised index: 0 primary, 1 secondary, 2 middle.
    pub fn index(self) -> i32 {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Middle => 2,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Middle => 4,
        }
    }

    pub fn from_buttons(buttons: u32) -> Option<Self> {
        [Self::Primary, Self::Secondary, Self::Middle]
            .into_iter()
            .find(|button| buttons & button.mask() != 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
    Over,
    Enter,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub kind: PointerEventKind,
    pub client_x: f64,
    pub client_y: f64,
    pub rect: Rect,
    #[serde(default)]
    pub button: Option<MouseButton>,
    #[serde(default)]
    pub buttons: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, kind: PointerEventKind, client_x: f64, client_y: f64, rect: Rect) -> Self {
        Self {
            pointer_id,
            kind,
            client_x,
            client_y,
            rect,
            button: None,
            buttons: 0,
            modifiers: Modifiers::default(),
        }
    }

    pub fn down(pointer_id: i32, button: MouseButton, client_x: f64, client_y: f64, rect: Rect) -> Self {
        Self {
            button: Some(button),
            buttons: button.mask(),
            ..Self::new(pointer_id, PointerEventKind::Down, client_x, client_y, rect)
        }
    }

    pub fn moved(pointer_id: i32, buttons: u32, client_x: f64, client_y: f64, rect: Rect) -> Self {
        Self {
            buttons,
            ..Self::new(pointer_id, PointerEventKind::Move, client_x, client_y, rect)
        }
    }

    pub fn up(pointer_id: i32, client_x: f64, client_y: f64, rect: Rect) -> Self {
        Self::new(pointer_id, PointerEventKind::Up, client_x, client_y, rect)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn canvas(&self) -> Vector2 {
        self.rect.to_canvas(self.client_x, self.client_y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: String,
    #[serde(default)]
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            repeat: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub delta_y: f64,
    #[serde(default)]
    pub client_x: f64,
    #[serde(default)]
    pub client_y: f64,
    #[serde(default)]
    pub rect: Rect,
}
