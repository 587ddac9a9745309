/// Which action the modal overlay is offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum OverlayMode {
    Start,
    Resume,
    Retry,
}

/// Pause/retry/start overlay state. The overlay owns only its own visibility
/// and mode; session fields stay with the SessionController, which flips
/// this state on its transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalOverlay {
    pub visible: bool,
    pub mode: OverlayMode,
}

impl ModalOverlay {
    /// Initial state: the start menu is up before any session begins.
    pub fn start_menu() -> Self {
        Self {
            visible: true,
            mode: OverlayMode::Start,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            mode: OverlayMode::Start,
        }
    }

    pub fn show(&mut self, mode: OverlayMode) {
        self.visible = true;
        self.mode = mode;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
