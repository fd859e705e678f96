/// What the window is showing.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ScreenState {
    ModuleGrid,     // Module cards, pick one to present
    Presenting,     // Full-screen deck of the picked module
    Closing,        // Window will close after this frame
}

impl ScreenState {
    /// Escape with nothing left to undo: a presentation returns to the grid
    /// when it was opened from it, otherwise the window closes.
    pub fn after_close(self, opened_from_grid: bool) -> ScreenState {
        match self {
            ScreenState::Presenting if opened_from_grid => ScreenState::ModuleGrid,
            _ => ScreenState::Closing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_a_presentation() {
        assert_eq!(ScreenState::Presenting.after_close(true), ScreenState::ModuleGrid);
        assert_eq!(ScreenState::Presenting.after_close(false), ScreenState::Closing);
        assert_eq!(ScreenState::ModuleGrid.after_close(true), ScreenState::Closing);
    }
}
