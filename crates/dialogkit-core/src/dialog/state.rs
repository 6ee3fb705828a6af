//! Dialog visibility states.

/// Where a dialog sits in its show/hide cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DialogState {
    /// Not visible, no transition running.
    #[default]
    Hidden,
    /// State class added, waiting for the transition to settle.
    Showing,
    /// Visible, no transition running.
    Visible,
    /// State class removed, waiting for the transition to settle.
    Hiding,
}

impl DialogState {
    /// Steady state for the given visibility.
    pub fn steady(visible: bool) -> Self {
        if visible { Self::Visible } else { Self::Hidden }
    }

    /// Whether the dialog is visible or becoming visible.
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Showing | Self::Visible)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }

    /// Steady state reached once the running transition completes.
    pub fn settled(&self) -> Self {
        match self {
            Self::Showing | Self::Visible => Self::Visible,
            Self::Hiding | Self::Hidden => Self::Hidden,
        }
    }
}
