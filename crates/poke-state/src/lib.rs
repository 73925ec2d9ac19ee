use serde::{Deserialize, Serialize};

/// Snapshot of every screen predicate for one captured frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenState {
    /// Name of the profile the frame was classified under.
    pub profile: String,
    pub text_box: bool,
    pub life_box: bool,
    pub black_screen: bool,
    pub white_screen: bool,
    /// Only evaluated for titles that have a combat text box skin.
    pub combat_text_box: Option<bool>,
    /// Recognised creature name; `None` when no dialog was on screen.
    pub creature_name: Option<String>,
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Black or white full-screen transition (scene change, battle intro).
    pub fn is_transition(&self) -> bool {
        self.black_screen || self.white_screen
    }

    /// Any dialog panel is on screen.
    pub fn has_dialog(&self) -> bool {
        self.text_box || self.combat_text_box.unwrap_or(false)
    }

    /// Recognised name, if any non-empty one was read.
    pub fn name(&self) -> Option<&str> {
        self.creature_name.as_deref().filter(|n| !n.is_empty())
    }
}
