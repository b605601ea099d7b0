use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyAction {
    TogglePauseResume,
    StopRecording,
}

pub type HotkeyBindings = HashMap<String, HotkeyAction>;

pub fn default_bindings() -> HotkeyBindings {
    HotkeyBindings::from([
        ("Space".to_string(), HotkeyAction::TogglePauseResume),
        ("Escape".to_string(), HotkeyAction::StopRecording),
    ])
}

/// Maps key identifiers to actions. `rebind` swaps the whole map in one step
/// so a binding change never leaves a stale handler registered.
#[derive(Debug)]
pub struct HotkeyDispatcher {
    bindings: Mutex<HotkeyBindings>,
}

impl HotkeyDispatcher {
    pub fn new(bindings: HotkeyBindings) -> Self {
        Self {
            bindings: Mutex::new(bindings),
        }
    }

    pub fn rebind(&self, bindings: HotkeyBindings) {
        if let Ok(mut current) = self.bindings.lock() {
            *current = bindings;
        }
    }

    pub fn resolve(&self, key: &str) -> Option<HotkeyAction> {
        self.bindings
            .lock()
            .ok()
            .and_then(|bindings| bindings.get(key).copied())
    }

    pub fn bindings(&self) -> HotkeyBindings {
        self.bindings
            .lock()
            .map(|bindings| bindings.clone())
            .unwrap_or_default()
    }
}

impl Default for HotkeyDispatcher {
    fn default() -> Self {
        Self::new(default_bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::{default_bindings, HotkeyAction, HotkeyBindings, HotkeyDispatcher};

    #[test]
    fn default_bindings_cover_space_and_escape() {
        let dispatcher = HotkeyDispatcher::default();
        assert_eq!(
            dispatcher.resolve("Space"),
            Some(HotkeyAction::TogglePauseResume)
        );
        assert_eq!(
            dispatcher.resolve("Escape"),
            Some(HotkeyAction::StopRecording)
        );
    }

    #[test]
    fn unknown_key_is_unhandled() {
        let dispatcher = HotkeyDispatcher::default();
        assert_eq!(dispatcher.resolve("F12"), None);
    }

    #[test]
    fn rebind_replaces_the_whole_map() {
        let dispatcher = HotkeyDispatcher::default();
        let replacement =
            HotkeyBindings::from([("s".to_string(), HotkeyAction::StopRecording)]);
        dispatcher.rebind(replacement);
        // Old bindings are gone, not merged.
        assert_eq!(dispatcher.resolve("Space"), None);
        assert_eq!(dispatcher.resolve("s"), Some(HotkeyAction::StopRecording));
        assert_eq!(dispatcher.bindings().len(), 1);
    }

    #[test]
    fn default_map_helper_matches_dispatcher_default() {
        assert_eq!(default_bindings(), HotkeyDispatcher::default().bindings());
    }
}
