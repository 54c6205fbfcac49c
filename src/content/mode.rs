/// Extraction mode state machine for the content agent
///
/// Transitions produce the list of page effects to run; the DOM layer in
/// `content::mod` executes them. Keeping the plan separate lets the toggle
/// rules be checked without a browser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    AttachClickListener,
    DetachClickListener,
    /// Copy cursor and neutral overlay on every video link
    ShowAffordance,
    /// Remove cursor and overlays; copy-marks stay
    HideAffordance,
    /// Re-read the history and mark every copied identifier
    RemarkCopied,
    /// Strip copy-marks from every link
    ClearCopyMarks,
}

#[derive(Debug, Default)]
pub struct ExtractionMode {
    enabled: bool,
    listening: bool,
}

impl ExtractionMode {
    pub fn new() -> Self {
        ExtractionMode {
            enabled: false,
            listening: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether clicks are currently intercepted
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Apply a toggle command or the persisted flag at start-up
    pub fn set(&mut self, enabled: bool) -> Vec<ModeAction> {
        let mut actions = Vec::new();

        if enabled && !self.listening {
            actions.push(ModeAction::AttachClickListener);
            self.listening = true;
        } else if !enabled && self.listening {
            actions.push(ModeAction::DetachClickListener);
            self.listening = false;
        }
        self.enabled = enabled;

        if enabled {
            actions.push(ModeAction::ShowAffordance);
            actions.push(ModeAction::RemarkCopied);
        } else {
            actions.push(ModeAction::HideAffordance);
        }
        actions
    }

    /// New content arrived in the page
    pub fn rescan(&self) -> Vec<ModeAction> {
        if self.enabled {
            vec![ModeAction::ShowAffordance, ModeAction::RemarkCopied]
        } else {
            vec![ModeAction::RemarkCopied]
        }
    }

    /// The popup cleared the history. Independent of the mode.
    pub fn clear_marks(&self) -> Vec<ModeAction> {
        vec![ModeAction::ClearCopyMarks]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ModeAction::*;

    #[test]
    fn test_starts_disabled() {
        let mode = ExtractionMode::new();
        assert!(!mode.is_enabled());
        assert!(!mode.is_listening());
    }

    #[test]
    fn test_enable() {
        let mut mode = ExtractionMode::new();
        assert_eq!(
            mode.set(true),
            vec![AttachClickListener, ShowAffordance, RemarkCopied]
        );
        assert!(mode.is_enabled());
        assert!(mode.is_listening());
    }

    #[test]
    fn test_enable_twice_attaches_once() {
        let mut mode = ExtractionMode::new();
        mode.set(true);
        let actions = mode.set(true);
        assert!(!actions.contains(&AttachClickListener));
        assert_eq!(actions, vec![ShowAffordance, RemarkCopied]);
    }

    #[test]
    fn test_round_trip_leaves_marks_alone() {
        let mut mode = ExtractionMode::new();
        mode.set(true);

        let actions = mode.set(false);

        assert_eq!(actions, vec![DetachClickListener, HideAffordance]);
        assert!(!actions.contains(&ClearCopyMarks));
        assert!(!mode.is_enabled());
        assert!(!mode.is_listening());
    }

    #[test]
    fn test_disable_when_already_disabled() {
        let mut mode = ExtractionMode::new();
        assert_eq!(mode.set(false), vec![HideAffordance]);
        assert!(!mode.is_listening());
    }

    #[test]
    fn test_rescan_depends_on_mode() {
        let mut mode = ExtractionMode::new();
        assert_eq!(mode.rescan(), vec![RemarkCopied]);

        mode.set(true);
        assert_eq!(mode.rescan(), vec![ShowAffordance, RemarkCopied]);
    }

    #[test]
    fn test_clear_marks_keeps_mode() {
        let mut mode = ExtractionMode::new();
        mode.set(true);

        assert_eq!(mode.clear_marks(), vec![ClearCopyMarks]);
        assert!(mode.is_enabled());
        assert!(mode.is_listening());
    }
}
