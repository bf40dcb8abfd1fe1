#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Action,
    Quit,
}

const ACTION_COUNT: usize = 5;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Action,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Action => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Per-frame state of a digital button.
///
/// `Down` and `Up` are edges and last exactly one frame; `Pressed` is the held
/// state between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonState {
    #[default]
    Off,
    Down,
    Pressed,
    Up,
}

impl ButtonState {
    fn advance(self, held: bool) -> Self {
        match (self, held) {
            (ButtonState::Off | ButtonState::Up, true) => ButtonState::Down,
            (ButtonState::Down | ButtonState::Pressed, true) => ButtonState::Pressed,
            (ButtonState::Down | ButtonState::Pressed, false) => ButtonState::Up,
            (ButtonState::Off | ButtonState::Up, false) => ButtonState::Off,
        }
    }

    pub fn is_held(self) -> bool {
        matches!(self, ButtonState::Down | ButtonState::Pressed)
    }
}

/// Raw "is the key held right now" flags, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputFrame {
    held: [bool; ACTION_COUNT],
}

impl RawInputFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_held(mut self, action: InputAction, held: bool) -> Self {
        self.held[action.index()] = held;
        self
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held[action.index()]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    states: [ButtonState; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, state: ButtonState) {
        self.states[action.index()] = state;
    }

    pub(crate) fn get(&self, action: InputAction) -> ButtonState {
        self.states[action.index()]
    }

    pub(crate) fn advance(&mut self, raw: &RawInputFrame) {
        for action in InputAction::ALL {
            let next = self.get(action).advance(raw.is_held(action));
            self.set(action, next);
        }
    }
}

/// Turns a stream of raw frames into edge-aware snapshots.
#[derive(Debug, Default)]
pub struct InputCollector {
    action_states: ActionStates,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_for_frame(&mut self, raw: &RawInputFrame) -> InputSnapshot {
        self.action_states.advance(raw);
        InputSnapshot {
            actions: self.action_states,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn state(&self, action: InputAction) -> ButtonState {
        self.actions.get(action)
    }

    /// True only on the frame the button went down.
    pub fn is_down(&self, action: InputAction) -> bool {
        self.state(action) == ButtonState::Down
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.state(action).is_held()
    }

    pub fn quit_requested(&self) -> bool {
        self.is_down(InputAction::Quit)
    }

    pub fn with_action_state(mut self, action: InputAction, state: ButtonState) -> Self {
        self.actions.set(action, state);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_reports_down_once_then_pressed() {
        let mut collector = InputCollector::new();
        let held = RawInputFrame::empty().with_held(InputAction::Action, true);

        let first = collector.snapshot_for_frame(&held);
        let second = collector.snapshot_for_frame(&held);

        assert_eq!(first.state(InputAction::Action), ButtonState::Down);
        assert!(first.is_down(InputAction::Action));
        assert_eq!(second.state(InputAction::Action), ButtonState::Pressed);
        assert!(!second.is_down(InputAction::Action));
        assert!(second.is_held(InputAction::Action));
    }

    #[test]
    fn release_reports_up_then_off() {
        let mut collector = InputCollector::new();
        collector.snapshot_for_frame(&RawInputFrame::empty().with_held(InputAction::Jump, true));

        let released = collector.snapshot_for_frame(&RawInputFrame::empty());
        let idle = collector.snapshot_for_frame(&RawInputFrame::empty());

        assert_eq!(released.state(InputAction::Jump), ButtonState::Up);
        assert_eq!(idle.state(InputAction::Jump), ButtonState::Off);
    }

    #[test]
    fn repress_after_release_is_a_new_down_edge() {
        let mut collector = InputCollector::new();
        let held = RawInputFrame::empty().with_held(InputAction::Action, true);
        collector.snapshot_for_frame(&held);
        collector.snapshot_for_frame(&RawInputFrame::empty());

        let again = collector.snapshot_for_frame(&held);
        assert!(again.is_down(InputAction::Action));
    }

    #[test]
    fn actions_are_tracked_independently() {
        let mut collector = InputCollector::new();
        let snapshot = collector.snapshot_for_frame(
            &RawInputFrame::empty()
                .with_held(InputAction::MoveRight, true)
                .with_held(InputAction::Action, true),
        );
        assert!(snapshot.is_held(InputAction::MoveRight));
        assert!(snapshot.is_down(InputAction::Action));
        assert!(!snapshot.is_held(InputAction::MoveLeft));
        assert!(!snapshot.quit_requested());
    }
}
