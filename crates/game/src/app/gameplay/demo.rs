use engine::{InputAction, RawInputFrame, ScriptedInput};

const WALK_LEFT_FRAMES: usize = 45;
const SETTLE_FRAMES: usize = 10;

fn idle() -> RawInputFrame {
    RawInputFrame::empty()
}

fn holding(action: InputAction) -> RawInputFrame {
    RawInputFrame::empty().with_held(action, true)
}

fn tap(script: &mut ScriptedInput, action: InputAction) {
    script.push(holding(action));
    script.push(idle());
}

/// Headless walkthrough: create, remove and recreate the block to the right,
/// then walk into the pillar and try to build inside it, then quit.
pub(crate) fn demo_script() -> ScriptedInput {
    let mut script = ScriptedInput::default();
    script.hold(idle(), SETTLE_FRAMES);

    tap(&mut script, InputAction::Action);
    script.hold(idle(), SETTLE_FRAMES);
    tap(&mut script, InputAction::Action);
    script.hold(idle(), SETTLE_FRAMES);
    tap(&mut script, InputAction::Action);
    script.hold(idle(), SETTLE_FRAMES);

    script.hold(holding(InputAction::MoveLeft), WALK_LEFT_FRAMES);
    script.hold(idle(), SETTLE_FRAMES);
    tap(&mut script, InputAction::Action);
    script.hold(idle(), SETTLE_FRAMES);

    tap(&mut script, InputAction::Jump);
    tap(&mut script, InputAction::Action);
    script.hold(idle(), SETTLE_FRAMES * 6);

    script.push(holding(InputAction::Quit));
    script
}
