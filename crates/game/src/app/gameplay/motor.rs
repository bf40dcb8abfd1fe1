use engine::{
    Character, ConditionState, Entity, InputAction, InputSnapshot, MovementState, SceneWorld,
    Vec2,
};

const SUPPORT_PROBE_DEPTH: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MotorTuning {
    pub(crate) walk_speed: f32,
    pub(crate) jump_speed: f32,
    pub(crate) gravity: f32,
    pub(crate) max_fall_speed: f32,
}

impl Default for MotorTuning {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            jump_speed: 7.5,
            gravity: 22.0,
            max_fall_speed: 18.0,
        }
    }
}

/// Moves the character one fixed step and refreshes its facing, grounded flag
/// and movement state. Characters that are stunned, dead, gripping or in some
/// host-specific state are left exactly as they are.
pub(crate) fn step_character(
    character: &mut Character,
    input: &InputSnapshot,
    world: &SceneWorld,
    fixed_dt_seconds: f32,
    tuning: &MotorTuning,
) {
    if character.state.condition != ConditionState::Normal
        || matches!(
            character.state.movement,
            MovementState::Gripping | MovementState::Other
        )
    {
        return;
    }

    let direction = horizontal_direction(input);
    if direction > 0.0 {
        character.state.facing_right = true;
    } else if direction < 0.0 {
        character.state.facing_right = false;
    }

    let moved = direction != 0.0
        && try_move_horizontal(character, world, direction, fixed_dt_seconds, tuning);

    if character.state.grounded && input.is_down(InputAction::Jump) {
        character.velocity.y = tuning.jump_speed;
        character.state.grounded = false;
    }
    if character.state.grounded && !has_support(character, world) {
        character.state.grounded = false;
    }
    if !character.state.grounded {
        character.velocity.y =
            (character.velocity.y - tuning.gravity * fixed_dt_seconds).max(-tuning.max_fall_speed);
        move_vertical(character, world, fixed_dt_seconds);
    }

    character.state.movement = if !character.state.grounded {
        if character.velocity.y > 0.0 {
            MovementState::Jumping
        } else {
            MovementState::Falling
        }
    } else if moved {
        MovementState::Walking
    } else {
        MovementState::Idle
    };
}

fn horizontal_direction(input: &InputSnapshot) -> f32 {
    let mut direction = 0.0;
    if input.is_held(InputAction::MoveRight) {
        direction += 1.0;
    }
    if input.is_held(InputAction::MoveLeft) {
        direction -= 1.0;
    }
    direction
}

fn try_move_horizontal(
    character: &mut Character,
    world: &SceneWorld,
    direction: f32,
    fixed_dt_seconds: f32,
    tuning: &MotorTuning,
) -> bool {
    let candidate = Vec2::new(
        character.position.x + direction * tuning.walk_speed * fixed_dt_seconds,
        character.position.y,
    );
    if blocker(world, character.position, candidate, character.size).is_some() {
        character.velocity.x = 0.0;
        return false;
    }
    character.position = candidate;
    character.velocity.x = direction * tuning.walk_speed;
    true
}

fn has_support(character: &Character, world: &SceneWorld) -> bool {
    let probe_center = Vec2::new(
        character.position.x,
        character.feet_y() - SUPPORT_PROBE_DEPTH * 0.5,
    );
    let probe_size = Vec2::new(character.size.x, SUPPORT_PROBE_DEPTH);
    world.overlap_box(probe_center, probe_size).is_some()
}

/// First collider that stops a move from `from` to `to`: one the box would
/// newly enter, or one it is already inside and would sink deeper into.
/// Colliders the character already overlaps can always be left.
fn blocker<'w>(world: &'w SceneWorld, from: Vec2, to: Vec2, size: Vec2) -> Option<&'w Entity> {
    world.overlapping(to, size).find(|entity| {
        if !entity.overlaps_box(from, size) {
            return true;
        }
        let center = entity.transform.position;
        (to.x - center.x).abs() < (from.x - center.x).abs()
            || (to.y - center.y).abs() < (from.y - center.y).abs()
    })
}

fn move_vertical(character: &mut Character, world: &SceneWorld, fixed_dt_seconds: f32) {
    let candidate = Vec2::new(
        character.position.x,
        character.position.y + character.velocity.y * fixed_dt_seconds,
    );
    let Some(hit) = blocker(world, character.position, candidate, character.size) else {
        character.position = candidate;
        return;
    };
    let Some(collider) = hit.collider else {
        character.position = candidate;
        return;
    };

    let embedded = hit.overlaps_box(character.position, character.size);
    let half_height = character.size.y * 0.5;
    if character.velocity.y <= 0.0 {
        if !embedded {
            let top = hit.transform.position.y + collider.size.y * 0.5;
            character.position.y = top + half_height;
        }
        character.state.grounded = true;
    } else if !embedded {
        let bottom = hit.transform.position.y - collider.size.y * 0.5;
        character.position.y = character.position.y.min(bottom - half_height);
    }
    character.velocity.y = 0.0;
}

#[cfg(test)]
mod tests {
    use engine::{ButtonState, EntityKind};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn world_with_floor() -> SceneWorld {
        let mut world = SceneWorld::new();
        world.spawn_static(Vec2::new(0.0, -0.5), Vec2::new(40.0, 1.0), EntityKind::Solid);
        world
    }

    fn hero() -> Character {
        Character::new("hero", Vec2::new(0.5, 0.5), Vec2::new(0.8, 1.0))
    }

    fn holding(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_state(action, ButtonState::Pressed)
    }

    #[test]
    fn standing_on_floor_stays_idle_and_grounded() {
        let world = world_with_floor();
        let mut character = hero();
        step_character(
            &mut character,
            &InputSnapshot::empty(),
            &world,
            DT,
            &MotorTuning::default(),
        );
        assert!(character.state.grounded);
        assert_eq!(character.state.movement, MovementState::Idle);
        assert_eq!(character.position, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn walking_left_turns_the_character() {
        let world = world_with_floor();
        let mut character = hero();
        step_character(
            &mut character,
            &holding(InputAction::MoveLeft),
            &world,
            DT,
            &MotorTuning::default(),
        );
        assert!(!character.is_facing_right());
        assert_eq!(character.state.movement, MovementState::Walking);
        assert!(character.position.x < 0.5);
    }

    #[test]
    fn wall_blocks_horizontal_motion_but_still_turns() {
        let mut world = world_with_floor();
        world.spawn_static(Vec2::new(1.45, 0.5), Vec2::new(1.0, 1.0), EntityKind::Solid);
        let mut character = hero();
        character.state.facing_right = false;
        step_character(
            &mut character,
            &holding(InputAction::MoveRight),
            &world,
            DT,
            &MotorTuning::default(),
        );
        assert!(character.is_facing_right());
        assert_eq!(character.position.x, 0.5);
        assert_eq!(character.state.movement, MovementState::Idle);
    }

    #[test]
    fn jump_rises_then_lands_back_on_the_floor() {
        let world = world_with_floor();
        let mut character = hero();
        let tuning = MotorTuning::default();
        let jump = InputSnapshot::empty().with_action_state(InputAction::Jump, ButtonState::Down);

        step_character(&mut character, &jump, &world, DT, &tuning);
        assert_eq!(character.state.movement, MovementState::Jumping);
        assert!(!character.state.grounded);

        let mut saw_falling = false;
        for _ in 0..240 {
            step_character(&mut character, &InputSnapshot::empty(), &world, DT, &tuning);
            saw_falling |= character.state.movement == MovementState::Falling;
            if character.state.grounded {
                break;
            }
        }
        assert!(saw_falling);
        assert!(character.state.grounded);
        assert!((character.feet_y() - 0.0).abs() < 1e-4);
    }

    #[test]
    fn stepping_off_a_ledge_starts_a_fall() {
        let mut world = SceneWorld::new();
        world.spawn_static(Vec2::new(-5.0, -0.5), Vec2::new(10.0, 1.0), EntityKind::Solid);
        let mut character = Character::new("hero", Vec2::new(0.5, 0.5), Vec2::new(0.8, 1.0));
        step_character(
            &mut character,
            &InputSnapshot::empty(),
            &world,
            DT,
            &MotorTuning::default(),
        );
        assert!(!character.state.grounded);
        assert_eq!(character.state.movement, MovementState::Falling);
    }

    #[test]
    fn character_inside_a_collider_can_leave_but_not_sink_deeper() {
        let mut world = world_with_floor();
        world.spawn_static(Vec2::new(1.575, 0.525), Vec2::new(1.0, 1.0), EntityKind::Breakable);
        let tuning = MotorTuning::default();
        let mut character = hero();
        character.position.x = 1.0;

        step_character(
            &mut character,
            &holding(InputAction::MoveRight),
            &world,
            DT,
            &tuning,
        );
        assert_eq!(character.position.x, 1.0);

        for _ in 0..10 {
            step_character(
                &mut character,
                &holding(InputAction::MoveLeft),
                &world,
                DT,
                &tuning,
            );
        }
        assert!(character.position.x < 0.675, "{}", character.position.x);
        assert!(character.state.grounded);
        assert_eq!(character.state.movement, MovementState::Walking);
    }

    #[test]
    fn stunned_character_is_left_alone() {
        let world = world_with_floor();
        let mut character = hero();
        character.state.condition = ConditionState::Stunned;
        let before = character.clone();
        step_character(
            &mut character,
            &holding(InputAction::MoveLeft),
            &world,
            DT,
            &MotorTuning::default(),
        );
        assert_eq!(character.state, before.state);
        assert_eq!(character.position, before.position);
    }
}
