use super::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
    Gripping,
    Other,
}

impl MovementState {
    pub fn is_airborne(self) -> bool {
        matches!(self, MovementState::Jumping | MovementState::Falling)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConditionState {
    #[default]
    Normal,
    Stunned,
    Dead,
    Other,
}

/// State the host tracks for a character. Abilities read it; they never
/// write it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterState {
    pub facing_right: bool,
    pub movement: MovementState,
    pub condition: ConditionState,
    pub grounded: bool,
    pub abilities_permitted: bool,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            facing_right: true,
            movement: MovementState::Idle,
            condition: ConditionState::Normal,
            grounded: true,
            abilities_permitted: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    pub name: String,
    /// Center of the character in world units.
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub state: CharacterState,
}

impl Character {
    pub fn new(name: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            size,
            velocity: Vec2::ZERO,
            state: CharacterState::default(),
        }
    }

    pub fn is_facing_right(&self) -> bool {
        self.state.facing_right
    }

    pub fn feet_y(&self) -> f32 {
        self.position.y - self.size.y * 0.5
    }
}
