use engine::{
    AbilityHost, Character, EntityKind, InputSnapshot, Scene, SceneCommand, SceneWorld, Vec2,
};
use tracing::{debug, info};

use super::create_block::{CreateBlockAbility, CreateBlockConfig, CREATE_BLOCK_ABILITY_NAME};
use super::motor::{step_character, MotorTuning};

pub(crate) const CHARACTER_SPAWN: Vec2 = Vec2::new(0.5, 0.5);
pub(crate) const CHARACTER_SIZE: Vec2 = Vec2::new(0.8, 1.0);
const GROUND_CENTER: Vec2 = Vec2::new(0.0, -0.5);
const GROUND_SIZE: Vec2 = Vec2::new(40.0, 1.0);
/// Two grid cells left of the spawn cell. A character that walks left until
/// the pillar stops it targets the pillar's cell.
pub(crate) const PILLAR_CENTER: Vec2 = Vec2::new(-1.575, 0.525);
const PILLAR_SIZE: Vec2 = Vec2::new(1.0, 1.0);

pub(crate) struct PlatformerScene {
    character: Character,
    host: AbilityHost,
    ability_config: CreateBlockConfig,
    tuning: MotorTuning,
    frames: u64,
}

impl PlatformerScene {
    pub(crate) fn new(ability_config: CreateBlockConfig) -> Self {
        Self {
            character: Character::new("hero", CHARACTER_SPAWN, CHARACTER_SIZE),
            host: AbilityHost::new(),
            ability_config,
            tuning: MotorTuning::default(),
            frames: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn character(&self) -> &Character {
        &self.character
    }

    #[cfg(test)]
    pub(crate) fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    #[cfg(test)]
    pub(crate) fn animator(&self) -> &engine::AnimatorParameters {
        self.host.animator()
    }

    pub(crate) fn is_ability_ready(&self) -> bool {
        self.host.is_ready(CREATE_BLOCK_ABILITY_NAME)
    }

    /// Swaps in a freshly configured ability and sets it up against the
    /// world's definitions. Returns whether it is usable.
    pub(crate) fn set_ability_config(
        &mut self,
        config: CreateBlockConfig,
        world: &SceneWorld,
    ) -> bool {
        self.ability_config = config.clone();
        let replaced = self
            .host
            .replace(Box::new(CreateBlockAbility::new(config.clone())));
        if !replaced {
            self.host.register(Box::new(CreateBlockAbility::new(config)));
        }
        self.host
            .init_pending(&self.character, world.def_database());
        self.is_ability_ready()
    }
}

impl Scene for PlatformerScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.clear();
        world.spawn_static(GROUND_CENTER, GROUND_SIZE, EntityKind::Solid);
        world.spawn_static(PILLAR_CENTER, PILLAR_SIZE, EntityKind::Solid);

        self.character = Character::new("hero", CHARACTER_SPAWN, CHARACTER_SIZE);
        self.frames = 0;
        self.host = AbilityHost::new();
        let ability_ready = self.set_ability_config(self.ability_config.clone(), world);
        info!(
            entity_count = world.entity_count(),
            ability_ready,
            "platformer_scene_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        step_character(
            &mut self.character,
            input,
            world,
            fixed_dt_seconds,
            &self.tuning,
        );
        self.host
            .run_frame(fixed_dt_seconds, input, &self.character, world);
        let expired = world.tick_lifetimes(fixed_dt_seconds);
        if expired > 0 {
            debug!(frame = self.frames, expired, "effects_expired");
        }
        self.frames += 1;

        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        info!(
            frames = self.frames,
            blocks = world.count_of_kind(EntityKind::Breakable),
            "platformer_scene_unloaded"
        );
        world.clear();
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        Some(format!(
            "blocks={} | pos=({:.2}, {:.2}) | facing={} | {:?}",
            world.count_of_kind(EntityKind::Breakable),
            self.character.position.x,
            self.character.position.y,
            if self.character.is_facing_right() {
                "right"
            } else {
                "left"
            },
            self.character.state.movement,
        ))
    }
}
