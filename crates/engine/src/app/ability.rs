use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::DefDatabase;

use super::{Character, InputSnapshot, SceneWorld};

#[derive(Debug, Error)]
pub enum AbilityInitError {
    #[error("definition database is not available")]
    MissingDefDatabase,
    #[error("ability setup failed: {source}")]
    Setup {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl AbilityInitError {
    pub fn setup(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Setup {
            source: Box::new(source),
        }
    }
}

/// Named animator parameters. Writes to parameters nobody registered are
/// dropped, so an ability can publish state before the animator knows about it.
#[derive(Debug, Default, Clone)]
pub struct AnimatorParameters {
    bools: BTreeMap<String, bool>,
}

impl AnimatorParameters {
    pub fn register_bool(&mut self, name: &str) {
        self.bools.entry(name.to_string()).or_insert(false);
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        match self.bools.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.bools.contains_key(name)
    }
}

/// Everything an ability may look at while it sets itself up.
pub struct AbilitySetup<'a> {
    pub character: &'a Character,
    pub def_database: Option<&'a DefDatabase>,
    pub animator: &'a mut AnimatorParameters,
}

/// Per-frame view handed to abilities.
pub struct AbilityContext<'a> {
    pub fixed_dt_seconds: f32,
    pub character: &'a Character,
    pub world: &'a mut SceneWorld,
}

pub trait CharacterAbility {
    fn name(&self) -> &'static str;

    /// Called before first use, and again after a failed attempt whenever the
    /// host retries pending abilities. An error keeps the ability disabled.
    fn init(&mut self, setup: AbilitySetup<'_>) -> Result<(), AbilityInitError>;

    fn on_input(&mut self, _input: &InputSnapshot, _ctx: &mut AbilityContext<'_>) {}

    fn tick(&mut self, _ctx: &mut AbilityContext<'_>) {}

    fn sync_animation(&mut self, _animator: &mut AnimatorParameters) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityPhase {
    Input,
    Tick,
    Animation,
}

struct AbilitySlot {
    ability: Box<dyn CharacterAbility>,
    ready: bool,
}

/// Owns a character's abilities and drives their lifecycle once per frame:
/// input for every ready ability, then tick, then animation sync.
#[derive(Default)]
pub struct AbilityHost {
    slots: Vec<AbilitySlot>,
    animator: AnimatorParameters,
    last_frame_order: Vec<(&'static str, AbilityPhase)>,
}

impl AbilityHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ability: Box<dyn CharacterAbility>) {
        self.slots.push(AbilitySlot {
            ability,
            ready: false,
        });
    }

    /// Swaps the ability with the same name for `ability`, which then waits
    /// for the next `init_pending`. Returns false when no such ability exists.
    pub fn replace(&mut self, ability: Box<dyn CharacterAbility>) -> bool {
        let name = ability.name();
        match self.slots.iter_mut().find(|slot| slot.ability.name() == name) {
            Some(slot) => {
                slot.ability = ability;
                slot.ready = false;
                true
            }
            None => false,
        }
    }

    /// Initializes every ability that is not ready yet. Returns the number that
    /// are still disabled afterwards.
    pub fn init_pending(
        &mut self,
        character: &Character,
        def_database: Option<&DefDatabase>,
    ) -> usize {
        let mut still_pending = 0usize;
        for slot in self.slots.iter_mut().filter(|slot| !slot.ready) {
            let setup = AbilitySetup {
                character,
                def_database,
                animator: &mut self.animator,
            };
            match slot.ability.init(setup) {
                Ok(()) => {
                    slot.ready = true;
                    info!(ability = slot.ability.name(), "ability_ready");
                }
                Err(error) => {
                    still_pending += 1;
                    warn!(
                        ability = slot.ability.name(),
                        error = %error,
                        "ability_init_failed"
                    );
                }
            }
        }
        still_pending
    }

    pub fn run_frame(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        character: &Character,
        world: &mut SceneWorld,
    ) {
        self.last_frame_order.clear();
        let mut ctx = AbilityContext {
            fixed_dt_seconds,
            character,
            world,
        };
        for slot in self.slots.iter_mut().filter(|slot| slot.ready) {
            slot.ability.on_input(input, &mut ctx);
            self.last_frame_order
                .push((slot.ability.name(), AbilityPhase::Input));
        }
        for slot in self.slots.iter_mut().filter(|slot| slot.ready) {
            slot.ability.tick(&mut ctx);
            self.last_frame_order
                .push((slot.ability.name(), AbilityPhase::Tick));
        }
        for slot in self.slots.iter_mut().filter(|slot| slot.ready) {
            slot.ability.sync_animation(&mut self.animator);
            self.last_frame_order
                .push((slot.ability.name(), AbilityPhase::Animation));
        }
        debug!(
            abilities = self.slots.len(),
            ready = self.ready_count(),
            "ability_frame"
        );
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.ready && slot.ability.name() == name)
    }

    pub fn ready_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.ready).count()
    }

    pub fn animator(&self) -> &AnimatorParameters {
        &self.animator
    }

    pub fn last_frame_order(&self) -> &[(&'static str, AbilityPhase)] {
        &self.last_frame_order
    }
}
