use engine::{
    AbilityContext, AbilityInitError, AbilitySetup, AnimatorParameters, Character,
    CharacterAbility, CharacterState, ConditionState, DefDatabase, EntityArchetype, EntityId,
    EntityKind, InputAction, InputSnapshot, MovementState, SceneWorld, Vec2,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::grid::{overlap_probe_size, snap_target};

pub(crate) const CREATE_BLOCK_ABILITY_NAME: &str = "create_block";
pub(crate) const BLOCK_TOGGLED_PARAM: &str = "BlockToggled";

pub(crate) const HELP_TEXT: &str = "Creates a block in the grid cell in front of the character, \
or removes it if that cell already holds one. Point block_def at an EntityDef of kind Breakable \
with a renderable and non-zero width/height. Optionally name two Effect defs, one spawned when a \
block is created and one when a block is destroyed.";

pub(crate) const DEFAULT_BLOCK_DEF: &str = "proto.block";
pub(crate) const DEFAULT_CREATE_EFFECT_DEF: &str = "proto.fx.block_create";
pub(crate) const DEFAULT_DESTROY_EFFECT_DEF: &str = "proto.fx.block_destroy";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CreateBlockConfig {
    pub(crate) block_def: String,
    pub(crate) create_effect_def: Option<String>,
    pub(crate) destroy_effect_def: Option<String>,
}

impl Default for CreateBlockConfig {
    fn default() -> Self {
        Self {
            block_def: DEFAULT_BLOCK_DEF.to_string(),
            create_effect_def: Some(DEFAULT_CREATE_EFFECT_DEF.to_string()),
            destroy_effect_def: Some(DEFAULT_DESTROY_EFFECT_DEF.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum CreateBlockSetupError {
    #[error("block def '{def_name}' is not defined")]
    UnknownBlockDef { def_name: String },
    #[error("block def '{def_name}' has kind {kind}; it must be Breakable")]
    NotBreakable {
        def_name: String,
        kind: &'static str,
    },
    #[error("block def '{def_name}' has no renderable to take its bounds from")]
    MissingRenderable { def_name: String },
    #[error("block def '{def_name}' has no width/height")]
    MissingBounds { def_name: String },
    #[error("block def '{def_name}' has bounds {width}x{height}; both must be finite and > 0")]
    DegenerateBounds {
        def_name: String,
        width: f32,
        height: f32,
    },
    #[error("effect def '{def_name}' is not defined")]
    UnknownEffectDef { def_name: String },
    #[error("effect def '{def_name}' has kind {kind}; it must be Effect")]
    NotAnEffect {
        def_name: String,
        kind: &'static str,
    },
}

/// Templates resolved and validated during setup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlockTemplates {
    pub(crate) block: EntityArchetype,
    pub(crate) block_size: Vec2,
    pub(crate) create_effect: Option<EntityArchetype>,
    pub(crate) destroy_effect: Option<EntityArchetype>,
}

impl BlockTemplates {
    pub(crate) fn resolve(
        defs: &DefDatabase,
        config: &CreateBlockConfig,
    ) -> Result<Self, CreateBlockSetupError> {
        let def_name = config.block_def.clone();
        let block = defs
            .entity_def_by_name(&def_name)
            .ok_or_else(|| CreateBlockSetupError::UnknownBlockDef {
                def_name: def_name.clone(),
            })?
            .clone();
        if block.kind != EntityKind::Breakable {
            return Err(CreateBlockSetupError::NotBreakable {
                def_name,
                kind: block.kind.as_token(),
            });
        }
        if block.renderable.is_none() {
            return Err(CreateBlockSetupError::MissingRenderable { def_name });
        }
        let Some(block_size) = block.size else {
            return Err(CreateBlockSetupError::MissingBounds { def_name });
        };
        let valid_axis = |value: f32| value.is_finite() && value > 0.0;
        if !(valid_axis(block_size.x) && valid_axis(block_size.y)) {
            return Err(CreateBlockSetupError::DegenerateBounds {
                def_name,
                width: block_size.x,
                height: block_size.y,
            });
        }

        Ok(Self {
            block,
            block_size,
            create_effect: resolve_effect(defs, config.create_effect_def.as_deref())?,
            destroy_effect: resolve_effect(defs, config.destroy_effect_def.as_deref())?,
        })
    }
}

fn resolve_effect(
    defs: &DefDatabase,
    def_name: Option<&str>,
) -> Result<Option<EntityArchetype>, CreateBlockSetupError> {
    let Some(def_name) = def_name else {
        return Ok(None);
    };
    let effect = defs
        .entity_def_by_name(def_name)
        .ok_or_else(|| CreateBlockSetupError::UnknownEffectDef {
            def_name: def_name.to_string(),
        })?;
    if effect.kind != EntityKind::Effect {
        return Err(CreateBlockSetupError::NotAnEffect {
            def_name: def_name.to_string(),
            kind: effect.kind.as_token(),
        });
    }
    Ok(Some(effect.clone()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ActivationOutcome {
    Created { block: EntityId, target: Vec2 },
    Destroyed { block: EntityId, target: Vec2 },
    /// The cell holds something that is not a breakable block.
    Blocked { by: EntityId, target: Vec2 },
    /// The character is in no state to act.
    Suppressed,
}

impl ActivationOutcome {
    pub(crate) fn toggled(self) -> bool {
        matches!(self, Self::Created { .. } | Self::Destroyed { .. })
    }
}

/// Airborne characters may always act. Otherwise the character must be allowed
/// to use abilities, in a normal condition, standing on something, and not
/// hanging from a ledge.
pub(crate) fn activation_allowed(state: &CharacterState) -> bool {
    if state.movement.is_airborne() {
        return true;
    }
    state.abilities_permitted
        && state.condition == ConditionState::Normal
        && state.grounded
        && state.movement != MovementState::Gripping
}

/// Creates or removes the block at `target`. Exactly one world change happens,
/// or none when the cell holds non-breakable geometry.
pub(crate) fn resolve_cell(
    world: &mut SceneWorld,
    target: Vec2,
    templates: &BlockTemplates,
) -> ActivationOutcome {
    let probe = overlap_probe_size(templates.block_size);
    let occupant = world
        .overlap_box(target, probe)
        .map(|entity| (entity.id, entity.kind));

    match occupant {
        Some((id, EntityKind::Breakable)) => {
            if let Some(effect) = &templates.destroy_effect {
                world.instantiate(effect, target);
            }
            world.destroy(id);
            ActivationOutcome::Destroyed { block: id, target }
        }
        Some((id, _)) => ActivationOutcome::Blocked { by: id, target },
        None => {
            if let Some(effect) = &templates.create_effect {
                world.instantiate(effect, target);
            }
            let block = world.instantiate(&templates.block, target);
            ActivationOutcome::Created { block, target }
        }
    }
}

pub(crate) struct CreateBlockAbility {
    config: CreateBlockConfig,
    templates: Option<BlockTemplates>,
    last_outcome: Option<ActivationOutcome>,
}

impl CreateBlockAbility {
    pub(crate) fn new(config: CreateBlockConfig) -> Self {
        Self {
            config,
            templates: None,
            last_outcome: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn last_outcome(&self) -> Option<ActivationOutcome> {
        self.last_outcome
    }

    /// Runs one activation for `character`. Does nothing until setup has
    /// resolved the templates.
    pub(crate) fn activate(
        &mut self,
        character: &Character,
        world: &mut SceneWorld,
    ) -> ActivationOutcome {
        let Some(templates) = &self.templates else {
            return ActivationOutcome::Suppressed;
        };
        if !activation_allowed(&character.state) {
            debug!(
                character = %character.name,
                movement = ?character.state.movement,
                condition = ?character.state.condition,
                grounded = character.state.grounded,
                "activation_suppressed"
            );
            return ActivationOutcome::Suppressed;
        }

        let target = snap_target(
            character.position,
            character.is_facing_right(),
            templates.block_size,
        );
        let outcome = resolve_cell(world, target, templates);
        match outcome {
            ActivationOutcome::Created { block, target } => debug!(
                block = block.0,
                x = target.x,
                y = target.y,
                "block_created"
            ),
            ActivationOutcome::Destroyed { block, target } => debug!(
                block = block.0,
                x = target.x,
                y = target.y,
                "block_destroyed"
            ),
            ActivationOutcome::Blocked { by, target } => debug!(
                occupant = by.0,
                x = target.x,
                y = target.y,
                "block_blocked"
            ),
            ActivationOutcome::Suppressed => {}
        }
        outcome
    }
}

impl CharacterAbility for CreateBlockAbility {
    fn name(&self) -> &'static str {
        CREATE_BLOCK_ABILITY_NAME
    }

    fn init(&mut self, setup: AbilitySetup<'_>) -> Result<(), AbilityInitError> {
        self.templates = None;
        setup.animator.register_bool(BLOCK_TOGGLED_PARAM);
        let defs = setup
            .def_database
            .ok_or(AbilityInitError::MissingDefDatabase)?;
        let templates =
            BlockTemplates::resolve(defs, &self.config).map_err(AbilityInitError::setup)?;
        info!(
            character = %setup.character.name,
            block_def = %self.config.block_def,
            width = templates.block_size.x,
            height = templates.block_size.y,
            "create_block_ready"
        );
        self.templates = Some(templates);
        Ok(())
    }

    fn on_input(&mut self, input: &InputSnapshot, ctx: &mut AbilityContext<'_>) {
        self.last_outcome = None;
        if !input.is_down(InputAction::Action) {
            return;
        }
        let outcome = self.activate(ctx.character, ctx.world);
        self.last_outcome = Some(outcome);
    }

    fn sync_animation(&mut self, animator: &mut AnimatorParameters) {
        let toggled = self.last_outcome.is_some_and(ActivationOutcome::toggled);
        animator.set_bool(BLOCK_TOGGLED_PARAM, toggled);
    }
}
