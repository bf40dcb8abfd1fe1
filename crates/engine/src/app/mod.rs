mod ability;
mod character;
mod input;
mod loop_runner;
mod scene;

pub use ability::{
    AbilityContext, AbilityHost, AbilityInitError, AbilityPhase, AbilitySetup,
    AnimatorParameters, CharacterAbility,
};
pub use character::{Character, CharacterState, ConditionState, MovementState};
pub use input::{ButtonState, InputAction, InputCollector, InputSnapshot, RawInputFrame};
pub use loop_runner::{
    run_headless, AppError, InputSource, LoopConfig, RunSummary, ScriptedInput, StopReason,
    MAX_FRAMES_ENV_VAR,
};
pub use scene::{
    Collider, Entity, EntityId, EntityKind, RenderableKind, Scene, SceneCommand, SceneWorld,
    Transform, Vec2, DEFAULT_EFFECT_LIFETIME_SECONDS,
};
