use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use super::input::{InputCollector, RawInputFrame};
use super::{Scene, SceneCommand, SceneWorld};

pub const MAX_FRAMES_ENV_VAR: &str = "PLATFORMER_MAX_FRAMES";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    /// Hard stop for the run, regardless of how much input is left.
    pub max_frames: u64,
    pub summary_log_interval_frames: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frames: 10_000,
            summary_log_interval_frames: 60,
        }
    }
}

impl LoopConfig {
    pub fn fixed_dt(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_tps.max(1) as f64)
    }

    /// Applies `PLATFORMER_MAX_FRAMES` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Result<Self, AppError> {
        match std::env::var(MAX_FRAMES_ENV_VAR) {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|value| *value > 0)
                    .ok_or_else(|| AppError::InvalidEnv {
                        var: MAX_FRAMES_ENV_VAR,
                        value: raw.clone(),
                    })?;
                self.max_frames = parsed;
                Ok(self)
            }
            Err(std::env::VarError::NotPresent) => Ok(self),
            Err(std::env::VarError::NotUnicode(raw)) => Err(AppError::InvalidEnv {
                var: MAX_FRAMES_ENV_VAR,
                value: raw.to_string_lossy().to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] crate::StartupError),
    #[error("failed to build content database: {0}")]
    Content(#[from] crate::ContentCompileError),
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Where the loop gets its per-frame raw input from. `None` ends the run.
pub trait InputSource {
    fn next_frame(&mut self) -> Option<RawInputFrame>;
}

/// Replays a fixed list of frames.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<RawInputFrame>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = RawInputFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: RawInputFrame) {
        self.frames.push_back(frame);
    }

    /// Appends `count` copies of `frame`.
    pub fn hold(&mut self, frame: RawInputFrame, count: usize) {
        for _ in 0..count {
            self.frames.push_back(frame);
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_frame(&mut self) -> Option<RawInputFrame> {
        self.frames.pop_front()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    InputExhausted,
    QuitRequested,
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub final_entity_count: usize,
    pub stop_reason: StopReason,
}

/// Drives `scene` at a fixed step until the input runs out, the scene asks to
/// quit, or `max_frames` is reached. Loads the scene first and unloads it on
/// the way out.
pub fn run_headless(
    config: &LoopConfig,
    scene: &mut dyn Scene,
    world: &mut SceneWorld,
    input_source: &mut dyn InputSource,
) -> RunSummary {
    let fixed_dt_seconds = config.fixed_dt().as_secs_f32();
    let log_interval = config.summary_log_interval_frames.max(1);
    info!(
        target_tps = config.target_tps.max(1),
        max_frames = config.max_frames,
        "loop_config"
    );

    scene.load(world);
    info!(entity_count = world.entity_count(), "scene_loaded");

    let mut collector = InputCollector::new();
    let mut frames = 0u64;
    let stop_reason = loop {
        if frames >= config.max_frames {
            break StopReason::FrameLimit;
        }
        let Some(raw) = input_source.next_frame() else {
            break StopReason::InputExhausted;
        };
        let snapshot = collector.snapshot_for_frame(&raw);
        let command = scene.update(fixed_dt_seconds, &snapshot, world);
        frames += 1;

        if frames % log_interval == 0 {
            info!(
                frame = frames,
                entity_count = world.entity_count(),
                title = %scene.debug_title(world).unwrap_or_default(),
                "loop_progress"
            );
        }
        if command == SceneCommand::Quit {
            debug!(frame = frames, "quit_command");
            break StopReason::QuitRequested;
        }
    };

    let summary = RunSummary {
        frames,
        final_entity_count: world.entity_count(),
        stop_reason,
    };
    scene.unload(world);
    info!(
        frames = summary.frames,
        final_entity_count = summary.final_entity_count,
        stop_reason = ?summary.stop_reason,
        "shutdown"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{EntityKind, InputAction, InputSnapshot, Vec2};

    #[derive(Default)]
    struct RecordingScene {
        loaded: bool,
        unloaded: bool,
        action_downs: u32,
    }

    impl Scene for RecordingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.loaded = true;
            world.spawn_static(Vec2::ZERO, Vec2::new(1.0, 1.0), EntityKind::Solid);
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            if input.is_down(InputAction::Action) {
                self.action_downs += 1;
            }
            if input.quit_requested() {
                return SceneCommand::Quit;
            }
            SceneCommand::None
        }

        fn unload(&mut self, world: &mut SceneWorld) {
            self.unloaded = true;
            world.clear();
        }
    }

    fn action() -> RawInputFrame {
        RawInputFrame::empty().with_held(InputAction::Action, true)
    }

    #[test]
    fn runs_until_input_is_exhausted() {
        let mut input = ScriptedInput::new([action(), action(), RawInputFrame::empty(), action()]);
        let mut scene = RecordingScene::default();
        let mut world = SceneWorld::new();

        let summary = run_headless(&LoopConfig::default(), &mut scene, &mut world, &mut input);

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.stop_reason, StopReason::InputExhausted);
        assert_eq!(summary.final_entity_count, 1);
        assert_eq!(scene.action_downs, 2);
        assert!(scene.loaded && scene.unloaded);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn quit_stops_the_loop_early() {
        let mut input = ScriptedInput::default();
        input.push(RawInputFrame::empty().with_held(InputAction::Quit, true));
        input.hold(action(), 5);
        let mut scene = RecordingScene::default();
        let mut world = SceneWorld::new();

        let summary = run_headless(&LoopConfig::default(), &mut scene, &mut world, &mut input);

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.stop_reason, StopReason::QuitRequested);
        assert_eq!(input.remaining(), 5);
    }

    #[test]
    fn frame_limit_caps_the_run() {
        let mut input = ScriptedInput::default();
        input.hold(RawInputFrame::empty(), 10);
        let config = LoopConfig {
            max_frames: 3,
            ..LoopConfig::default()
        };
        let mut scene = RecordingScene::default();
        let mut world = SceneWorld::new();

        let summary = run_headless(&config, &mut scene, &mut world, &mut input);

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.stop_reason, StopReason::FrameLimit);
    }

    #[test]
    fn fixed_dt_guards_against_zero_tps() {
        let config = LoopConfig {
            target_tps: 0,
            ..LoopConfig::default()
        };
        assert_eq!(config.fixed_dt(), Duration::from_secs(1));
    }
}
