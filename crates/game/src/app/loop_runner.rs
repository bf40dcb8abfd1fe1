use std::process::ExitCode;

use engine::{
    compile_def_database, resolve_app_paths, run_headless, AppError, RunSummary, SceneWorld,
};
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::gameplay::{demo_script, PlatformerScene};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_demo(app) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                stop_reason = ?summary.stop_reason,
                "demo_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(app: AppWiring) -> Result<RunSummary, AppError> {
    let app_paths = resolve_app_paths()?;
    let defs = compile_def_database(&app_paths)?;
    let mut world = SceneWorld::new();
    world.set_def_database(defs);

    let mut scene = PlatformerScene::new(app.ability_config);
    let mut input = demo_script();
    Ok(run_headless(&app.config, &mut scene, &mut world, &mut input))
}
