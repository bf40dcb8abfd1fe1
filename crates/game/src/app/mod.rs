mod bootstrap;
mod gameplay;
mod loop_runner;

pub(crate) use bootstrap::{build_app, print_help, wants_help};
pub(crate) use loop_runner::run;
