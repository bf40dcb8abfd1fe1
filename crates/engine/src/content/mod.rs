mod compiler;
mod database;

pub use compiler::{
    compile_def_database, compile_def_sources, ContentCompileError, ContentErrorCode,
    SourceLocation,
};
pub use database::{DefDatabase, EntityArchetype, EntityDefId};
