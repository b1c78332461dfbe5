//! Core data models for the match watcher.

mod analysis;
mod hero;
mod ids;
mod match_record;
mod player;
mod profile;

pub use analysis::*;
pub use hero::*;
pub use ids::*;
pub use match_record::*;
pub use player::*;
pub use profile::*;
