//! Subcommand implementations.

pub mod cluster;
pub mod locate;
pub mod normalize;
pub mod run;
pub mod scrape;
