//! SkyBee Routes CLI library.
//!
//! Output formatting shared by the `skybee` binary's subcommands.

pub mod output;
