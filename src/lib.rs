//! findex: denormalize JSON:API findings responses.
//!
//! The core is [`expand`]: build one [`expand::EntityIndex`] per side-loaded
//! collection, then [`expand::denormalize`] the primary findings against them.
//! The rest of the crate loads responses, applies request filters, and
//! renders the result.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod filters;
pub mod jsonapi;
pub mod report;
