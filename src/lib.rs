//! Battle reveal - deterministic battle presentation sequencer
//!
//! The library exposes the sequencer's modules for the binary and for testing.

pub mod accessibility;
pub mod action;
pub mod callouts;
pub mod completion;
pub mod components;
pub mod damage;
pub mod effect;
pub mod error;
pub mod moments;
pub mod outcome;
pub mod reducer;
pub mod state;
pub mod telemetry;
