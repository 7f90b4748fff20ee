//! Sweep harness for comparing heavy-hitter sketches (Count-Min, Count
//! Sketch, Misra-Gries) implemented by an external benchmark program.
//!
//! The harness runs the program across phi and memory-budget grids, parses
//! its text report into [`record::RunRecord`]s and renders comparison charts.

pub mod cli;
pub mod config;
pub mod executor;
pub mod harness;
pub mod parser;
pub mod plot;
pub mod record;
pub mod sketch;
pub mod sweep;
