//! CLI infrastructure for the mazerl toolkit
//!
//! This module provides the command-line interface for solving single mazes
//! and conducting batch experiments.

pub mod commands;
pub mod output;
