//! # thumbsweep
//!
//! Finds generated image-size variants ("orphans") whose original file is gone
//! from a year/month media library, archives them into a restorable backup and
//! removes them. Backups can be replayed onto the tree later.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod processing;
pub mod storage;
pub mod ui;
