//! Core types and definitions for the aggro awareness subsystem.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, flags, commands, snapshots, events, constants and the
//! tuning configuration. It has no dependency on the ECS.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod flags;
pub mod state;
pub mod types;
