//! Shared fixtures and assertions for integration tests.
#![allow(dead_code)]

pub mod plan_assertions;
pub mod plan_fixtures;
