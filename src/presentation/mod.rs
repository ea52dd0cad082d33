//! Askama view models and render helpers.

pub mod editorial;
pub mod views;
