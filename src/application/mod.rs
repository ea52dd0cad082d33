//! Application services layer scaffolding.

pub mod editorial;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod repos;
