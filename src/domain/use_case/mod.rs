//! Use case domain module

mod entity;
pub mod queries;

pub use entity::*;
