//! Game catalog domain logic.
//!
//! Slug assignment, installer script validation, edit guards and the form
//! cleaning pipeline. Everything here is synchronous and operates on records
//! the caller has already fetched; there are no database dependencies.

pub mod edit;
pub mod error;
pub mod forms;
pub mod game;
pub mod installer;
pub mod search;
pub mod slug;
pub mod text;
pub mod types;
pub mod yaml;
