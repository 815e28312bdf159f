//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - An update DTO where the record can be edited in place

pub mod company;
pub mod game;
pub mod game_edit_request;
pub mod installer;
pub mod lookup;
pub mod screenshot;
