//! Feature modules, one per entity.
//!
//! Each module follows the same structure:
//!
//! - `model.rs`: entity, DTOs, and the declarative validation tables
//! - `service.rs`: business logic returning the outbound envelope

pub mod classrooms;
pub mod schools;
pub mod students;
pub mod users;
