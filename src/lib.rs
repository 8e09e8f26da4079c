//! # Rollbook
//!
//! A tenant-scoped school management core: schools own classrooms,
//! classrooms enroll students up to a fixed capacity, and every operation
//! runs behind role- and tenant-scoped authorization.
//!
//! ## Overview
//!
//! - **Authorization**: a pure decision function checks the principal's
//!   role and tenant against the target entity's owning school
//! - **Capacity**: enrollment and transfers re-validate
//!   `enrolled count <= capacity` before every commit
//! - **Soft deletes**: records are marked deleted, never removed, and stay
//!   invisible to uniqueness checks, counts, and default lookups
//! - **Validation**: per-entity rule tables interpreted by a generic engine
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── config.rs         # Environment-backed configuration
//! ├── logging.rs        # Console tracing setup
//! ├── state.rs          # Composition root (explicit dependency injection)
//! ├── validation/       # Declarative field-rule engine
//! ├── utils/            # Authorization, capacity, password, responses
//! └── modules/          # Feature modules
//!     ├── schools/      # Tenant management and admin assignment
//!     ├── classrooms/   # Classrooms and nested resource inventory
//!     ├── students/     # Enrollment, update, transfer
//!     └── users/        # Administrative users
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `model.rs`: entity, DTOs, and the module's validation tables
//! - `service.rs`: business logic returning the outbound envelope
//!
//! The HTTP surface and token issuance live outside this crate. A request
//! handler derives a [`utils::authorization::Principal`] from verified
//! claims and calls service methods; every method returns the
//! [`rollbook_core::ApiResponse`] envelope, never a raw error.
//!
//! Persistence is consumed through the narrow `EntityStore` interface from
//! [`rollbook_store`], with the bundled in-memory backend wired by the
//! composition root in [`state`].

pub mod config;
pub mod logging;
pub mod modules;
pub mod state;
pub mod utils;
pub mod validation;

// Re-export workspace crates for convenience
pub use rollbook_core;
pub use rollbook_store;
