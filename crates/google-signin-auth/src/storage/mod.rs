//! Storage traits for accounts, profiles and roles.
//!
//! This module defines the persistence boundary of the provider:
//!
//! - [`AccountRepository`] - account lookup and writes
//! - [`ProfileRepository`] - profile creation
//! - [`RoleResolver`] - resolution of configured role identifiers
//! - [`PersistenceManager`] - flushing pending writes
//!
//! # Implementations
//!
//! [`InMemoryStore`] implements the repositories and the persistence manager
//! for tests and the CLI. Database backends implement the same traits and are
//! expected to enforce uniqueness of `(identifier, provider_name)`.

pub mod account;
pub mod memory;
pub mod persistence;
pub mod profile;
pub mod role;

pub use account::{Account, AccountRepository, SystemLookup};
pub use memory::{InMemoryStore, StaticRoleResolver, StoreStats};
pub use persistence::PersistenceManager;
pub use profile::{ElectronicAddress, ElectronicAddressType, Profile, ProfileRepository};
pub use role::{Role, RoleResolver};
