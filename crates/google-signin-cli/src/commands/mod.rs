pub mod config;
pub mod introspect;
pub mod login;
pub mod proof;
