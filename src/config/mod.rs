// Static configuration: role policy per route group

pub mod permissions;

pub use permissions::{is_role_allowed, ResourcePolicy};
