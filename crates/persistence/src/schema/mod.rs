//! Entity descriptor trees and the capability registry.
//!
//! - [`field`] - field kinds, descriptors and one-hop path resolution
//! - [`capabilities`] - validated filterable/sortable/searchable sets
//! - [`registry`] - the startup-built registry shared by list endpoints

pub mod capabilities;
pub mod field;
pub mod registry;

pub use capabilities::EntityCapabilities;
pub use field::{EntitySchema, FieldDescriptor, FieldKind, ResolvedPath};
pub use registry::CapabilityRegistry;
