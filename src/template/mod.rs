//! Structure templates and where they come from

pub mod library;
pub mod model;

pub use library::{TemplateLibrary, TemplateRegistry};
pub use model::{EntityKind, EntityMarker, Template, ThirdPartyMarker};
