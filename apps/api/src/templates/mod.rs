// Template System: static descriptor catalogue + the pure layout resolver.
// Resolution runs on every read; nothing here performs I/O.

pub mod handlers;
pub mod registry;
pub mod resolver;

pub use registry::{lookup, ImagePosition, Rgb, TemplateDescriptor};
pub use resolver::{resolve_layout, ResolvedLayout};
