mod node_name;
mod paths;
mod source_type;

pub use node_name::derive_node_name;
pub(crate) use paths::{absolute, normalize, resolve_relative};
pub use source_type::SourceType;
