//! Low-level PDF machinery shared by the merge, overlay and resize
//! operations: loaded-document access, object-table assembly and content
//! stream generation.

pub mod assembler;
pub mod document;
pub mod text;

pub use assembler::DocumentAssembler;
pub use document::DocumentHandle;
