//! Plan document model.
//!
//! A [`Plan`] owns an ordered sequence of typed [`Node`]s. Documents are built
//! by [`Plan::parse`] from a raw JSON structure (optionally filling schema
//! defaults in place first) and turned back into canonical JSON with
//! [`Plan::to_json`].
//!
//! Importers and exporters borrow a plan for the duration of one call; only
//! default-filling (during parse) and ID-filling mutate it.

mod error;
mod node;
mod parse;
mod serialize;

pub use error::ValidationError;
pub use node::{
    Command, LibraryRef, Node, NodeKind, NodeRef, ParamMap, Plan, Segment, Sequence, Station,
};
pub use parse::{ParseOptions, parse_document};
