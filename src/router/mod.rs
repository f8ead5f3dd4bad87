//! Router Module
//!
//! Controllers declare routes; the registry compiles them into per-method
//! segment tries and resolves requests against them.

mod controller;
mod registry;
mod trie;


pub use controller::{Controller, Route};
pub use registry::{normalize_path, RouteDescription, RouteEntry, RouteMatch, RouterRegistry};
pub use trie::{ParamChild, TrieNode, PARAM_MARKER};
