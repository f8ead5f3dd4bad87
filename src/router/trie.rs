//! Path-segment trie
//!
//! One trie is kept per HTTP method. Each level maps a literal segment to a
//! child and may hold a single parametric child (`:name`). Matching walks the
//! trie once, preferring literal children, and never backtracks.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::RouteEntry;

/// Marker that opens a parametric segment.
pub const PARAM_MARKER: char = ':';

/// Parametric child of a branch and the name its value is captured under.
#[derive(Debug)]
pub struct ParamChild {
    pub name: String,
    pub node: Box<TrieNode>,
}

// == Trie Node ==
#[derive(Debug)]
pub enum TrieNode {
    /// Interior node. `terminal` binds a route that ends exactly here.
    Branch {
        statics: HashMap<String, TrieNode>,
        param: Option<ParamChild>,
        terminal: Option<Arc<RouteEntry>>,
    },
    /// Node with a route and no children yet.
    Leaf(Arc<RouteEntry>),
}

impl Default for TrieNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieNode {
    /// Creates an empty branch.
    pub fn new() -> Self {
        TrieNode::Branch {
            statics: HashMap::new(),
            param: None,
            terminal: None,
        }
    }

    // == Insert ==
    /// Binds `route` at the node reached by `segments`, creating nodes as
    /// needed.
    ///
    /// A parametric segment reuses the existing parametric child. If that
    /// child was registered under another name, the new name replaces it.
    pub fn insert(&mut self, segments: &[&str], route: Arc<RouteEntry>) {
        let Some((segment, rest)) = segments.split_first() else {
            self.bind(route);
            return;
        };

        let (statics, param) = self.promote();
        match segment.strip_prefix(PARAM_MARKER) {
            Some(name) => {
                let child = param.get_or_insert_with(|| ParamChild {
                    name: name.to_string(),
                    node: Box::new(TrieNode::new()),
                });
                if child.name != name {
                    warn!(
                        previous = %child.name,
                        current = %name,
                        url = %route.url,
                        "parameter renamed at shared trie position; earlier routes now capture under the new name"
                    );
                    child.name = name.to_string();
                }
                child.node.insert(rest, route);
            }
            None => statics
                .entry(segment.to_string())
                .or_default()
                .insert(rest, route),
        }
    }

    fn bind(&mut self, route: Arc<RouteEntry>) {
        if self.is_empty_branch() {
            *self = TrieNode::Leaf(route);
            return;
        }
        let slot = match self {
            TrieNode::Leaf(existing) => existing,
            TrieNode::Branch { terminal, .. } => match terminal {
                Some(existing) => existing,
                None => {
                    *terminal = Some(route);
                    return;
                }
            },
        };
        warn!(url = %route.url, method = %route.method, "route registered twice; keeping the latest");
        *slot = route;
    }

    /// Turns a leaf into a branch that keeps the leaf's route as terminal and
    /// returns the branch's children.
    fn promote(&mut self) -> (&mut HashMap<String, TrieNode>, &mut Option<ParamChild>) {
        if let TrieNode::Leaf(route) = self {
            let route = Arc::clone(route);
            *self = TrieNode::Branch {
                statics: HashMap::new(),
                param: None,
                terminal: Some(route),
            };
        }
        match self {
            TrieNode::Branch { statics, param, .. } => (statics, param),
            TrieNode::Leaf(_) => unreachable!("leaf promoted above"),
        }
    }

    fn is_empty_branch(&self) -> bool {
        matches!(
            self,
            TrieNode::Branch { statics, param: None, terminal: None } if statics.is_empty()
        )
    }

    // == Find ==
    /// Walks `segments` and returns the bound route, capturing parameter
    /// values into `params`.
    pub fn find(
        &self,
        segments: &[&str],
        params: &mut HashMap<String, String>,
    ) -> Option<&Arc<RouteEntry>> {
        let mut node = self;
        for segment in segments {
            let TrieNode::Branch { statics, param, .. } = node else {
                return None;
            };
            if let Some(child) = statics.get(*segment) {
                node = child;
            } else if let Some(param) = param {
                params.insert(param.name.clone(), (*segment).to_string());
                node = &*param.node;
            } else {
                return None;
            }
        }
        node.route()
    }

    /// Route bound at this node, if any.
    pub fn route(&self) -> Option<&Arc<RouteEntry>> {
        match self {
            TrieNode::Leaf(route) => Some(route),
            TrieNode::Branch { terminal, .. } => terminal.as_ref(),
        }
    }

    /// Collects every route bound in this subtree.
    pub fn collect<'a>(&'a self, out: &mut Vec<&'a Arc<RouteEntry>>) {
        match self {
            TrieNode::Leaf(route) => out.push(route),
            TrieNode::Branch {
                statics,
                param,
                terminal,
            } => {
                out.extend(terminal.iter());
                for child in statics.values() {
                    child.collect(out);
                }
                if let Some(param) = param {
                    param.node.collect(out);
                }
            }
        }
    }
}
