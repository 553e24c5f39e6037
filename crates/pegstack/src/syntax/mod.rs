//! # Parse Trees
//!
//! With [`ParserConfig::build_parse_tree`](crate::ParserConfig::build_parse_tree)
//! set, every rule and label that matches becomes a [`ParseNode`] spanning
//! the text it consumed. [`RuleOptions`](crate::RuleOptions) shape the tree:
//!
//! - `suppress_node`: no node for the rule or anything inside it
//! - `suppress_subnodes`: a node for the rule, without children
//! - `skip_node`: no node for the rule; its children attach to the parent

mod builder;
mod node;

pub(crate) use builder::TreeBuilder;
pub use node::{Descendants, ParseNode};
