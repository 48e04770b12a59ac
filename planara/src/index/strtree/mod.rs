//! Static spatial indexes packed bottom up from a known set of items.
//!
//! [`StrTree`] is a two dimensional R-tree packed with the Sort-Tile-Recursive algorithm,
//! [`SirTree`] is its one dimensional variant for intervals. Both collect items first and build
//! the tree once, on the first query or an explicit `build` call.

mod nearest;
mod sir_tree;
mod str_tree;
mod tree;

pub use sir_tree::{Interval, SirTree};
pub use str_tree::StrTree;
pub use tree::{ItemsTree, DEFAULT_NODE_CAPACITY};
