use std::fmt::Debug;
use std::sync::OnceLock;

use crate::error::PlanaraError;

/// Bounds of the boundables of a packed tree.
pub(super) trait Bounds: Copy + Debug {
    fn merge(&self, other: &Self) -> Self;

    fn intersects(&self, other: &Self) -> bool;

    /// Groups the boundables of one level under new parent nodes of the level `level`.
    fn create_parents(
        children: Vec<Boundable<Self>>,
        capacity: usize,
        level: i32,
    ) -> Vec<Node<Self>>;
}

/// An inner node or a leaf item of a packed tree.
#[derive(Debug, Clone)]
pub(super) enum Boundable<B> {
    Node(Node<B>),
    /// Item stored in the tree, referencing the entry with the given index.
    Item { bounds: B, index: usize },
}

impl<B> Boundable<B> {
    pub fn bounds(&self) -> &B {
        match self {
            Boundable::Node(node) => &node.bounds,
            Boundable::Item { bounds, .. } => bounds,
        }
    }
}

/// Inner node of a packed tree. Leaf nodes have level 0 and contain only items.
///
/// The bounds are computed when the node is created and are not updated when items are removed.
#[derive(Debug, Clone)]
pub(super) struct Node<B> {
    pub bounds: B,
    pub level: i32,
    pub children: Vec<Boundable<B>>,
}

impl<B: Bounds> Node<B> {
    /// Creates a node from a non-empty list of children, or `None` if the list is empty.
    pub fn new(level: i32, children: Vec<Boundable<B>>) -> Option<Self> {
        let bounds = children
            .iter()
            .map(|child| *child.bounds())
            .reduce(|acc, b| acc.merge(&b))?;
        Some(Self {
            bounds,
            level,
            children,
        })
    }
}

impl<B> Node<B> {
    fn depth(&self) -> usize {
        self.children
            .iter()
            .filter_map(|child| match child {
                Boundable::Node(node) => Some(node.depth()),
                Boundable::Item { .. } => None,
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    fn size(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Boundable::Node(node) => node.size(),
                Boundable::Item { .. } => 1,
            })
            .sum()
    }
}

/// Packs boundables into parent nodes in the given order, `capacity` children per node.
pub(super) fn pack<B: Bounds>(
    children: Vec<Boundable<B>>,
    capacity: usize,
    level: i32,
) -> Vec<Node<B>> {
    let mut parents = vec![];
    let mut children = children.into_iter();
    loop {
        let group: Vec<_> = children.by_ref().take(capacity).collect();
        match Node::new(level, group) {
            Some(node) => parents.push(node),
            None => break,
        }
    }
    parents
}

/// Nested representation of the items of a tree, following its node structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemsTree<'a, T> {
    /// An item.
    Item(&'a T),
    /// A node with its non-empty children.
    Node(Vec<ItemsTree<'a, T>>),
}

#[derive(Debug, Clone)]
struct Entry<B, T> {
    bounds: B,
    // `None` once the item has been removed from the tree.
    item: Option<T>,
}

/// Bulk loaded tree shared by the STR and SIR trees.
///
/// Items are collected until the first query, at which point the tree is packed bottom up. The
/// tree cannot be changed after that except by removing items.
#[derive(Debug, Clone)]
pub(super) struct Tree<B, T> {
    capacity: usize,
    entries: Vec<Entry<B, T>>,
    root: OnceLock<Option<Node<B>>>,
}

/// Node capacity used when none is given.
pub const DEFAULT_NODE_CAPACITY: usize = 10;

impl<B: Bounds, T> Default for Tree<B, T> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_NODE_CAPACITY,
            entries: vec![],
            root: OnceLock::new(),
        }
    }
}

impl<B: Bounds, T> Tree<B, T> {
    pub fn new(capacity: usize) -> Result<Self, PlanaraError> {
        if capacity < 2 {
            return Err(PlanaraError::Assertion(format!(
                "node capacity must be greater than 1, got {capacity}"
            )));
        }

        Ok(Self {
            capacity,
            ..Self::default()
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_built(&self) -> bool {
        self.root.get().is_some()
    }

    pub fn insert(&mut self, bounds: B, item: T) -> Result<(), PlanaraError> {
        if self.is_built() {
            return Err(PlanaraError::TreeAlreadyBuilt);
        }

        self.entries.push(Entry {
            bounds,
            item: Some(item),
        });
        Ok(())
    }

    /// Builds the tree if it is not built yet.
    pub fn build(&self) {
        self.root();
    }

    pub fn root(&self) -> Option<&Node<B>> {
        self.root
            .get_or_init(|| {
                let root = create_root(&self.entries, self.capacity);
                if let Some(root) = &root {
                    log::debug!(
                        "Packed tree built: {} items, root level {}, capacity {}",
                        self.entries.len(),
                        root.level,
                        self.capacity
                    );
                }
                root
            })
            .as_ref()
    }

    /// Item with the given entry index, if it is still in the tree.
    pub fn item(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(|entry| entry.item.as_ref())
    }

    pub fn query_with<'a>(&'a self, search: &B, visitor: &mut impl FnMut(&'a T)) {
        let Some(root) = self.root() else {
            return;
        };
        if root.bounds.intersects(search) {
            self.query_node(root, search, visitor);
        }
    }

    fn query_node<'a>(&'a self, node: &'a Node<B>, search: &B, visitor: &mut impl FnMut(&'a T)) {
        for child in &node.children {
            if !child.bounds().intersects(search) {
                continue;
            }

            match child {
                Boundable::Node(node) => self.query_node(node, search, visitor),
                Boundable::Item { index, .. } => {
                    if let Some(item) = self.item(*index) {
                        visitor(item);
                    }
                }
            }
        }
    }

    pub fn remove(&mut self, search: &B, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.build();
        let entries = &mut self.entries;
        let Some(Some(root)) = self.root.get_mut() else {
            return false;
        };
        if !root.bounds.intersects(search) {
            return false;
        }
        remove_from(root, search, item, entries)
    }

    pub fn size(&self) -> usize {
        self.root().map_or(0, Node::size)
    }

    pub fn depth(&self) -> usize {
        self.root().map_or(0, Node::depth)
    }

    /// Bounds of all boundables at the given level. Level `-1` are the items, `0` the leaf
    /// nodes. Levels below `-1` have no boundables.
    pub fn boundables_at_level(&self, level: i32) -> Vec<B> {
        let mut result = vec![];
        if level < -1 {
            return result;
        }
        if let Some(root) = self.root() {
            collect_at_level(root, level, &mut result);
        }
        result
    }

    pub fn items_tree(&self) -> Vec<ItemsTree<'_, T>> {
        match self.root().and_then(|root| self.node_items(root)) {
            Some(ItemsTree::Node(children)) => children,
            _ => vec![],
        }
    }

    fn node_items<'a>(&'a self, node: &'a Node<B>) -> Option<ItemsTree<'a, T>> {
        let children: Vec<_> = node
            .children
            .iter()
            .filter_map(|child| match child {
                Boundable::Node(node) => self.node_items(node),
                Boundable::Item { index, .. } => self.item(*index).map(ItemsTree::Item),
            })
            .collect();

        if children.is_empty() {
            None
        } else {
            Some(ItemsTree::Node(children))
        }
    }
}

fn create_root<B: Bounds, T>(entries: &[Entry<B, T>], capacity: usize) -> Option<Node<B>> {
    let mut boundables: Vec<_> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| Boundable::Item {
            bounds: entry.bounds,
            index,
        })
        .collect();
    if boundables.is_empty() {
        return None;
    }

    let mut level = -1;
    loop {
        level += 1;
        let mut parents = B::create_parents(boundables, capacity, level);
        if parents.len() <= 1 {
            return parents.pop();
        }
        boundables = parents.into_iter().map(Boundable::Node).collect();
    }
}

fn collect_at_level<B: Copy>(node: &Node<B>, level: i32, result: &mut Vec<B>) {
    if node.level == level {
        result.push(node.bounds);
        return;
    }

    for child in &node.children {
        match child {
            Boundable::Node(node) => collect_at_level(node, level, result),
            Boundable::Item { bounds, .. } => {
                if level == -1 {
                    result.push(*bounds);
                }
            }
        }
    }
}

fn remove_from<B: Bounds, T: PartialEq>(
    node: &mut Node<B>,
    search: &B,
    item: &T,
    entries: &mut [Entry<B, T>],
) -> bool {
    let position = node.children.iter().position(|child| match child {
        Boundable::Item { index, .. } => entries[*index].item.as_ref() == Some(item),
        Boundable::Node(_) => false,
    });
    if let Some(position) = position {
        if let Boundable::Item { index, .. } = node.children.remove(position) {
            entries[index].item = None;
        }
        return true;
    }

    let mut found = None;
    for (position, child) in node.children.iter_mut().enumerate() {
        let Boundable::Node(child) = child else {
            continue;
        };
        if child.bounds.intersects(search) && remove_from(child, search, item, entries) {
            found = Some((position, child.children.is_empty()));
            break;
        }
    }

    match found {
        Some((position, true)) => {
            node.children.remove(position);
            true
        }
        Some((_, false)) => true,
        None => false,
    }
}
