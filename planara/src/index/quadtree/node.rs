use planara_types::{Coordinate, Envelope};

use super::key::Key;
use crate::error::PlanaraError;
use crate::index::interval_size;

/// Position of a node in the tree.
#[derive(Debug, Clone)]
pub(super) enum NodeKind {
    /// The root covers the whole plane and is split at the origin.
    Root,
    /// A square cell of side `2^level`.
    Interior {
        env: Envelope,
        centre: Coordinate,
        level: i32,
    },
}

/// A node of the quadtree: a set of items and up to 4 children.
///
/// Quadrants are numbered `0 = SW`, `1 = SE`, `2 = NW`, `3 = NE`.
#[derive(Debug, Clone)]
pub(super) struct Node<T> {
    kind: NodeKind,
    items: Vec<T>,
    subnodes: [Option<Box<Node<T>>>; 4],
}

impl<T> Node<T> {
    pub fn root() -> Self {
        Self::with_kind(NodeKind::Root)
    }

    fn interior(env: Envelope, level: i32) -> Self {
        let centre = Coordinate::new(
            (env.min_x() + env.max_x()) / 2.0,
            (env.min_y() + env.max_y()) / 2.0,
        );
        Self::with_kind(NodeKind::Interior { env, centre, level })
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            items: vec![],
            subnodes: [None, None, None, None],
        }
    }

    fn create_node(env: &Envelope) -> Result<Self, PlanaraError> {
        let key = Key::new(env)?;
        Ok(Self::interior(key.env, key.level))
    }

    /// Creates a node containing both the given node and the envelope.
    fn create_expanded(
        node: Option<Box<Node<T>>>,
        add_env: &Envelope,
    ) -> Result<Self, PlanaraError> {
        let mut expand_env = *add_env;
        if let Some(node) = &node {
            expand_env.expand_to_include(&node.env());
        }

        let mut larger = Self::create_node(&expand_env)?;
        if let Some(node) = node {
            larger.insert_node(node)?;
        }
        Ok(larger)
    }

    fn centre(&self) -> Coordinate {
        match &self.kind {
            NodeKind::Root => Coordinate::new(0.0, 0.0),
            NodeKind::Interior { centre, .. } => *centre,
        }
    }

    fn env(&self) -> Envelope {
        match &self.kind {
            NodeKind::Root => Envelope::null(),
            NodeKind::Interior { env, .. } => *env,
        }
    }

    fn level(&self) -> i32 {
        match &self.kind {
            NodeKind::Root => i32::MAX,
            NodeKind::Interior { level, .. } => *level,
        }
    }

    fn is_search_match(&self, search_env: &Envelope) -> bool {
        match &self.kind {
            NodeKind::Root => true,
            NodeKind::Interior { env, .. } => env.intersects(search_env),
        }
    }

    /// Index of the quadrant that fully contains the envelope, or `None` if the envelope crosses
    /// one of the centre lines.
    fn subnode_index(env: &Envelope, centre: &Coordinate) -> Option<usize> {
        let mut index = None;
        if env.min_x() >= centre.x {
            if env.min_y() >= centre.y {
                index = Some(3);
            }
            if env.max_y() <= centre.y {
                index = Some(1);
            }
        }
        if env.max_x() <= centre.x {
            if env.min_y() >= centre.y {
                index = Some(2);
            }
            if env.max_y() <= centre.y {
                index = Some(0);
            }
        }
        index
    }

    /// Inserts an item into the root, growing the tree as needed.
    pub fn insert_into_root(&mut self, item_env: &Envelope, item: T) -> Result<(), PlanaraError> {
        let Some(index) = Self::subnode_index(item_env, &self.centre()) else {
            // Items crossing the axes are stored in the root itself.
            self.items.push(item);
            return Ok(());
        };

        let slot = &mut self.subnodes[index];
        let node = match slot.take() {
            Some(node) if node.env().contains(item_env) => node,
            other => {
                let larger = Self::create_expanded(other, item_env)?;
                log::trace!("Quadtree root quadrant {index} expanded to {:?}", larger.env());
                Box::new(larger)
            }
        };

        slot.insert(node).insert_contained(item_env, item)
    }

    fn insert_contained(&mut self, item_env: &Envelope, item: T) -> Result<(), PlanaraError> {
        if !self.env().contains(item_env) {
            return Err(PlanaraError::Assertion(format!(
                "quadtree node {:?} does not contain item envelope {item_env:?}",
                self.env()
            )));
        }

        // Zero width intervals would be subdivided forever, so such items go to the smallest
        // existing node instead.
        let is_zero_x = interval_size::is_zero_width(item_env.min_x(), item_env.max_x());
        let is_zero_y = interval_size::is_zero_width(item_env.min_y(), item_env.max_y());
        if is_zero_x || is_zero_y {
            self.add_to_smallest_existing(item_env, item);
        } else {
            self.add_to_smallest_created(item_env, item);
        }
        Ok(())
    }

    fn add_to_smallest_existing(&mut self, search_env: &Envelope, item: T) {
        if let Some(index) = Self::subnode_index(search_env, &self.centre()) {
            if let Some(child) = self.subnodes[index].as_deref_mut() {
                child.add_to_smallest_existing(search_env, item);
                return;
            }
        }
        self.items.push(item);
    }

    fn add_to_smallest_created(&mut self, search_env: &Envelope, item: T) {
        match Self::subnode_index(search_env, &self.centre()) {
            Some(index) => self
                .get_subnode(index)
                .add_to_smallest_created(search_env, item),
            None => self.items.push(item),
        }
    }

    fn get_subnode(&mut self, index: usize) -> &mut Node<T> {
        let (env, centre, level) = (self.env(), self.centre(), self.level());
        self.subnodes[index]
            .get_or_insert_with(|| Box::new(Self::quadrant(&env, &centre, level, index)))
    }

    fn create_subnode(&self, index: usize) -> Node<T> {
        Self::quadrant(&self.env(), &self.centre(), self.level(), index)
    }

    fn quadrant(env: &Envelope, centre: &Coordinate, level: i32, index: usize) -> Node<T> {
        let (min_x, max_x, min_y, max_y) = match index {
            0 => (env.min_x(), centre.x, env.min_y(), centre.y),
            1 => (centre.x, env.max_x(), env.min_y(), centre.y),
            2 => (env.min_x(), centre.x, centre.y, env.max_y()),
            _ => (centre.x, env.max_x(), centre.y, env.max_y()),
        };
        Node::interior(Envelope::new(min_x, max_x, min_y, max_y), level - 1)
    }

    fn insert_node(&mut self, node: Box<Node<T>>) -> Result<(), PlanaraError> {
        let node_env = node.env();
        if !self.env().contains(&node_env) {
            return Err(PlanaraError::Assertion(format!(
                "quadtree node {:?} does not contain node {node_env:?}",
                self.env()
            )));
        }

        let Some(index) = Self::subnode_index(&node_env, &self.centre()) else {
            return Err(PlanaraError::Assertion(format!(
                "quadtree node {node_env:?} is not aligned to the parent grid"
            )));
        };

        if node.level() == self.level() - 1 {
            self.subnodes[index] = Some(node);
        } else {
            let mut child = self.create_subnode(index);
            child.insert_node(node)?;
            self.subnodes[index] = Some(Box::new(child));
        }
        Ok(())
    }

    /// Removes a single item equal to the given one. Children left without items and children
    /// are pruned.
    pub fn remove(&mut self, item_env: &Envelope, item: &T) -> bool
    where
        T: PartialEq,
    {
        if !self.is_search_match(item_env) {
            return false;
        }

        for slot in &mut self.subnodes {
            let Some(node) = slot else {
                continue;
            };
            if node.remove(item_env, item) {
                if node.is_prunable() {
                    *slot = None;
                }
                return true;
            }
        }

        match self.items.iter().position(|v| v == item) {
            Some(position) => {
                self.items.remove(position);
                true
            }
            None => false,
        }
    }

    fn has_children(&self) -> bool {
        self.subnodes.iter().any(Option::is_some)
    }

    fn is_prunable(&self) -> bool {
        !(self.has_children() || !self.items.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.subnodes.iter().flatten().all(|node| node.is_empty())
    }

    pub fn visit<'a>(&'a self, search_env: &Envelope, visitor: &mut impl FnMut(&'a T)) {
        if !self.is_search_match(search_env) {
            return;
        }

        for item in &self.items {
            visitor(item);
        }
        for node in self.subnodes.iter().flatten() {
            node.visit(search_env, visitor);
        }
    }

    pub fn visit_all<'a>(&'a self, visitor: &mut impl FnMut(&'a T)) {
        for item in &self.items {
            visitor(item);
        }
        for node in self.subnodes.iter().flatten() {
            node.visit_all(visitor);
        }
    }

    pub fn depth(&self) -> usize {
        self.subnodes
            .iter()
            .flatten()
            .map(|node| node.depth())
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn size(&self) -> usize {
        self.items.len()
            + self
                .subnodes
                .iter()
                .flatten()
                .map(|node| node.size())
                .sum::<usize>()
    }
}
