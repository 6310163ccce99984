use crate::arena::{Handle, TypedArena};
use crate::red_black_tree::node::{Color, Node, Side};
use std::cmp::{self, Ordering};
use std::mem;

/// The node graph of a red black tree.
///
/// Nodes are stored in an arena and refer to each other by handle. The tree owns the root, each
/// node owns the nodes in its `left` and `right` slots, and a node is only freed once it has
/// been unlinked from its parent.
pub struct Tree<T> {
    pub arena: TypedArena<Node<T>>,
    pub root: Option<Handle>,
}

/// Where a search for a value ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Search {
    Found(Handle),
    /// The value is absent and would be attached at the given child slot, or as the root if
    /// the tree is empty.
    Vacant(Option<(Handle, Side)>),
}

/// The outcome of a single double black repair step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Repair {
    Resolved,
    /// The black height deficit remains at the given node.
    Propagate(Handle),
}

/// A value removed from the tree.
pub struct Removal<T> {
    pub value: T,
    /// The node that received its in-order predecessor's value when the removed node had two
    /// children.
    pub relocated: Option<Handle>,
}

impl<T> Tree<T> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    pub fn value(&self, handle: Handle) -> &T {
        &self.arena[handle].value
    }

    /// Empty positions count as black.
    pub fn color(&self, node: Option<Handle>) -> Color {
        node.map_or(Color::Black, |handle| self.arena[handle].color)
    }

    pub fn is_red(&self, node: Option<Handle>) -> bool {
        self.color(node) == Color::Red
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.arena[handle].color = color;
    }

    fn swap_colors(&mut self, a: Handle, b: Handle) {
        let color = self.arena[a].color;
        self.arena[a].color = self.arena[b].color;
        self.arena[b].color = color;
    }

    // precondition: `child` is a child of `parent`
    fn side_in(&self, parent: Handle, child: Handle) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Points whatever held `old` (its parent's child slot, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_in(parent, old);
                *self.arena[parent].child_mut(side) = new;
            },
        }
    }

    /// Moves `pivot` down toward `direction`. The pivot's child on the opposite side takes its
    /// place and the displaced inner grandchild is re-parented to the pivot.
    pub fn rotate(&mut self, pivot: Handle, direction: Side) {
        let riser_side = direction.opposite();
        let riser = self.arena[pivot]
            .child(riser_side)
            .expect("Expected the rising child node to be `Some`.");
        log::trace!("rotating {:?} {:?} around {:?}", pivot, direction, riser);

        let inner = self.arena[riser].child(direction);
        *self.arena[pivot].child_mut(riser_side) = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(pivot);
        }

        let parent = self.arena[pivot].parent;
        self.arena[riser].parent = parent;
        self.replace_child(parent, pivot, Some(riser));

        *self.arena[riser].child_mut(direction) = Some(pivot);
        self.arena[pivot].parent = Some(riser);
    }

    pub fn search<F>(&self, value: &T, compare: &F) -> Search
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut slot = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let side = match compare(value, &self.arena[handle].value) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Search::Found(handle),
            };
            slot = Some((handle, side));
            curr = self.arena[handle].child(side);
        }
        Search::Vacant(slot)
    }

    pub fn find<F>(&self, value: &T, compare: &F) -> Option<Handle>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        match self.search(value, compare) {
            Search::Found(handle) => Some(handle),
            Search::Vacant(_) => None,
        }
    }

    /// Attaches a new node holding `value` at `slot` and restores the coloring invariants.
    pub fn insert(&mut self, value: T, slot: Option<(Handle, Side)>) -> Handle {
        let handle = self
            .arena
            .allocate(Node::new(value, slot.map(|(parent, _)| parent)));
        match slot {
            None => {
                self.set_color(handle, Color::Black);
                self.root = Some(handle);
            },
            Some((parent, side)) => {
                *self.arena[parent].child_mut(side) = Some(handle);
                self.fix_red_red(handle);
            },
        }
        handle
    }

    fn fix_red_red(&mut self, mut node: Handle) {
        while let Some(parent) = self.arena[node].parent {
            if self.arena[node].color == Color::Black || self.arena[parent].color == Color::Black {
                break;
            }

            let grandparent = self.arena[parent]
                .parent
                .expect("Expected a red node to have a parent.");
            let parent_side = self.side_in(grandparent, parent);
            let uncle = self.arena[grandparent].child(parent_side.opposite());

            if let Some(uncle) = uncle.filter(|uncle| self.arena[*uncle].color == Color::Red) {
                log::trace!("red uncle {:?}, recoloring", uncle);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                if self.root != Some(grandparent) {
                    self.set_color(grandparent, Color::Red);
                }
                node = grandparent;
                continue;
            }

            let node_side = self.side_in(parent, node);
            if node_side == parent_side {
                self.swap_colors(parent, grandparent);
                self.rotate(grandparent, parent_side.opposite());
                node = parent;
            } else {
                self.rotate(parent, parent_side);
                self.swap_colors(node, grandparent);
                self.rotate(grandparent, parent_side.opposite());
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Removes the node at `handle` and returns its value.
    ///
    /// A node with two children is kept in place: its in-order predecessor is unlinked instead
    /// and the predecessor's value moves into this node.
    pub fn remove(&mut self, handle: Handle) -> Removal<T> {
        let node = &self.arena[handle];
        if let (Some(left), Some(_)) = (node.left, node.right) {
            let predecessor = self.max_from(left);
            let value = self.unlink(predecessor);
            return Removal {
                value: mem::replace(&mut self.arena[handle].value, value),
                relocated: Some(handle),
            };
        }

        Removal {
            value: self.unlink(handle),
            relocated: None,
        }
    }

    // precondition: the node has at most one child
    fn unlink(&mut self, handle: Handle) -> T {
        let color = self.arena[handle].color;
        let child = self.arena[handle].left.or(self.arena[handle].right);

        match child {
            Some(child) => {
                let parent = self.arena[handle].parent;
                self.arena[child].parent = parent;
                self.replace_child(parent, handle, Some(child));
                if color == Color::Black {
                    if self.arena[child].color == Color::Red {
                        self.set_color(child, Color::Black);
                    } else {
                        self.fix_double_black(child);
                    }
                }
            },
            None => {
                if color == Color::Black {
                    self.fix_double_black(handle);
                }
                let parent = self.arena[handle].parent;
                self.replace_child(parent, handle, None);
            },
        }

        self.arena.free(handle).value
    }

    fn fix_double_black(&mut self, mut node: Handle) {
        while let Repair::Propagate(next) = self.repair_double_black(node) {
            node = next;
        }
    }

    /// Applies the first matching repair case to a node that is one black short of its
    /// sibling's subtree.
    pub fn repair_double_black(&mut self, node: Handle) -> Repair {
        let parent = match self.arena[node].parent {
            None => {
                log::trace!("double black case 1 at root {:?}", node);
                self.set_color(node, Color::Black);
                return Repair::Resolved;
            },
            Some(parent) => parent,
        };

        let side = self.side_in(parent, node);
        let sibling = self.arena[parent]
            .child(side.opposite())
            .expect("Expected a double black node to have a sibling.");
        let near = self.arena[sibling].child(side);
        let far = self.arena[sibling].child(side.opposite());
        let parent_color = self.arena[parent].color;
        let nephews_black = !self.is_red(near) && !self.is_red(far);

        match (parent_color, self.arena[sibling].color) {
            (Color::Black, Color::Red) if nephews_black => {
                log::trace!("double black case 2 at {:?}", node);
                self.set_color(parent, Color::Red);
                self.set_color(sibling, Color::Black);
                self.rotate(parent, side);
                Repair::Propagate(node)
            },
            (Color::Black, Color::Black) if nephews_black => {
                log::trace!("double black case 3 at {:?}", node);
                self.set_color(sibling, Color::Red);
                Repair::Propagate(parent)
            },
            (Color::Red, Color::Black) if nephews_black => {
                log::trace!("double black case 4 at {:?}", node);
                self.swap_colors(parent, sibling);
                Repair::Resolved
            },
            (_, Color::Black) if !self.is_red(far) => {
                log::trace!("double black case 5 at {:?}", node);
                let near = near.expect("Expected the near child of the sibling to be red.");
                self.set_color(sibling, Color::Red);
                self.set_color(near, Color::Black);
                self.rotate(sibling, side.opposite());
                Repair::Propagate(node)
            },
            (_, Color::Black) => {
                log::trace!("double black case 6 at {:?}", node);
                let far = far.expect("Expected the far child of the sibling to be red.");
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.set_color(far, Color::Black);
                self.rotate(parent, side);
                Repair::Resolved
            },
            (_, Color::Red) => {
                panic!("Expected a red sibling to have a black parent and black children.")
            },
        }
    }

    pub fn min_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.arena[handle].left {
            handle = left;
        }
        handle
    }

    pub fn max_from(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.arena[handle].right {
            handle = right;
        }
        handle
    }

    pub fn min(&self) -> Option<Handle> {
        self.root.map(|root| self.min_from(root))
    }

    pub fn max(&self) -> Option<Handle> {
        self.root.map(|root| self.max_from(root))
    }

    /// Returns the in-order neighbor of `handle` on the given side: the extreme node of that
    /// subtree, or else the nearest ancestor reached from the other side.
    fn neighbor(&self, mut handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.arena[handle].child(side) {
            return Some(match side {
                Side::Left => self.max_from(child),
                Side::Right => self.min_from(child),
            });
        }

        while let Some(parent) = self.arena[handle].parent {
            if self.arena[parent].child(side.opposite()) == Some(handle) {
                return Some(parent);
            }
            handle = parent;
        }
        None
    }

    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Left)
    }

    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Right)
    }

    /// Returns the number of edges on the longest path from `node` to a leaf.
    pub fn height(&self, node: Option<Handle>) -> Option<usize> {
        node.map(|handle| {
            let node = &self.arena[handle];
            match cmp::max(self.height(node.left), self.height(node.right)) {
                None => 0,
                Some(height) => height + 1,
            }
        })
    }

    /// Exchanges the values stored at two nodes without moving the nodes.
    pub fn swap_values(&mut self, a: Handle, b: Handle)
    where
        T: Clone,
    {
        let value = self.arena[a].value.clone();
        let value = mem::replace(&mut self.arena[b].value, value);
        self.arena[a].value = value;
    }

    /// Returns the handles of every node in ascending order.
    pub fn in_order(&self) -> Vec<Handle> {
        let mut handles = Vec::with_capacity(self.arena.len());
        let mut curr = self.min();
        while let Some(handle) = curr {
            handles.push(handle);
            curr = self.successor(handle);
        }
        handles
    }

    /// Checks the search order, the coloring rules, the parent links, and that every live node
    /// is reachable from the root. Returns the number of black nodes on each path from the root
    /// to an empty position.
    pub fn black_height<F>(&self, compare: &F) -> Option<usize>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let root = match self.root {
            None => return if self.arena.is_empty() { Some(0) } else { None },
            Some(root) => root,
        };
        let node = self.arena.get(root)?;
        if node.color != Color::Black || node.parent.is_some() {
            return None;
        }

        let mut count = 0;
        let black_height = self.check(root, None, None, compare, &mut count)?;
        if count == self.arena.len() {
            Some(black_height)
        } else {
            None
        }
    }

    fn check<'a, F>(
        &'a self,
        handle: Handle,
        lower: Option<&'a T>,
        upper: Option<&'a T>,
        compare: &F,
        count: &mut usize,
    ) -> Option<usize>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let node = self.arena.get(handle)?;
        *count += 1;

        let above_lower = lower.map_or(true, |lower| compare(lower, &node.value) == Ordering::Less);
        let below_upper = upper.map_or(true, |upper| compare(&node.value, upper) == Ordering::Less);
        if !above_lower || !below_upper {
            return None;
        }

        let mut heights = [0; 2];
        for (i, child) in [node.left, node.right].iter().enumerate() {
            if let Some(child) = *child {
                let child_node = self.arena.get(child)?;
                if child_node.parent != Some(handle) {
                    return None;
                }
                if node.color == Color::Red && child_node.color == Color::Red {
                    return None;
                }
                heights[i] = if i == 0 {
                    self.check(child, lower, Some(&node.value), compare, count)?
                } else {
                    self.check(child, Some(&node.value), upper, compare, count)?
                };
            }
        }

        if heights[0] != heights[1] {
            return None;
        }
        Some(heights[0] + if node.color == Color::Black { 1 } else { 0 })
    }
}
