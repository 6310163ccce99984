use crate::arena::Handle;
use crate::red_black_tree::config::Config;
use crate::red_black_tree::tree::{Removal, Search, Tree};
use crate::red_black_tree::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::vec;

/// An ordered set implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree that colors every node red or black
/// and keeps two invariants: no red node has a red child, and every path from a node to an empty
/// position passes through the same number of black nodes. Together these bound the height of
/// the tree by `2 * log2(n + 1)`.
///
/// Elements are ordered by a comparator, which defaults to their `Ord` implementation. When the
/// secondary index is enabled in the `Config`, the set also keeps a hash map from each element
/// to its node so membership tests do not descend the tree. The comparator must agree with the
/// element's `Eq` implementation.
///
/// # Examples
///
/// ```
/// use balanced_collections::red_black_tree::{Error, RedBlackSet};
///
/// let mut set = RedBlackSet::new();
/// set.insert(0).unwrap();
/// set.insert(3).unwrap();
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.insert(3), Err(Error::DuplicateKey));
///
/// assert_eq!(set.min(), Ok(&0));
/// assert_eq!(set.next_higher(&0), Some(&3));
///
/// assert_eq!(set.remove(&0), Ok(0));
/// assert_eq!(set.remove(&1), Err(Error::NotFound));
/// ```
pub struct RedBlackSet<T, C = fn(&T, &T) -> Ordering> {
    tree: Tree<T>,
    len: usize,
    index: Option<HashMap<T, Handle>>,
    compare: C,
}

impl<T> RedBlackSet<T>
where
    T: Ord,
{
    /// Constructs a new, empty `RedBlackSet<T>` ordered by `T`'s `Ord` implementation, without a
    /// secondary index.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_parts(Config::new(), T::cmp)
    }

    /// Constructs a new, empty `RedBlackSet<T>` ordered by `T`'s `Ord` implementation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the configuration is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::{Config, RedBlackSet};
    ///
    /// let set = RedBlackSet::<u32>::with_config(Config::new().secondary_index(true));
    /// assert!(set.is_ok());
    ///
    /// let set = RedBlackSet::<u32>::with_config(Config::new().chunk_size(0));
    /// assert!(set.is_err());
    /// ```
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_comparator(config, T::cmp)
    }
}

impl<T, C> RedBlackSet<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Constructs a new, empty `RedBlackSet<T, C>` that orders its elements with `compare`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the configuration is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::{Config, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::with_comparator(Config::new(), |a: &u32, b: &u32| b.cmp(a))
    ///     .unwrap();
    /// set.insert(1).unwrap();
    /// set.insert(2).unwrap();
    /// assert_eq!(set.min(), Ok(&2));
    /// ```
    pub fn with_comparator(config: Config, compare: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, compare))
    }

    fn from_parts(config: Config, compare: C) -> Self {
        RedBlackSet {
            tree: Tree::new(config.chunk_size),
            len: 0,
            index: if config.secondary_index {
                Some(HashMap::new())
            } else {
                None
            },
            compare,
        }
    }
}

impl<T, C> RedBlackSet<T, C>
where
    T: Hash + Eq + Clone,
    C: Fn(&T, &T) -> Ordering,
{
    fn locate(&self, value: &T) -> Option<Handle> {
        match self.index {
            Some(ref index) => index.get(value).copied(),
            None => self.tree.find(value, &self.compare),
        }
    }

    /// Inserts a value into the set.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateKey` if the value is already in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::{Error, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.insert(1), Ok(()));
    /// assert!(set.contains(&1));
    /// assert_eq!(set.insert(1), Err(Error::DuplicateKey));
    /// ```
    pub fn insert(&mut self, value: T) -> Result<()> {
        let slot = match self.tree.search(&value, &self.compare) {
            Search::Found(_) => return Err(Error::DuplicateKey),
            Search::Vacant(slot) => slot,
        };
        log::debug!("inserting into red black tree of {} nodes", self.len);

        let key = self.index.as_ref().map(|_| value.clone());
        let handle = self.tree.insert(value, slot);
        if let (Some(index), Some(key)) = (self.index.as_mut(), key) {
            index.insert(key, handle);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes a value from the set and returns it.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyTree` if the set is empty and `Error::NotFound` if the value is not
    /// in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::{Error, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.remove(&1), Err(Error::EmptyTree));
    /// set.insert(1).unwrap();
    /// assert_eq!(set.remove(&2), Err(Error::NotFound));
    /// assert_eq!(set.remove(&1), Ok(1));
    /// ```
    pub fn remove(&mut self, value: &T) -> Result<T> {
        if self.tree.root.is_none() {
            return Err(Error::EmptyTree);
        }
        let handle = self.locate(value).ok_or(Error::NotFound)?;
        log::debug!("removing {:?} from red black tree of {} nodes", handle, self.len);

        let Removal { value, relocated } = self.tree.remove(handle);
        if let Some(ref mut index) = self.index {
            index.remove(&value);
            if let Some(relocated) = relocated {
                if let Some(entry) = index.get_mut(self.tree.value(relocated)) {
                    *entry = relocated;
                }
            }
        }
        self.len -= 1;
        Ok(value)
    }

    /// Checks if a value exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.locate(value).is_some()
    }

    /// Returns the greatest value in the set that is less than `value`. Returns `None` if
    /// `value` is not in the set or is its minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    /// assert_eq!(set.next_lower(&3), Some(&1));
    /// assert_eq!(set.next_lower(&1), None);
    /// assert_eq!(set.next_lower(&2), None);
    /// ```
    pub fn next_lower(&self, value: &T) -> Option<&T> {
        self.locate(value)
            .and_then(|handle| self.tree.predecessor(handle))
            .map(|handle| self.tree.value(handle))
    }

    /// Returns the least value in the set that is greater than `value`. Returns `None` if
    /// `value` is not in the set or is its maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    /// assert_eq!(set.next_higher(&1), Some(&3));
    /// assert_eq!(set.next_higher(&3), None);
    /// ```
    pub fn next_higher(&self, value: &T) -> Option<&T> {
        self.locate(value)
            .and_then(|handle| self.tree.successor(handle))
            .map(|handle| self.tree.value(handle))
    }

    /// Exchanges the positions of two values in the set.
    ///
    /// The exchange is only carried out if every value still lies between its in-order
    /// neighbors afterwards. Two distinct values of a strictly ordered set never satisfy this,
    /// so in practice only exchanging a value with itself succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if either value is not in the set and
    /// `Error::InvalidArgument` if the exchange would break the ordering of the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::{Error, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(2).unwrap();
    /// assert_eq!(set.swap(&1, &1), Ok(()));
    /// assert_eq!(set.swap(&1, &3), Err(Error::NotFound));
    /// assert!(set.swap(&1, &2).is_err());
    /// ```
    pub fn swap(&mut self, a: &T, b: &T) -> Result<()> {
        let first = self.locate(a).ok_or(Error::NotFound)?;
        let second = self.locate(b).ok_or(Error::NotFound)?;
        if first == second {
            return Ok(());
        }
        if !self.keeps_order(first, second) || !self.keeps_order(second, first) {
            return Err(Error::InvalidArgument("swap would break the ordering of the set"));
        }

        self.tree.swap_values(first, second);
        if let Some(ref mut index) = self.index {
            index.insert(self.tree.value(first).clone(), first);
            index.insert(self.tree.value(second).clone(), second);
        }
        Ok(())
    }

    // Checks that the value at `other` would fit between the in-order neighbors of `slot`.
    fn keeps_order(&self, slot: Handle, other: Handle) -> bool {
        let incoming = self.tree.value(other);
        let neighbor_value = |handle: Handle| {
            if handle == other {
                self.tree.value(slot)
            } else {
                self.tree.value(handle)
            }
        };

        let above_lower = self.tree.predecessor(slot).map_or(true, |lower| {
            (self.compare)(neighbor_value(lower), incoming) == Ordering::Less
        });
        let below_upper = self.tree.successor(slot).map_or(true, |upper| {
            (self.compare)(incoming, neighbor_value(upper)) == Ordering::Less
        });
        above_lower && below_upper
    }

    /// Validates the structure of the set and returns the number of black nodes on every path
    /// from the root to an empty position. Returns `None` if the search order, the coloring
    /// invariants, the element count, or the secondary index is inconsistent.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.black_height(), Some(0));
    /// set.insert(1).unwrap();
    /// assert_eq!(set.black_height(), Some(1));
    /// ```
    pub fn black_height(&self) -> Option<usize> {
        let black_height = self.tree.black_height(&self.compare)?;
        if self.tree.arena.len() != self.len {
            return None;
        }
        if let Some(ref index) = self.index {
            let consistent = index.len() == self.len
                && index.iter().all(|(value, handle)| {
                    self.tree
                        .arena
                        .get(*handle)
                        .map_or(false, |node| node.value == *value)
                });
            if !consistent {
                return None;
            }
        }
        Some(black_height)
    }
}

impl<T, C> RedBlackSet<T, C> {
    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the set, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(2).unwrap();
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        log::debug!("clearing red black tree of {} nodes", self.len);
        self.tree.clear();
        if let Some(ref mut index) = self.index {
            index.clear();
        }
        self.len = 0;
    }

    /// Returns the number of edges on the longest path from the root to a leaf, or `None` if
    /// the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.height(), None);
    /// set.insert(1).unwrap();
    /// assert_eq!(set.height(), Some(0));
    /// set.insert(2).unwrap();
    /// assert_eq!(set.height(), Some(1));
    /// ```
    pub fn height(&self) -> Option<usize> {
        self.tree.height(self.tree.root)
    }

    /// Returns the minimum value of the set.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyTree` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    /// assert_eq!(set.min(), Ok(&1));
    /// ```
    pub fn min(&self) -> Result<&T> {
        self.tree
            .min()
            .map(|handle| self.tree.value(handle))
            .ok_or(Error::EmptyTree)
    }

    /// Returns the maximum value of the set.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyTree` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    /// assert_eq!(set.max(), Ok(&3));
    /// ```
    pub fn max(&self) -> Result<&T> {
        self.tree
            .max()
            .map(|handle| self.tree.value(handle))
            .ok_or(Error::EmptyTree)
    }

    /// Returns an iterator that visits every node before its subtrees, driven by a stack. The
    /// root is yielded first; afterwards the most recently pushed node is popped, yielded, and
    /// its left and then right child are pushed. The values are not in sorted order; use
    /// `iter` for that.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(2).unwrap();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    ///
    /// assert_eq!(set.traverse().collect::<Vec<&u32>>(), vec![&2, &3, &1]);
    /// ```
    pub fn traverse(&self) -> RedBlackSetTraverse<'_, T> {
        RedBlackSetTraverse {
            tree: &self.tree,
            stack: self.tree.root.into_iter().collect(),
        }
    }

    /// Returns an iterator over the set. The iterator will yield values using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_collections::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackSetIter<'_, T> {
        RedBlackSetIter {
            tree: &self.tree,
            next: self.tree.min(),
            remaining: self.len,
        }
    }
}

impl<T, C> IntoIterator for RedBlackSet<T, C> {
    type IntoIter = RedBlackSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.tree.in_order();
        Self::IntoIter {
            tree: self.tree,
            order: order.into_iter(),
        }
    }
}

impl<'a, T, C> IntoIterator for &'a RedBlackSet<T, C>
where
    T: 'a,
{
    type IntoIter = RedBlackSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackSet<T, C>`.
///
/// This iterator traverses the elements of the set in-order and yields owned values.
pub struct RedBlackSetIntoIter<T> {
    tree: Tree<T>,
    order: vec::IntoIter<Handle>,
}

impl<T> Iterator for RedBlackSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.order.next()?;
        Some(self.tree.arena.free(handle).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

/// An iterator for `RedBlackSet<T, C>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references.
pub struct RedBlackSetIter<'a, T> {
    tree: &'a Tree<T>,
    next: Option<Handle>,
    remaining: usize,
}

impl<'a, T> Iterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let handle = self.next?;
        self.next = tree.successor(handle);
        self.remaining -= 1;
        Some(tree.value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// A stack-driven iterator for `RedBlackSet<T, C>` that yields each node before its subtrees.
pub struct RedBlackSetTraverse<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<Handle>,
}

impl<'a, T> Iterator for RedBlackSetTraverse<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let node = &tree.arena[self.stack.pop()?];
        self.stack.extend(node.left);
        self.stack.extend(node.right);
        Some(&node.value)
    }
}

impl<T> Default for RedBlackSet<T>
where
    T: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}
