use crate::red_black_tree::{Error, Result};

/// Construction options for a `RedBlackSet<T, C>`.
///
/// # Examples
///
/// ```
/// use balanced_collections::red_black_tree::{Config, RedBlackSet};
///
/// let config = Config::new().secondary_index(true).chunk_size(32);
/// let mut set = RedBlackSet::with_config(config).unwrap();
/// set.insert(1).unwrap();
/// assert!(set.contains(&1));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Keeps a hash index from each value to its node. Membership tests become O(1) amortized
    /// at the cost of O(n) extra memory.
    pub secondary_index: bool,
    /// The number of nodes allocated together in one arena chunk.
    pub chunk_size: usize,
}

impl Config {
    pub const DEFAULT_CHUNK_SIZE: usize = 256;

    /// Returns the default configuration: no secondary index and `DEFAULT_CHUNK_SIZE` nodes
    /// per chunk.
    pub fn new() -> Self {
        Config {
            secondary_index: false,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn secondary_index(mut self, enabled: bool) -> Self {
        self.secondary_index = enabled;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be positive"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
