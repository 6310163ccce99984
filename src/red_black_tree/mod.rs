//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.

mod config;
mod node;
mod set;
mod tree;

pub use self::config::Config;
pub use self::node::Color;
pub use self::set::{RedBlackSet, RedBlackSetIntoIter, RedBlackSetIter, RedBlackSetTraverse};

use std::error;
use std::fmt;
use std::result;

/// The ways an operation on a `RedBlackSet<T, C>` can fail. A failed operation leaves the set
/// unmodified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The operation requires a non-empty set.
    EmptyTree,
    /// The value is not in the set.
    NotFound,
    /// The value is already in the set.
    DuplicateKey,
    /// A configuration or argument was rejected.
    InvalidArgument(&'static str),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyTree => write!(f, "operation requires a non-empty tree"),
            Error::NotFound => write!(f, "value not found"),
            Error::DuplicateKey => write!(f, "value already present"),
            Error::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display() {
        assert_eq!(Error::NotFound.to_string(), "value not found");
        assert_eq!(
            Error::InvalidArgument("chunk size must be positive").to_string(),
            "invalid argument: chunk size must be positive",
        );
    }
}
