//! Ordered collections backed by a red black tree.
//!
//! The tree stores its nodes in a [`TypedArena`](arena/struct.TypedArena.html) and links them
//! with stable handles, so every node can reach its parent without shared ownership.

pub mod arena;
pub mod red_black_tree;
