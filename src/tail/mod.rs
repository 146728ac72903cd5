//! Live input: following a perf script dump while it grows.

pub mod follower;

pub use follower::{FileFollower, PollBatch};
