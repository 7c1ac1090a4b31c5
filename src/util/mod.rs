//! Small browser utilities.

pub mod storage;
