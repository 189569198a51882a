//! Command line tracker for personal improvement and preservation areas. Areas and daily records
//! live in one json blob keyed by a short shareable user id, and every view is derived from that
//! data on demand.
//!

pub mod cli;
pub mod identity;
pub mod storage;
pub mod tracker;
pub mod utils;
