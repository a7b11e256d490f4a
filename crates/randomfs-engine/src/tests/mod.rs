//! Tests for the randomfs-engine crate.

mod helpers;
