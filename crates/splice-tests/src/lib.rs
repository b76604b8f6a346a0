//! Integration test crate for Splice.
//!
//! Holds cross-crate tests: timeline laws checked with proptest, and
//! editing/export scenarios run against the in-process fake media tools.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod export;
