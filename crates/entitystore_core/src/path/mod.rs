//! Path containment for file access under a trusted root.

pub mod safe_path;
