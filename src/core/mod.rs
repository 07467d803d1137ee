// logwarden - core/mod.rs
//
// Core verification logic: pattern model, directory traversal, per-file
// matching, scan aggregation, and report export. No CLI dependencies.

pub mod discovery;
pub mod matcher;
pub mod pattern;
pub mod report;
pub mod scanner;
