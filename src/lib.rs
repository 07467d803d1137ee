// logwarden - lib.rs
//
// Library entry point, exposing the verification core for integration
// testing and for embedding in test harnesses. The CLI surface lives in
// `main.rs` and is not part of the library.

pub mod core;
pub mod util;
