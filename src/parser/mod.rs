mod common;
mod java;
pub mod screen_refs;
pub mod signature;
pub mod xml;

pub use common::{node_text, MethodSymbol};
pub use java::{JavaMethod, JavaParser};
pub use screen_refs::ScreenReferenceScanner;
