mod file_finder;
mod scanner;
mod tree;

pub use file_finder::JavaSourceFinder;
pub use scanner::{ScanResult, Scanner, SCAN_WORK};
pub use tree::{ProjectTree, TreeEntry};
