pub mod parser;
pub mod range;
pub mod resolver;

// Re-export main types and functions
pub use parser::{destination_host, read_lines, split_host_port};
pub use range::{AddressFamily, RangeIndex};
pub use resolver::{NameResolver, SystemResolver};
