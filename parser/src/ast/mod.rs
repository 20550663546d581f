mod nodes;
pub mod visitor;

pub use nodes::*;
