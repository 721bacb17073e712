pub mod manifest;
pub mod resolve;
pub mod tree;
