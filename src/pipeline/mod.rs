pub mod extract;
pub mod remap;
pub mod replace;
