pub mod grid;
pub mod navigation;
