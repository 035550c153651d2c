pub mod input;
pub mod result;
pub mod table;
