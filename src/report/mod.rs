pub mod json;
pub mod overview;
pub mod sorter;
pub mod terminal;
