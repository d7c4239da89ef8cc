pub mod fields;
pub mod path_tree;
pub mod payload;
