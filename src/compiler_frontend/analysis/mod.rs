pub mod name_resolution;
pub mod semantic_checker;
