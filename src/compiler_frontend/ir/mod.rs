pub mod control_flow;
pub(crate) mod expression_lowering;
pub mod ir_builder;
pub mod ir_display;
pub mod ir_nodes;
pub mod ir_parser;
pub mod var_table;

#[cfg(test)]
#[path = "tests/ir_property_tests.rs"]
pub(crate) mod property_tests;
