//! jmmc
//!
//! The back half of a compiler for Java--, a small Java-like teaching language.
//! Consumes the AST produced by an external parser, builds the symbol table,
//! runs semantic analysis, lowers to three-address IR and emits Jasmin assembly.

pub mod compiler_frontend;

pub mod backends {
    pub mod jasmin;
}

pub mod build_system {
    pub mod build;
    pub mod output;
}

pub mod projects {
    pub mod cli;
    pub mod settings;
}

pub mod compiler_tests {
    pub mod integration_test_runner;
}

pub use build_system::build::{BuildOutput, compile_unit, compile_units};
pub use compiler_frontend::{CompilerFrontend, Flag};
