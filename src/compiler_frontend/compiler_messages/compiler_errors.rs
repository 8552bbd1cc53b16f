use crate::compiler_frontend::ast::ast_nodes::TextLocation;
use crate::compiler_frontend::compiler_messages::compiler_warnings::CompilerWarning;
use std::path::{Path, PathBuf};

// The final set of errors and warnings emitted from the compiler
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn from_error(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: CompilerMessages) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Tags every message with the source file it came from.
    pub fn with_file_path(mut self, file_path: &Path) -> Self {
        for error in &mut self.errors {
            error.location.scope = file_path.to_path_buf();
        }
        for warning in &mut self.warnings {
            warning.location.scope = file_path.to_path_buf();
        }
        self
    }
}

/// Every CompilerError is ERROR severity.
/// Warnings are a separate type so nothing can accidentally halt the pipeline on one.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerError {
    pub msg: String,

    // Includes the scope path, which is the original source file when the AST named one.
    pub location: TextLocation,
    pub error_type: ErrorType,
    pub stage: CompilationStage,
}

impl CompilerError {
    pub fn new(
        msg: impl Into<String>,
        location: TextLocation,
        error_type: ErrorType,
        stage: CompilationStage,
    ) -> CompilerError {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            stage,
        }
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn with_stage(mut self, stage: CompilationStage) -> Self {
        self.stage = stage;
        self
    }

    /// Malformed AST input. The external parser handed over something this compiler can't use.
    pub fn new_syntax_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Syntax, CompilationStage::AstInput)
    }

    /// A second declaration of a name that already exists in the same scope
    pub fn new_declaration_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(
            msg,
            location,
            ErrorType::Declaration,
            CompilationStage::SymbolTable,
        )
    }

    /// Unknown identifier, method, class or type
    pub fn new_resolution_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(
            msg,
            location,
            ErrorType::Resolution,
            CompilationStage::Semantic,
        )
    }

    /// Operator, assignment, return or argument type disagreement
    pub fn new_type_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Type, CompilationStage::Semantic)
    }

    /// Any other language rule violation
    pub fn new_rule_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Rule, CompilationStage::Semantic)
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            TextLocation::default(),
            ErrorType::Compiler,
            CompilationStage::Build,
        )
    }

    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            TextLocation::new_file(path),
            ErrorType::File,
            CompilationStage::Build,
        )
    }

    pub fn config_error(path: &Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            TextLocation::new_file(path),
            ErrorType::Config,
            CompilationStage::Build,
        )
    }
}

// Adds more information to the CompilerError
// So it knows what kind of problem it is reporting
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    Syntax,
    Declaration,
    Resolution,
    Type,
    Rule,
    File,
    Config,
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Syntax => "Syntax Error",
        ErrorType::Declaration => "Declaration Conflict",
        ErrorType::Resolution => "Resolution Failure",
        ErrorType::Type => "Type Error",
        ErrorType::Rule => "Language Rule Violation",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
        ErrorType::Compiler => "Compiler Bug",
    }
}

/// Which part of the pipeline produced a message
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CompilationStage {
    AstInput,
    SymbolTable,
    Semantic,
    IrGeneration,
    IrParsing,
    Codegen,
    Optimization,
    Build,
}

pub fn stage_to_str(stage: &CompilationStage) -> &'static str {
    match stage {
        CompilationStage::AstInput => "ast",
        CompilationStage::SymbolTable => "symbol-table",
        CompilationStage::Semantic => "semantic",
        CompilationStage::IrGeneration => "ir-generation",
        CompilationStage::IrParsing => "ir-parsing",
        CompilationStage::Codegen => "codegen",
        CompilationStage::Optimization => "optimization",
        CompilationStage::Build => "build",
    }
}

/// Returns a new internal CompilerError for the given stage.
///
/// These are fatal: they mean a previous stage produced something it should never have produced.
///
/// Usage: `return_compiler_error!(CompilationStage::Codegen, "No template for {}", kind)`;
#[macro_export]
macro_rules! return_compiler_error {
    ($stage:expr, $($arg:tt)+) => {
        return Err(
            $crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::compiler_error(
                format!($($arg)+),
            )
            .with_stage($stage),
        )
    };
}

/// Returns a new CompilerError for malformed AST input.
///
/// Usage: `return_syntax_error!(format!("BinOp expects 2 children, found {}", n), location)`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $location:expr) => {
        return Err(
            $crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::new_syntax_error(
                $msg, $location,
            ),
        )
    };
}

/// Returns a new CompilerError for the file system.
///
/// Usage: `return_file_error!(path, "message")`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {
        return Err(
            $crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::file_error(
                $path, $msg,
            ),
        )
    };
}
