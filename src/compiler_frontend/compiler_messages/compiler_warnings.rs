use crate::compiler_frontend::ast::ast_nodes::TextLocation;
use saying::say;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilerWarning {
    pub msg: String,
    pub location: TextLocation,
    pub warning_kind: WarningKind,
}

impl CompilerWarning {
    pub fn new(msg: impl Into<String>, location: TextLocation, warning_kind: WarningKind) -> Self {
        CompilerWarning {
            msg: msg.into(),
            location,
            warning_kind,
        }
    }

    pub fn file_path_string(&self) -> String {
        self.location.scope.to_string_lossy().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UnusedVariable,
    UnusedImport,

    // A local read on a line with no earlier assignment to it.
    // Line based, so branches and loops can fool it either way.
    PossiblyUnassigned,
}

pub fn warning_kind_to_str(kind: &WarningKind) -> &'static str {
    match kind {
        WarningKind::UnusedVariable => "Unused variable",
        WarningKind::UnusedImport => "Unused import",
        WarningKind::PossiblyUnassigned => "Possibly unassigned variable",
    }
}

pub fn print_formatted_warning(w: CompilerWarning) {
    let file = w.file_path_string();
    if file.is_empty() {
        say!(Yellow Bold "WARNING: ", Yellow warning_kind_to_str(&w.warning_kind));
    } else {
        say!(Yellow Bold "WARNING: ", Yellow warning_kind_to_str(&w.warning_kind), Dark Magenta " (", file, ")");
    }

    say!(Dark Magenta "Line ", Bright {w.location.start_pos.line_number});
    say!(w.msg);
}
