pub mod ast;
pub mod ast_nodes;
pub mod syntax_tree;

#[cfg(test)]
pub(crate) mod test_support;
