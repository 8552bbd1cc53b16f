//! Reads IR text back into an [`IrClass`].
//!
//! Line based: one declaration, label or instruction per line.
//! Indentation and blank lines are ignored, and a trailing `;` is optional.

use crate::compiler_frontend::ast::ast_nodes::TextLocation;
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError, ErrorType,
};
use crate::compiler_frontend::ir::ir_nodes::{
    CallInstruction, CallKind, Element, Instruction, IrClass, IrField, IrLabel, IrMethod,
    IrOperator, IrType,
};

pub fn parse_ir(text: &str) -> Result<IrClass, CompilerError> {
    let mut parser = IrParser {
        class: IrClass::default(),
        method: None,
        class_opened: false,
        class_closed: false,
        line_number: 0,
    };

    for (index, line) in text.lines().enumerate() {
        parser.line_number = index + 1;
        parser.parse_line(line.trim())?;
    }

    if let Some(method) = &parser.method {
        return Err(parser.error(format!("Method '{}' is never closed", method.name)));
    }
    if !parser.class_opened {
        return Err(parser.error("No class declaration found"));
    }
    if !parser.class_closed {
        return Err(parser.error(format!("Class '{}' is never closed", parser.class.name)));
    }

    Ok(parser.class)
}

struct IrParser {
    class: IrClass,
    method: Option<IrMethod>,
    class_opened: bool,
    class_closed: bool,
    line_number: usize,
}

impl IrParser {
    fn parse_line(&mut self, line: &str) -> Result<(), CompilerError> {
        if line.is_empty() || line.starts_with("//") {
            return Ok(());
        }

        if self.method.is_some() {
            return self.parse_method_line(line);
        }

        if self.class_closed {
            return Err(self.error(format!("Unexpected line after the class: '{line}'")));
        }

        if line == "}" {
            if !self.class_opened {
                return Err(self.error("Closing brace without a class"));
            }
            self.class_closed = true;
            return Ok(());
        }

        if let Some(path) = line.strip_prefix("import ") {
            self.class
                .imports
                .push(path.trim_end_matches(';').trim().to_owned());
            return Ok(());
        }

        if let Some(field) = line.strip_prefix(".field ") {
            let field = self.parse_field(field)?;
            self.class.fields.push(field);
            return Ok(());
        }

        if let Some(header) = line.strip_prefix(".construct ") {
            let mut method = self.parse_method_header(header)?;
            method.is_constructor = true;
            self.method = Some(method);
            return Ok(());
        }

        if let Some(header) = line.strip_prefix(".method ") {
            self.method = Some(self.parse_method_header(header)?);
            return Ok(());
        }

        if let Some(header) = line.strip_prefix("public ") {
            return self.parse_class_header(header);
        }

        Err(self.error(format!("Unexpected line: '{line}'")))
    }

    // `Name [extends Super] {`
    fn parse_class_header(&mut self, header: &str) -> Result<(), CompilerError> {
        let header = header.trim_end_matches('{').trim();
        let words: Vec<&str> = header.split_whitespace().collect();

        match words.as_slice() {
            [name] => self.class.name = (*name).to_owned(),
            [name, "extends", superclass] => {
                self.class.name = (*name).to_owned();
                self.class.superclass = Some((*superclass).to_owned());
            }
            _ => return Err(self.error(format!("Malformed class header: '{header}'"))),
        }

        self.class_opened = true;
        Ok(())
    }

    // `private name.T;`
    fn parse_field(&self, field: &str) -> Result<IrField, CompilerError> {
        let declaration = field
            .trim_end_matches(';')
            .split_whitespace()
            .last()
            .unwrap_or_default();

        self.parse_typed_name(declaration)
    }

    // `public [static] name(a.T, b.T).R {`
    fn parse_method_header(&self, header: &str) -> Result<IrMethod, CompilerError> {
        let header = header.trim_end_matches('{').trim();

        let (Some(open), Some(close)) = (header.find('('), header.rfind(").")) else {
            return Err(self.error(format!("Malformed method header: '{header}'")));
        };
        if close < open {
            return Err(self.error(format!("Malformed method header: '{header}'")));
        }

        let words: Vec<&str> = header[..open].split_whitespace().collect();
        let Some((name, modifiers)) = words.split_last() else {
            return Err(self.error(format!("Method header has no name: '{header}'")));
        };

        let return_type = self.parse_type(header[close + 2..].trim())?;
        let mut method = IrMethod::new(*name, return_type);
        method.is_static = modifiers.contains(&"static");

        for param in split_arguments(&header[open + 1..close]) {
            method.params.push(self.parse_typed_name(param)?);
        }

        Ok(method)
    }

    fn parse_method_line(&mut self, line: &str) -> Result<(), CompilerError> {
        if line == "}" {
            return self.finish_method();
        }

        if let Some(label) = line.strip_suffix(':')
            && is_label_name(label)
        {
            return self.define_label(label);
        }

        let instruction = self.parse_instruction(line.trim_end_matches(';').trim())?;
        if let Some(method) = &mut self.method {
            method.instructions.push(instruction);
        }

        Ok(())
    }

    fn define_label(&mut self, label: &str) -> Result<(), CompilerError> {
        let line_number = self.line_number;
        let Some(method) = &mut self.method else {
            return Ok(());
        };

        if method.label_position(label).is_some() {
            return Err(parse_error(
                format!(
                    "Label '{}' is defined more than once in method '{}'",
                    label, method.name
                ),
                line_number,
            ));
        }

        method.labels.push(IrLabel {
            name: label.to_owned(),
            position: method.instructions.len(),
        });
        Ok(())
    }

    fn finish_method(&mut self) -> Result<(), CompilerError> {
        let Some(method) = self.method.take() else {
            return Ok(());
        };

        for instruction in &method.instructions {
            if let Some(label) = instruction.branch_target()
                && method.label_position(label).is_none()
            {
                return Err(self.error(format!(
                    "Label '{}' is not defined in method '{}'",
                    label, method.name
                )));
            }
        }

        self.class.methods.push(method);
        Ok(())
    }

    // --------------------
    // Instructions
    // --------------------
    fn parse_instruction(&self, text: &str) -> Result<Instruction, CompilerError> {
        if let Some((dest, rest)) = text.split_once(" :=.") {
            let Some((ty, rhs)) = rest.split_once(' ') else {
                return Err(self.error(format!("Assignment has no value: '{text}'")));
            };

            return Ok(Instruction::Assign {
                dest: self.parse_element(dest.trim())?,
                ty: self.parse_type(ty)?,
                rhs: Box::new(self.parse_value(rhs.trim())?),
            });
        }

        if let Some(rest) = text.strip_prefix("ret.") {
            return match rest.split_once(' ') {
                Some((ty, operand)) => Ok(Instruction::Return {
                    ty: self.parse_type(ty)?,
                    operand: Some(self.parse_element(operand.trim())?),
                }),
                None => Ok(Instruction::Return {
                    ty: self.parse_type(rest)?,
                    operand: None,
                }),
            };
        }

        if let Some(label) = text.strip_prefix("goto ") {
            return Ok(Instruction::Goto(label.trim().to_owned()));
        }

        if let Some(rest) = text.strip_prefix("if (") {
            let Some((condition, label)) = rest.rsplit_once(") goto ") else {
                return Err(self.error(format!("Malformed conditional branch: '{text}'")));
            };
            let label = label.trim().to_owned();

            return match self.parse_value(condition.trim())? {
                Instruction::SingleOp(condition) => {
                    Ok(Instruction::SingleOpCondGoto { condition, label })
                }
                condition @ (Instruction::BinaryOp { .. } | Instruction::UnaryOp { .. }) => {
                    Ok(Instruction::OpCondGoto {
                        condition: Box::new(condition),
                        label,
                    })
                }
                other => Err(self.error(format!(
                    "A {} can't be used as a branch condition",
                    other.kind_name()
                ))),
            };
        }

        match self.parse_value(text)? {
            instruction @ (Instruction::Call(_)
            | Instruction::PutField { .. }
            | Instruction::GetField { .. }) => Ok(instruction),
            other => Err(self.error(format!(
                "A {} can't stand on its own: '{text}'",
                other.kind_name()
            ))),
        }
    }

    /// Anything that can sit on the right of `:=`, or inside an `if (...)`
    fn parse_value(&self, text: &str) -> Result<Instruction, CompilerError> {
        if let Some(open) = text.find('(')
            && let Some(keyword) = call_keyword(&text[..open])
        {
            return self.parse_call(keyword, text, open);
        }

        if let Some(rest) = text.strip_prefix("!.") {
            let Some((ty, operand)) = rest.split_once(' ') else {
                return Err(self.error(format!("Malformed unary operation: '{text}'")));
            };

            return Ok(Instruction::UnaryOp {
                op: IrOperator::Not,
                operand: self.parse_element(operand.trim())?,
                ty: self.parse_type(ty)?,
            });
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            [element] => Ok(Instruction::SingleOp(self.parse_element(element)?)),

            [left, operator, right] => {
                let Some((symbol, ty)) = operator.split_once('.') else {
                    return Err(self.error(format!("Operator has no type: '{operator}'")));
                };
                let Some(op) = IrOperator::from_symbol(symbol) else {
                    return Err(self.error(format!("Unknown operator '{symbol}'")));
                };

                Ok(Instruction::BinaryOp {
                    left: self.parse_element(left)?,
                    op,
                    right: self.parse_element(right)?,
                    ty: self.parse_type(ty)?,
                })
            }

            _ => Err(self.error(format!("Can't read '{text}' as a value"))),
        }
    }

    // `keyword(args).T`
    fn parse_call(
        &self,
        keyword: Keyword,
        text: &str,
        open: usize,
    ) -> Result<Instruction, CompilerError> {
        let Some(close) = text.rfind(").") else {
            return Err(self.error(format!("Call has no return type: '{text}'")));
        };
        if close < open {
            return Err(self.error(format!("Malformed call: '{text}'")));
        }

        let ty = self.parse_type(&text[close + 2..])?;
        let arguments = split_arguments(&text[open + 1..close]);

        match keyword {
            Keyword::GetField => match arguments.as_slice() {
                [object, field] => Ok(Instruction::GetField {
                    object: self.parse_element(object)?,
                    field: self.parse_element(field)?,
                    ty,
                }),
                _ => Err(self.error("getfield takes an object and a field")),
            },

            Keyword::PutField => match arguments.as_slice() {
                [object, field, value] => Ok(Instruction::PutField {
                    object: self.parse_element(object)?,
                    field: self.parse_element(field)?,
                    value: self.parse_element(value)?,
                }),
                _ => Err(self.error("putfield takes an object, a field and a value")),
            },

            Keyword::Call(CallKind::New) | Keyword::Call(CallKind::NewArray) => {
                match arguments.as_slice() {
                    ["array", size] => Ok(Instruction::Call(CallInstruction::simple(
                        CallKind::NewArray,
                        self.parse_element(size)?,
                        ty,
                    ))),
                    [class_name] => Ok(Instruction::Call(CallInstruction::simple(
                        CallKind::New,
                        Element::class_reference(*class_name),
                        ty,
                    ))),
                    _ => Err(self.error(format!("Malformed allocation: '{text}'"))),
                }
            }

            Keyword::Call(kind) => {
                let Some((first, rest)) = arguments.split_first() else {
                    return Err(self.error(format!("{} needs an argument", kind.keyword())));
                };
                let first_arg = self.parse_element(first)?;

                if !kind.is_invocation() {
                    return Ok(Instruction::Call(CallInstruction::simple(kind, first_arg, ty)));
                }

                let Some((method, operands)) = rest.split_first() else {
                    return Err(self.error(format!("{} needs a method name", kind.keyword())));
                };
                let Some(method) = method
                    .strip_prefix('"')
                    .and_then(|name| name.strip_suffix('"'))
                else {
                    return Err(self.error(format!("Method name must be quoted: {method}")));
                };

                let operands = operands
                    .iter()
                    .map(|operand| self.parse_element(operand))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Instruction::Call(CallInstruction::invoke(
                    kind, first_arg, method, operands, ty,
                )))
            }
        }
    }

    // --------------------
    // Elements and types
    // --------------------
    fn parse_element(&self, text: &str) -> Result<Element, CompilerError> {
        let (param_index, text) = self.split_param_prefix(text)?;

        if let Some(open) = text.find('[') {
            return self.parse_array_operand(text, open, param_index);
        }

        let Some((name, ty)) = text.split_once('.') else {
            return match text {
                "" => Err(self.error("Empty element")),
                "this" => Ok(Element::this()),
                class_name => Ok(Element::class_reference(class_name)),
            };
        };

        let ty = self.parse_type(ty)?;

        if let Ok(value) = name.parse::<i32>() {
            return Ok(Element::Literal { value, ty });
        }

        Ok(Element::Operand {
            name: name.to_owned(),
            ty,
            param_index,
        })
    }

    // `$k.rest`
    fn split_param_prefix<'t>(
        &self,
        text: &'t str,
    ) -> Result<(Option<usize>, &'t str), CompilerError> {
        let Some(rest) = text.strip_prefix('$') else {
            return Ok((None, text));
        };

        let Some((position, rest)) = rest.split_once('.') else {
            return Err(self.error(format!("Malformed parameter reference: '{text}'")));
        };

        match position.parse::<usize>() {
            Ok(position) => Ok((Some(position), rest)),
            Err(_) => Err(self.error(format!("Malformed parameter reference: '{text}'"))),
        }
    }

    // `name[i.i32][j.i32].T`
    fn parse_array_operand(
        &self,
        text: &str,
        open: usize,
        param_index: Option<usize>,
    ) -> Result<Element, CompilerError> {
        let name = &text[..open];
        let mut rest = &text[open..];
        let mut indexes = Vec::new();

        while let Some(inner) = rest.strip_prefix('[') {
            let Some(close) = inner.find(']') else {
                return Err(self.error(format!("Unclosed index in '{text}'")));
            };
            indexes.push(self.parse_element(&inner[..close])?);
            rest = &inner[close + 1..];
        }

        let Some(element_type) = rest.strip_prefix('.') else {
            return Err(self.error(format!("Array access has no element type: '{text}'")));
        };

        Ok(Element::ArrayOperand {
            name: name.to_owned(),
            element_type: self.parse_type(element_type)?,
            indexes,
            param_index,
        })
    }

    // `name.T`
    fn parse_typed_name(&self, text: &str) -> Result<IrField, CompilerError> {
        let (_, text) = self.split_param_prefix(text.trim())?;

        match text.split_once('.') {
            Some((name, ty)) if !name.is_empty() => Ok(IrField {
                name: name.to_owned(),
                ty: self.parse_type(ty)?,
            }),
            _ => Err(self.error(format!("Expected 'name.type', found '{text}'"))),
        }
    }

    fn parse_type(&self, text: &str) -> Result<IrType, CompilerError> {
        let ty = match text.trim() {
            "" => return Err(self.error("Missing type")),
            "i32" => IrType::Int32,
            "bool" => IrType::Boolean,
            "V" => IrType::Void,
            "String" => IrType::String,
            "this" => IrType::This,
            other => match other.strip_prefix("array.") {
                Some(element) => IrType::Array(Box::new(self.parse_type(element)?)),
                None => IrType::Object(other.to_owned()),
            },
        };

        Ok(ty)
    }

    fn error(&self, msg: impl Into<String>) -> CompilerError {
        parse_error(msg, self.line_number)
    }
}

#[derive(Clone, Copy)]
enum Keyword {
    Call(CallKind),
    GetField,
    PutField,
}

fn call_keyword(text: &str) -> Option<Keyword> {
    let keyword = match text {
        "invokestatic" => Keyword::Call(CallKind::InvokeStatic),
        "invokevirtual" => Keyword::Call(CallKind::InvokeVirtual),
        "invokespecial" => Keyword::Call(CallKind::InvokeSpecial),
        "invokeinterface" => Keyword::Call(CallKind::InvokeInterface),
        "new" => Keyword::Call(CallKind::New),
        "arraylength" => Keyword::Call(CallKind::ArrayLength),
        "ldc" => Keyword::Call(CallKind::Ldc),
        "getfield" => Keyword::GetField,
        "putfield" => Keyword::PutField,
        _ => return None,
    };

    Some(keyword)
}

fn split_arguments(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|argument| !argument.is_empty())
        .collect()
}

fn is_label_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn parse_error(msg: impl Into<String>, line: usize) -> CompilerError {
    CompilerError::new(
        msg,
        TextLocation::at(line as i32, 1),
        ErrorType::Compiler,
        CompilationStage::IrParsing,
    )
}

#[cfg(test)]
#[path = "tests/ir_parser_tests.rs"]
mod tests;
