/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Recursive-descent parser for the source grammar:
//!
//! ```text
//! program      -> line*
//! line         -> [label] [instruction] Eol
//! label        -> Identifier ':'
//! instruction  -> (Mnemonic | Directive) operand_list?
//! operand_list -> operand (',' operand)*
//! operand      -> Register
//!               | Identifier                     label reference
//!               | String
//!               | Integer ['(' Register ')']     immediate or based address
//!               | '(' Register ')'               based address, zero disp
//! ```
//!
//! The parser reports one error per bad line; the driver then calls
//! `skip_to_eol` and keeps parsing so a single run surfaces everything.

use crate::ast::{Operand, Statement, StatementOp};
use crate::errors::AssemblyError;
use crate::scanner::ScannerStack;
use crate::scanner::token::TokenKind;

// A label definition with the position of its name.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

// One source line: an optional label and an optional statement.
#[derive(Debug, Default)]
pub struct ParsedLine {
    pub label: Option<Label>,
    pub statement: Option<Statement>,
}

/// Parse one line. `Ok(None)` means total end of input.
pub fn parse_line(stack: &mut ScannerStack) -> Result<Option<ParsedLine>, AssemblyError> {
    let mut parsed = ParsedLine::default();
    let mut token = stack.next()?;

    if let TokenKind::Identifier(name) = &token.kind {
        if stack.peek()?.kind == TokenKind::Colon {
            let name = name.clone();
            stack.next()?; // the colon
            parsed.label = Some(Label {
                name,
                file: stack.file(),
                line: token.line,
                col: token.col,
            });
            token = stack.next()?;
        } else {
            return Err(AssemblyError::SyntaxError {
                line: token.line,
                col: token.col,
                reason: format!("unrecognized mnemonic '{}'", name),
            });
        }
    }

    match token.kind {
        TokenKind::Eof => {
            if parsed.label.is_some() {
                Ok(Some(parsed))
            } else {
                Ok(None)
            }
        }
        TokenKind::Eol => Ok(Some(parsed)),
        TokenKind::Mnemonic(m) => {
            parsed.statement = Some(parse_statement(
                StatementOp::Mnemonic(m),
                token.line,
                token.col,
                stack,
            )?);
            Ok(Some(parsed))
        }
        TokenKind::Directive(d) => {
            parsed.statement = Some(parse_statement(
                StatementOp::Directive(d),
                token.line,
                token.col,
                stack,
            )?);
            Ok(Some(parsed))
        }
        other => Err(AssemblyError::SyntaxError {
            line: token.line,
            col: token.col,
            reason: format!("unexpected {}", other.describe()),
        }),
    }
}

/// Consume tokens through the next end of line, swallowing any further
/// lexical errors. Used to resynchronize after a diagnostic.
pub fn skip_to_eol(stack: &mut ScannerStack) {
    loop {
        match stack.next() {
            Ok(token) => {
                if token.kind == TokenKind::Eol || token.kind == TokenKind::Eof {
                    return;
                }
            }
            Err(_) => {}
        }
    }
}

fn parse_statement(
    op: StatementOp,
    line: u32,
    col: u32,
    stack: &mut ScannerStack,
) -> Result<Statement, AssemblyError> {
    let file = stack.file();
    let mut operands = Vec::new();

    // recovery: a comma right next to the keyword is tolerated
    if stack.peek()?.kind == TokenKind::Comma {
        stack.next()?;
    }

    loop {
        if stack.peek()?.kind == TokenKind::Eol {
            stack.next()?;
            break;
        }
        if stack.peek()?.kind == TokenKind::Eof {
            break;
        }
        operands.push(parse_operand(stack)?);
        // separator: a comma, or directly the next operand (tolerated)
        if stack.peek()?.kind == TokenKind::Comma {
            stack.next()?;
        }
    }

    Ok(Statement::new(op, operands, file, line, col))
}

fn parse_operand(stack: &mut ScannerStack) -> Result<Operand, AssemblyError> {
    let token = stack.next()?;
    match token.kind {
        TokenKind::Register(r) => Ok(Operand::Register(r)),
        TokenKind::Identifier(name) => Ok(Operand::Label(name)),
        TokenKind::Str(s) => Ok(Operand::Str(s)),
        TokenKind::Integer(value) => {
            if stack.peek()?.kind == TokenKind::LParen {
                stack.next()?;
                let base = expect_register(stack)?;
                expect_rparen(stack)?;
                Ok(Operand::Address { base, disp: value })
            } else {
                Ok(Operand::Immediate(value))
            }
        }
        TokenKind::LParen => {
            let base = expect_register(stack)?;
            expect_rparen(stack)?;
            Ok(Operand::Address { base, disp: 0 })
        }
        other => Err(AssemblyError::SyntaxError {
            line: token.line,
            col: token.col,
            reason: format!("expected operand, found {}", other.describe()),
        }),
    }
}

fn expect_register(stack: &mut ScannerStack) -> Result<u8, AssemblyError> {
    let token = stack.next()?;
    match token.kind {
        TokenKind::Register(r) => Ok(r),
        other => Err(AssemblyError::SyntaxError {
            line: token.line,
            col: token.col,
            reason: format!("expected register, found {}", other.describe()),
        }),
    }
}

fn expect_rparen(stack: &mut ScannerStack) -> Result<(), AssemblyError> {
    let token = stack.next()?;
    match token.kind {
        TokenKind::RParen => Ok(()),
        other => Err(AssemblyError::SyntaxError {
            line: token.line,
            col: token.col,
            reason: format!("expected ')', found {}", other.describe()),
        }),
    }
}

// ------------- unit tests -------------
