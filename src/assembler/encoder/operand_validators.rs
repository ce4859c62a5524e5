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

use crate::assembler::symbol_table::SymbolTable;
use crate::ast::{ClassMask, Operand, Statement, StatementOp};
use crate::errors::AssemblyError;
use crate::tables::{directive_entry, opcode_entry};

/// Check a statement's operand list against its format triple, slot by
/// slot. Label operands are recorded as references on the way out, which
/// inserts Undefined entries and builds the declared list the terminal
/// pass walks.
pub fn validate_operands(
    stmt: &Statement,
    symbols: &mut SymbolTable,
) -> Result<(), AssemblyError> {
    let format = match stmt.op {
        StatementOp::Mnemonic(m) => &opcode_entry(m).format,
        StatementOp::Directive(d) => &directive_entry(d).format,
    };

    let mut index = 0;
    for slot in format {
        if slot.is_empty() {
            break;
        }
        let classes = slot.difference(ClassMask::REPEAT | ClassMask::OPTIONAL);
        match stmt.operands.get(index) {
            None => {
                if slot.contains(ClassMask::OPTIONAL) {
                    continue;
                }
                return Err(AssemblyError::SyntaxError {
                    line: stmt.line,
                    col: stmt.col,
                    reason: "missing operand".to_string(),
                });
            }
            Some(operand) => {
                if !classes.intersects(operand.class()) {
                    if slot.contains(ClassMask::OPTIONAL) {
                        continue;
                    }
                    return Err(AssemblyError::SemanticError {
                        line: stmt.line,
                        col: stmt.col,
                        reason: format!("operand {} has the wrong type", index + 1),
                    });
                }
                index += 1;
                if slot.contains(ClassMask::REPEAT) {
                    while let Some(operand) = stmt.operands.get(index) {
                        if !classes.intersects(operand.class()) {
                            break;
                        }
                        index += 1;
                    }
                }
            }
        }
    }
    if index < stmt.operands.len() {
        return Err(AssemblyError::SemanticError {
            line: stmt.line,
            col: stmt.col,
            reason: "too many operands".to_string(),
        });
    }

    for operand in &stmt.operands {
        if let Operand::Label(name) = operand {
            symbols.reference(name, &stmt.file, stmt.line, stmt.col);
        }
    }
    Ok(())
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::symbol_table::SymbolStatus;
    use crate::tables::{Directive, Mnemonic};

    fn stmt(op: StatementOp, operands: Vec<Operand>) -> Statement {
        Statement::new(op, operands, "test.s", 1, 1)
    }

    #[test]
    fn test_exact_arity_passes() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Mnemonic(Mnemonic::Add),
            vec![
                Operand::Register(8),
                Operand::Register(9),
                Operand::Register(10),
            ],
        );
        assert!(validate_operands(&s, &mut symbols).is_ok());
    }

    #[test]
    fn test_missing_operand_is_rejected() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Mnemonic(Mnemonic::Add),
            vec![Operand::Register(8), Operand::Register(9)],
        );
        assert!(matches!(
            validate_operands(&s, &mut symbols),
            Err(AssemblyError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_wrong_class_is_rejected() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Mnemonic(Mnemonic::Add),
            vec![
                Operand::Register(8),
                Operand::Immediate(1),
                Operand::Register(10),
            ],
        );
        assert!(matches!(
            validate_operands(&s, &mut symbols),
            Err(AssemblyError::SemanticError { .. })
        ));
    }

    #[test]
    fn test_too_many_operands_is_rejected() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Mnemonic(Mnemonic::Jr),
            vec![Operand::Register(31), Operand::Register(8)],
        );
        assert!(matches!(
            validate_operands(&s, &mut symbols),
            Err(AssemblyError::SemanticError { .. })
        ));
    }

    #[test]
    fn test_repeat_slot_consumes_a_list() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Directive(Directive::Word),
            vec![
                Operand::Immediate(1),
                Operand::Label("tab".to_string()),
                Operand::Immediate(3),
            ],
        );
        assert!(validate_operands(&s, &mut symbols).is_ok());
        assert_eq!(symbols.status("tab"), SymbolStatus::Undefined);
        assert_eq!(symbols.declared_order(), &["tab".to_string()]);
    }

    #[test]
    fn test_repeat_slot_rejects_class_mismatch() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Directive(Directive::Byte),
            vec![Operand::Immediate(1), Operand::Register(8)],
        );
        assert!(matches!(
            validate_operands(&s, &mut symbols),
            Err(AssemblyError::SemanticError { .. })
        ));
    }

    #[test]
    fn test_optional_slot_accepts_absence() {
        let mut symbols = SymbolTable::new();
        let bare = stmt(StatementOp::Mnemonic(Mnemonic::Syscall), vec![]);
        assert!(validate_operands(&bare, &mut symbols).is_ok());
        let with_code = stmt(
            StatementOp::Mnemonic(Mnemonic::Syscall),
            vec![Operand::Immediate(1)],
        );
        assert!(validate_operands(&with_code, &mut symbols).is_ok());
    }

    #[test]
    fn test_branch_target_label_is_referenced() {
        let mut symbols = SymbolTable::new();
        let s = stmt(
            StatementOp::Mnemonic(Mnemonic::Beq),
            vec![
                Operand::Register(8),
                Operand::Register(9),
                Operand::Label("loop".to_string()),
            ],
        );
        assert!(validate_operands(&s, &mut symbols).is_ok());
        assert!(symbols.get("loop").is_some());
    }
}
