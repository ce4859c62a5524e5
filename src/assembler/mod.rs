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

//! The assembler driver: pulls lines from the scanner stack, encodes them
//! as they arrive, and finishes with the terminal resolution pass over
//! every symbol that was referenced before it was defined.

pub mod encoder;
pub mod segment;
pub mod symbol_table;

use crate::ast::{Operand, Statement, StatementOp};
use crate::errors::{AssemblyError, Diagnostic};
use crate::file_reader::FileReader;
use crate::parser::{self, ParsedLine};
use crate::scanner::{MAX_INCLUDE_DEPTH, Scanner, ScannerStack};
use crate::tables::Directive;
use anyhow::{Context, Result};
use encoder::{Encoder, validate_operands};
use segment::{Segment, SegmentId, SegmentSet};
use std::path::{Path, PathBuf};
use symbol_table::{SymbolStatus, SymbolTable};

pub struct Assembler {
    segments: SegmentSet,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

// The result of a run: the four segment images, the symbol table, and
// every diagnostic in report order.
pub struct Assembly {
    pub segments: SegmentSet,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        self.segments.get(id)
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            segments: SegmentSet::new(),
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn into_assembly(self) -> Assembly {
        Assembly {
            segments: self.segments,
            symbols: self.symbols,
            diagnostics: self.diagnostics,
        }
    }

    /// Assemble the input files in order. Unreadable inputs are fatal;
    /// everything else becomes a diagnostic and the run continues.
    pub fn assemble_files<F: FileReader>(
        &mut self,
        inputs: &[PathBuf],
        reader: &F,
    ) -> Result<()> {
        let mut stack = ScannerStack::new();
        for path in inputs.iter().rev() {
            let source = reader
                .read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            stack.push(Scanner::new(path.display().to_string(), &source));
        }

        loop {
            match parser::parse_line(&mut stack) {
                Ok(None) => break,
                Ok(Some(line)) => self.process_line(line, &mut stack, reader),
                Err(error) => {
                    self.diagnostics.push(Diagnostic::new(stack.file(), error));
                    parser::skip_to_eol(&mut stack);
                }
            }
        }

        self.resolve();
        Ok(())
    }

    fn process_line<F: FileReader>(
        &mut self,
        line: ParsedLine,
        stack: &mut ScannerStack,
        reader: &F,
    ) {
        // data auto-alignment happens before the label binds, so a label on
        // a .half/.word line records the aligned offset
        if let Some(stmt) = &line.statement {
            if let StatementOp::Directive(d) = stmt.op {
                let align = match d {
                    Directive::Half => 2,
                    Directive::Word => 4,
                    _ => 1,
                };
                if align > 1 && self.segments.current().align(align).is_none() {
                    let name = self.segments.current_id().name();
                    self.diagnostics.push(Diagnostic::new(
                        stmt.file.clone(),
                        AssemblyError::SemanticError {
                            line: stmt.line,
                            col: stmt.col,
                            reason: format!("{} segment limit exceeded", name),
                        },
                    ));
                    return;
                }
            }
        }

        if let Some(label) = &line.label {
            let segment_id = self.segments.current_id();
            let offset = self.segments.current().offset();
            if !self.symbols.define(&label.name, segment_id, offset) {
                self.diagnostics.push(Diagnostic::new(
                    label.file.clone(),
                    AssemblyError::SymbolError {
                        line: label.line,
                        col: label.col,
                        reason: format!("multiple definitions of label '{}'", label.name),
                    },
                ));
            }
        }

        let Some(mut stmt) = line.statement else {
            return;
        };

        // includes are a scanner operation, not an encoder one
        if stmt.op == StatementOp::Directive(Directive::Include) {
            self.process_include(&stmt, stack, reader);
            return;
        }

        if let Err(error) = validate_operands(&stmt, &mut self.symbols) {
            self.diagnostics
                .push(Diagnostic::new(stmt.file.clone(), error));
            return;
        }

        stmt.segment = self.segments.current_id();
        stmt.offset = self.segments.current().offset();

        let mut encoder = Encoder::new(&mut self.segments, &mut self.symbols, false);
        if let Err(error) = encoder.encode_statement(&stmt) {
            self.diagnostics
                .push(Diagnostic::new(stmt.file.clone(), error));
        }
    }

    fn process_include<F: FileReader>(
        &mut self,
        stmt: &Statement,
        stack: &mut ScannerStack,
        reader: &F,
    ) {
        let path = match stmt.operands.as_slice() {
            [Operand::Str(path)] => path.clone(),
            _ => {
                self.diagnostics.push(Diagnostic::new(
                    stmt.file.clone(),
                    AssemblyError::SyntaxError {
                        line: stmt.line,
                        col: stmt.col,
                        reason: ".include expects a quoted file path".to_string(),
                    },
                ));
                return;
            }
        };
        if stack.depth() >= MAX_INCLUDE_DEPTH {
            self.diagnostics.push(Diagnostic::new(
                stmt.file.clone(),
                AssemblyError::IncludeError {
                    line: stmt.line,
                    col: stmt.col,
                    reason: "include depth exceeded (possible include cycle)".to_string(),
                },
            ));
            return;
        }
        match reader.read_to_string(Path::new(&path)) {
            Ok(source) => stack.push(Scanner::new(path, &source)),
            Err(error) => {
                self.diagnostics.push(Diagnostic::new(
                    stmt.file.clone(),
                    AssemblyError::IncludeError {
                        line: stmt.line,
                        col: stmt.col,
                        reason: format!("cannot open include file '{}': {}", path, error),
                    },
                ));
            }
        }
    }

    // Terminal resolution pass: visit declared symbols in first-reference
    // order. Undefined symbols report once and drop their pending records;
    // everything else re-encodes its pending records at their captured
    // (segment, offset).
    fn resolve(&mut self) {
        let names: Vec<String> = self.symbols.declared_order().to_vec();
        for name in names {
            if self.symbols.status(&name) == SymbolStatus::Undefined {
                if let Some(symbol) = self.symbols.get(&name) {
                    let file = symbol.first_ref_file.clone();
                    let error = AssemblyError::SymbolError {
                        line: symbol.first_ref_line,
                        col: symbol.first_ref_col,
                        reason: format!("undefined symbol '{}'", name),
                    };
                    self.diagnostics.push(Diagnostic::new(file, error));
                }
                self.symbols.take_pending(&name);
                continue;
            }
            for stmt in self.symbols.take_pending(&name) {
                self.segments.switch(stmt.segment);
                self.segments.get_mut(stmt.segment).set_offset(stmt.offset);
                let mut encoder = Encoder::new(&mut self.segments, &mut self.symbols, true);
                if let Err(error) = encoder.encode_statement(&stmt) {
                    self.diagnostics
                        .push(Diagnostic::new(stmt.file.clone(), error));
                }
            }
        }
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_reader::MockFileReader;

    fn assemble_source(source: &str) -> Assembly {
        let mut reader = MockFileReader::default();
        reader.add_file("test.s", source);
        crate::assemble(&[PathBuf::from("test.s")], &reader).unwrap()
    }

    #[test]
    fn test_backward_branch() {
        let assembly = assemble_source("loop: addi $t0, $t0, 1\nbne $t0, $t1, loop\n");
        assert!(assembly.success());
        let text = assembly.segment(SegmentId::Text);
        // bne $t0, $t1, loop with pc 0x00400004: disp = -2
        assert_eq!(text.word_at(0x0040_0004), 0x1509_FFFE);
    }

    #[test]
    fn test_forward_jump_resolves_in_place() {
        let assembly = assemble_source("j end\naddi $t0, $t0, 1\nend: syscall\n");
        assert!(assembly.success());
        let text = assembly.segment(SegmentId::Text);
        assert_eq!(text.len(), 12);
        assert_eq!(text.word_at(0x0040_0000), 0x0810_0002);
        assert_eq!(text.word_at(0x0040_0004), 0x2108_0001);
        assert_eq!(text.word_at(0x0040_0008), 0x0000_000C);
        let end = assembly.symbols.get("end").unwrap();
        assert_eq!(end.offset, 0x0040_0008);
        // P3: nothing left pending after the terminal pass
        assert!(end.pending.is_empty());
    }

    #[test]
    fn test_double_definition_keeps_first_binding() {
        let assembly =
            assemble_source("lbl: add $t0, $t0, $t0\nlbl: sub $t0, $t0, $t0\nj lbl\n");
        assert_eq!(assembly.diagnostics.len(), 1);
        assert!(
            assembly.diagnostics[0]
                .to_string()
                .contains("multiple definitions of label 'lbl'")
        );
        let text = assembly.segment(SegmentId::Text);
        // both instructions still encoded
        assert_eq!(text.word_at(0x0040_0000), 0x0108_4020);
        assert_eq!(text.word_at(0x0040_0004), 0x0108_4022);
        // the reference uses the first definition
        assert_eq!(text.word_at(0x0040_0008), 0x0810_0000);
    }

    #[test]
    fn test_undefined_symbol_reports_once() {
        let assembly = assemble_source("j nowhere\nbeq $t0, $t1, nowhere\n");
        assert_eq!(assembly.diagnostics.len(), 1);
        assert!(
            assembly.diagnostics[0]
                .to_string()
                .contains("undefined symbol 'nowhere'")
        );
    }

    #[test]
    fn test_forward_compare_branch_displacement() {
        // bge reserves 8 bytes; after resolution the beq sits at +4 and the
        // displacement to a target at +8 is 0
        let assembly = assemble_source("bge $t0, $t1, target\ntarget: syscall\n");
        assert!(assembly.success());
        let text = assembly.segment(SegmentId::Text);
        assert_eq!(text.word_at(0x0040_0000), 0x0109_082A); // slt $1, $t0, $t1
        assert_eq!(text.word_at(0x0040_0004), 0x1020_0000); // beq $1, $0, +0
    }

    #[test]
    fn test_word_directive_with_forward_label() {
        let assembly =
            assemble_source(".data\ntab: .word 1, end, 3\n.text\nend: syscall\n");
        assert!(assembly.success());
        let data = assembly.segment(SegmentId::Data);
        assert_eq!(data.word_at(0x1001_0000), 1);
        assert_eq!(data.word_at(0x1001_0004), 0x0040_0000);
        assert_eq!(data.word_at(0x1001_0008), 3);
    }

    #[test]
    fn test_label_on_word_line_gets_aligned_offset() {
        let assembly = assemble_source(".data\n.byte 1\nlbl: .word 7\n");
        assert!(assembly.success());
        let lbl = assembly.symbols.get("lbl").unwrap();
        assert_eq!(lbl.offset, 0x1001_0004);
        assert_eq!(assembly.segment(SegmentId::Data).word_at(0x1001_0004), 7);
    }

    #[test]
    fn test_instruction_in_data_segment_is_an_error() {
        let assembly = assemble_source(".data\nadd $t0, $t1, $t2\n");
        assert_eq!(assembly.diagnostics.len(), 1);
        assert!(
            assembly.diagnostics[0]
                .to_string()
                .contains("instruction not permitted")
        );
    }

    #[test]
    fn test_data_directive_in_text_segment_is_an_error() {
        let assembly = assemble_source(".asciiz \"nope\"\n");
        assert_eq!(assembly.diagnostics.len(), 1);
        assert!(
            assembly.diagnostics[0]
                .to_string()
                .contains("data directive not permitted")
        );
    }

    #[test]
    fn test_errors_do_not_stop_the_run() {
        let assembly = assemble_source("bogus $t0\nadd $t0, $t1, $t2\nalso_bad\n");
        assert_eq!(assembly.diagnostics.len(), 2);
        // the good line in between still assembled
        assert_eq!(
            assembly.segment(SegmentId::Text).word_at(0x0040_0000),
            0x012A_4020
        );
    }

    #[test]
    fn test_segment_switching_round_trip() {
        let assembly = assemble_source(
            ".data\n.byte 1\n.text\nsyscall\n.data\n.byte 2\n",
        );
        assert!(assembly.success());
        assert_eq!(assembly.segment(SegmentId::Data).image(), &[1, 2]);
        assert_eq!(assembly.segment(SegmentId::Text).len(), 4);
    }

    #[test]
    fn test_align_directive_rounds_up() {
        let assembly = assemble_source(".data\n.byte 1\n.align 3\nlbl: .byte 2\n");
        assert!(assembly.success());
        assert_eq!(assembly.symbols.get("lbl").unwrap().offset, 0x1001_0008);
    }

    #[test]
    fn test_space_reserves_zero_fill() {
        let assembly = assemble_source(".data\n.byte 9\n.space 3\n.byte 8\n");
        assert!(assembly.success());
        assert_eq!(
            assembly.segment(SegmentId::Data).image(),
            &[9, 0, 0, 0, 8]
        );
    }

    #[test]
    fn test_ktext_and_kdata_bases() {
        let assembly = assemble_source(".ktext\nsyscall\n.kdata\nk: .word 5\n");
        assert!(assembly.success());
        assert_eq!(assembly.segment(SegmentId::KText).len(), 4);
        assert_eq!(assembly.symbols.get("k").unwrap().offset, 0x9000_0000);
    }
}
