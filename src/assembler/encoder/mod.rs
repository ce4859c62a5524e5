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

//! Lowers statements to bytes in the active segment.
//!
//! Layout discipline: `layout_size` is a pure function of the statement's
//! identity and operand shapes, and every emission path for a statement
//! produces exactly that many bytes. A forward-referenced label therefore
//! reserves its exact space, goes on the symbol's pending list, and is
//! re-encoded in place by the resolution pass.

pub mod core;
mod directive;
mod operand_validators;
mod pseudo;

pub use operand_validators::validate_operands;

use crate::assembler::segment::SegmentSet;
use crate::assembler::symbol_table::{SymbolStatus, SymbolTable};
use crate::ast::{Operand, Statement, StatementOp};
use crate::errors::AssemblyError;
use crate::tables::{Mnemonic, OpcodeKind, opcode_entry};
use self::core::*;

/// The assembler temporary, reserved for pseudo expansions.
pub const REG_AT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    Complete,
    Deferred,
}

pub struct Encoder<'a> {
    pub segments: &'a mut SegmentSet,
    pub symbols: &'a mut SymbolTable,
    // During the resolution pass deferral is off: a still-undefined symbol
    // encodes as 0 and gets its diagnostic from its own declared-list
    // visit.
    pub resolving: bool,
}

pub fn fits_i16(value: i32) -> bool {
    (-0x8000..=0x7FFF).contains(&value)
}

pub fn fits_u16(value: i32) -> bool {
    (0..=0xFFFF).contains(&value)
}

/// Bytes this statement will occupy, decided before any label is known.
pub fn layout_size(mnemonic: Mnemonic, operands: &[Operand]) -> u32 {
    let entry = opcode_entry(mnemonic);
    match mnemonic {
        // loads/stores split into lui + access for labels and wide
        // absolute addresses
        Mnemonic::Lb
        | Mnemonic::Lbu
        | Mnemonic::Lh
        | Mnemonic::Lhu
        | Mnemonic::Lw
        | Mnemonic::Sb
        | Mnemonic::Sh
        | Mnemonic::Sw => match operands.get(1) {
            Some(Operand::Label(_)) => 8,
            Some(Operand::Immediate(v)) if !fits_i16(*v) => 8,
            _ => 4,
        },
        Mnemonic::Addi | Mnemonic::Addiu | Mnemonic::Slti | Mnemonic::Sltiu => {
            match operands.get(2) {
                Some(Operand::Immediate(v)) if !fits_i16(*v) => 12,
                _ => 4,
            }
        }
        Mnemonic::Andi | Mnemonic::Ori | Mnemonic::Xori => match operands.get(2) {
            Some(Operand::Immediate(v)) if !fits_u16(*v) => 12,
            _ => 4,
        },
        Mnemonic::Li => match operands.get(1) {
            Some(Operand::Immediate(v)) if fits_i16(*v) || fits_u16(*v) => 4,
            _ => 8,
        },
        Mnemonic::Bge
        | Mnemonic::Bgt
        | Mnemonic::Ble
        | Mnemonic::Blt
        | Mnemonic::Bgeu
        | Mnemonic::Bgtu
        | Mnemonic::Bleu
        | Mnemonic::Bltu => match operands.get(1) {
            // the <= / > shapes need the immediate materialized first
            Some(Operand::Immediate(_)) => match mnemonic {
                Mnemonic::Bgt | Mnemonic::Ble | Mnemonic::Bgtu | Mnemonic::Bleu => 12,
                _ => 8,
            },
            _ => entry.size,
        },
        _ => entry.size,
    }
}

/// First label operand whose symbol is still undefined, if any.
fn first_unresolved(symbols: &SymbolTable, operands: &[Operand]) -> Option<String> {
    operands.iter().find_map(|operand| match operand {
        Operand::Label(name) if symbols.status(name) == SymbolStatus::Undefined => {
            Some(name.clone())
        }
        _ => None,
    })
}

fn reg_operand(operand: &Operand) -> u8 {
    match operand {
        Operand::Register(r) => *r,
        _ => unreachable!(),
    }
}

fn imm_operand(operand: &Operand) -> i32 {
    match operand {
        Operand::Immediate(v) => *v,
        _ => unreachable!(),
    }
}

impl<'a> Encoder<'a> {
    pub fn new(
        segments: &'a mut SegmentSet,
        symbols: &'a mut SymbolTable,
        resolving: bool,
    ) -> Self {
        Self {
            segments,
            symbols,
            resolving,
        }
    }

    pub fn encode_statement(&mut self, stmt: &Statement) -> Result<Encoded, AssemblyError> {
        match stmt.op {
            StatementOp::Mnemonic(m) => self.encode_instruction(m, stmt),
            StatementOp::Directive(d) => self.encode_directive(d, stmt),
        }
    }

    fn encode_instruction(
        &mut self,
        mnemonic: Mnemonic,
        stmt: &Statement,
    ) -> Result<Encoded, AssemblyError> {
        let segment_id = self.segments.current_id();
        if !segment_id.is_text() {
            return Err(self.semantic(
                stmt,
                format!("instruction not permitted in {} segment", segment_id.name()),
            ));
        }

        let size = layout_size(mnemonic, &stmt.operands);
        self.check_room(stmt, size)?;

        if !self.resolving {
            if let Some(name) = first_unresolved(self.symbols, &stmt.operands) {
                self.segments.current().reserve(size);
                self.symbols.defer(&name, stmt.clone());
                return Ok(Encoded::Deferred);
            }
        }

        match opcode_entry(mnemonic).kind {
            OpcodeKind::Core => self.encode_core(mnemonic, stmt)?,
            OpcodeKind::Pseudo => self.encode_pseudo(mnemonic, stmt)?,
        }
        Ok(Encoded::Complete)
    }

    fn encode_core(&mut self, mnemonic: Mnemonic, stmt: &Statement) -> Result<(), AssemblyError> {
        let entry = opcode_entry(mnemonic);
        let ops = &stmt.operands;
        match mnemonic {
            Mnemonic::Add
            | Mnemonic::Addu
            | Mnemonic::Sub
            | Mnemonic::Subu
            | Mnemonic::And
            | Mnemonic::Or
            | Mnemonic::Xor
            | Mnemonic::Nor
            | Mnemonic::Slt
            | Mnemonic::Sltu
            | Mnemonic::Mul => {
                let (rd, rs, rt) = (reg_operand(&ops[0]), reg_operand(&ops[1]), reg_operand(&ops[2]));
                self.emit_word(encode_r(entry.op, rs, rt, rd, 0, entry.funct));
            }
            Mnemonic::Sll | Mnemonic::Srl | Mnemonic::Sra => {
                let (rd, rt) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                let shamt = imm_operand(&ops[2]);
                if !(0..=31).contains(&shamt) {
                    return Err(self.semantic(stmt, "shift amount out of range".to_string()));
                }
                self.emit_word(encode_r(0, 0, rt, rd, shamt as u8, entry.funct));
            }
            Mnemonic::Jr => {
                self.emit_word(encode_r(0, reg_operand(&ops[0]), 0, 0, 0, entry.funct));
            }
            Mnemonic::Syscall => {
                let code = ops.first().map(imm_operand).unwrap_or(0);
                if !(0..=0xF_FFFF).contains(&code) {
                    return Err(self.semantic(stmt, "syscall code out of range".to_string()));
                }
                self.emit_word(encode_syscall(code as u32, entry.funct));
            }
            Mnemonic::Mfhi | Mnemonic::Mflo => {
                self.emit_word(encode_r(0, 0, 0, reg_operand(&ops[0]), 0, entry.funct));
            }
            Mnemonic::Mult | Mnemonic::Multu | Mnemonic::Div | Mnemonic::Divu => {
                let (rs, rt) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                self.emit_word(encode_r(0, rs, rt, 0, 0, entry.funct));
            }
            Mnemonic::Addi
            | Mnemonic::Addiu
            | Mnemonic::Slti
            | Mnemonic::Sltiu
            | Mnemonic::Andi
            | Mnemonic::Ori
            | Mnemonic::Xori => self.encode_imm_alu(mnemonic, stmt)?,
            Mnemonic::Lui => {
                let rt = reg_operand(&ops[0]);
                let imm = imm_operand(&ops[1]);
                if !fits_i16(imm) && !fits_u16(imm) {
                    return Err(self.semantic(stmt, "immediate does not fit 16 bits".to_string()));
                }
                self.emit_word(encode_i(entry.op, 0, rt, imm as u16));
            }
            Mnemonic::Lb
            | Mnemonic::Lbu
            | Mnemonic::Lh
            | Mnemonic::Lhu
            | Mnemonic::Lw
            | Mnemonic::Sb
            | Mnemonic::Sh
            | Mnemonic::Sw => self.encode_load_store(mnemonic, stmt)?,
            Mnemonic::Beq | Mnemonic::Bne => {
                let (rs, rt) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                let target = self.target_value(&ops[2]);
                self.emit_branch(entry.op, rs, rt, target, stmt)?;
            }
            Mnemonic::Bgez | Mnemonic::Bgtz | Mnemonic::Blez | Mnemonic::Bltz => {
                let rs = reg_operand(&ops[0]);
                let target = self.target_value(&ops[1]);
                self.emit_branch(entry.op, rs, entry.rt, target, stmt)?;
            }
            Mnemonic::J | Mnemonic::Jal => {
                let target = self.target_value(&ops[0]);
                self.emit_word(encode_j(entry.op, target));
            }
            _ => unreachable!(), // pseudos dispatch elsewhere
        }
        Ok(())
    }

    fn encode_imm_alu(&mut self, mnemonic: Mnemonic, stmt: &Statement) -> Result<(), AssemblyError> {
        let entry = opcode_entry(mnemonic);
        let ops = &stmt.operands;
        let (rt, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
        let imm = imm_operand(&ops[2]);
        let logical = matches!(mnemonic, Mnemonic::Andi | Mnemonic::Ori | Mnemonic::Xori);
        let fits = if logical { fits_u16(imm) } else { fits_i16(imm) };
        if fits {
            self.emit_word(encode_i(entry.op, rs, rt, imm as u16));
            return Ok(());
        }
        // build the constant in $at, then run the register form
        self.emit_load_const(REG_AT, imm, logical);
        let funct = match mnemonic {
            Mnemonic::Addi => FUNCT_ADD,
            Mnemonic::Addiu => FUNCT_ADDU,
            Mnemonic::Slti => FUNCT_SLT,
            Mnemonic::Sltiu => FUNCT_SLTU,
            Mnemonic::Andi => FUNCT_AND,
            Mnemonic::Ori => FUNCT_OR,
            Mnemonic::Xori => FUNCT_XOR,
            _ => unreachable!(),
        };
        self.emit_word(encode_r(0, rs, REG_AT, rt, 0, funct));
        Ok(())
    }

    fn encode_load_store(
        &mut self,
        mnemonic: Mnemonic,
        stmt: &Statement,
    ) -> Result<(), AssemblyError> {
        let entry = opcode_entry(mnemonic);
        let rt = reg_operand(&stmt.operands[0]);
        match &stmt.operands[1] {
            Operand::Address { base, disp } => {
                if !fits_i16(*disp) {
                    return Err(
                        self.semantic(stmt, "address displacement does not fit 16 bits".to_string())
                    );
                }
                self.emit_word(encode_i(entry.op, *base, rt, *disp as u16));
            }
            Operand::Immediate(addr) => {
                if fits_i16(*addr) {
                    self.emit_word(encode_i(entry.op, 0, rt, *addr as u16));
                } else {
                    self.emit_split_access(entry.op, rt, *addr as u32);
                }
            }
            Operand::Label(name) => {
                let addr = self.symbols.value(name).unwrap_or(0);
                self.emit_split_access(entry.op, rt, addr);
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    // lui $1, addr>>16 then the access through $1 with the low half as
    // displacement. Always two words, matching the 8-byte layout.
    fn emit_split_access(&mut self, op: u8, rt: u8, addr: u32) {
        self.emit_word(encode_i(OP_LUI, 0, REG_AT, (addr >> 16) as u16));
        self.emit_word(encode_i(op, REG_AT, rt, (addr & 0xFFFF) as u16));
    }

    // Materialize a 32-bit constant in `reg` as lui + ori/addiu. ori is
    // required for logical ops and whenever the low half has bit 15 set,
    // which would otherwise sign-extend.
    pub(crate) fn emit_load_const(&mut self, reg: u8, value: i32, logical: bool) {
        let hi = ((value as u32) >> 16) as u16;
        let lo = (value as u32 & 0xFFFF) as u16;
        self.emit_word(encode_i(OP_LUI, 0, reg, hi));
        if logical || lo & 0x8000 != 0 {
            self.emit_word(encode_i(OP_ORI, reg, reg, lo));
        } else {
            self.emit_word(encode_i(OP_ADDIU, reg, reg, lo));
        }
    }

    // The displacement is measured from the word after the branch itself,
    // so this reads the current offset at emission time.
    pub(crate) fn emit_branch(
        &mut self,
        op: u8,
        rs: u8,
        rt: u8,
        target: u32,
        stmt: &Statement,
    ) -> Result<(), AssemblyError> {
        let pc = self.segments.current().offset();
        let delta = target as i64 - (pc as i64 + 4);
        if delta % 4 != 0 {
            return Err(self.semantic(stmt, "branch target is not word-aligned".to_string()));
        }
        let disp = delta >> 2;
        if !(-0x8000..=0x7FFF).contains(&disp) {
            return Err(self.semantic(stmt, "branch target out of range".to_string()));
        }
        self.emit_word(encode_i(op, rs, rt, disp as u16));
        Ok(())
    }

    pub(crate) fn target_value(&self, operand: &Operand) -> u32 {
        match operand {
            Operand::Immediate(v) => *v as u32,
            Operand::Label(name) => self.symbols.value(name).unwrap_or(0),
            _ => unreachable!(),
        }
    }

    pub(crate) fn emit_word(&mut self, word: u32) {
        self.segments.current().emit_word(word);
    }

    pub(crate) fn check_room(&mut self, stmt: &Statement, size: u32) -> Result<(), AssemblyError> {
        if size as u64 > self.segments.current().remaining() {
            let name = self.segments.current_id().name();
            return Err(self.semantic(stmt, format!("{} segment limit exceeded", name)));
        }
        Ok(())
    }

    pub(crate) fn semantic(&self, stmt: &Statement, reason: String) -> AssemblyError {
        AssemblyError::SemanticError {
            line: stmt.line,
            col: stmt.col,
            reason,
        }
    }

    pub(crate) fn unresolved_label(&self, operands: &[Operand]) -> Option<String> {
        first_unresolved(self.symbols, operands)
    }
}
