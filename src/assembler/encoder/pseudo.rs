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

//! Pseudo-instruction expansions. Each expansion emits exactly the number
//! of bytes `layout_size` reported for the same operand shapes.

use super::core::*;
use super::{Encoder, REG_AT, fits_i16, fits_u16, imm_operand, reg_operand};
use crate::ast::{Operand, Statement};
use crate::errors::AssemblyError;
use crate::tables::Mnemonic;

impl<'a> Encoder<'a> {
    pub(crate) fn encode_pseudo(
        &mut self,
        mnemonic: Mnemonic,
        stmt: &Statement,
    ) -> Result<(), AssemblyError> {
        let ops = &stmt.operands;
        match mnemonic {
            Mnemonic::Move => {
                // addu rd, $0, rs
                let (rd, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                self.emit_word(encode_r(0, 0, rs, rd, 0, FUNCT_ADDU));
            }
            Mnemonic::Not => {
                // nor rd, rs, $0
                let (rd, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                self.emit_word(encode_r(0, rs, 0, rd, 0, FUNCT_NOR));
            }
            Mnemonic::Neg => {
                // sub rd, $0, rs
                let (rd, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                self.emit_word(encode_r(0, 0, rs, rd, 0, FUNCT_SUB));
            }
            Mnemonic::Abs => {
                let (rd, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                self.emit_word(encode_r(0, 0, rs, REG_AT, 31, FUNCT_SRA));
                self.emit_word(encode_r(0, REG_AT, rs, rd, 0, FUNCT_XOR));
                self.emit_word(encode_r(0, rd, REG_AT, rd, 0, FUNCT_SUB));
            }
            Mnemonic::Li => self.encode_li(stmt)?,
            Mnemonic::La => {
                let rd = reg_operand(&ops[0]);
                let addr = self.target_value(&ops[1]);
                self.emit_word(encode_i(OP_LUI, 0, REG_AT, (addr >> 16) as u16));
                self.emit_word(encode_i(OP_ORI, REG_AT, rd, (addr & 0xFFFF) as u16));
            }
            Mnemonic::Sgt => {
                // slt rd, rt, rs
                let (rd, rs, rt) = (
                    reg_operand(&ops[0]),
                    reg_operand(&ops[1]),
                    reg_operand(&ops[2]),
                );
                self.emit_word(encode_r(0, rt, rs, rd, 0, FUNCT_SLT));
            }
            Mnemonic::Sne => {
                // subu rd, rs, rt; sltu rd, $0, rd
                let (rd, rs, rt) = (
                    reg_operand(&ops[0]),
                    reg_operand(&ops[1]),
                    reg_operand(&ops[2]),
                );
                self.emit_word(encode_r(0, rs, rt, rd, 0, FUNCT_SUBU));
                self.emit_word(encode_r(0, 0, rd, rd, 0, FUNCT_SLTU));
            }
            Mnemonic::Rol | Mnemonic::Ror => {
                let (rd, rs) = (reg_operand(&ops[0]), reg_operand(&ops[1]));
                let shamt = imm_operand(&ops[2]);
                if !(0..=31).contains(&shamt) {
                    return Err(self.semantic(stmt, "shift amount out of range".to_string()));
                }
                let n = shamt as u8;
                let back = (32 - n) & 31;
                if mnemonic == Mnemonic::Rol {
                    self.emit_word(encode_r(0, 0, rs, REG_AT, n, FUNCT_SLL));
                    self.emit_word(encode_r(0, 0, rs, rd, back, FUNCT_SRL));
                } else {
                    self.emit_word(encode_r(0, 0, rs, REG_AT, n, FUNCT_SRL));
                    self.emit_word(encode_r(0, 0, rs, rd, back, FUNCT_SLL));
                }
                self.emit_word(encode_r(0, rd, REG_AT, rd, 0, FUNCT_OR));
            }
            Mnemonic::B => {
                // bgez $0, target
                let target = self.target_value(&ops[0]);
                self.emit_branch(OP_BCOND, 0, 1, target, stmt)?;
            }
            Mnemonic::Beqz | Mnemonic::Bnez => {
                let rs = reg_operand(&ops[0]);
                let target = self.target_value(&ops[1]);
                let op = if mnemonic == Mnemonic::Beqz { OP_BEQ } else { OP_BNE };
                self.emit_branch(op, rs, 0, target, stmt)?;
            }
            Mnemonic::Bge
            | Mnemonic::Bgt
            | Mnemonic::Ble
            | Mnemonic::Blt
            | Mnemonic::Bgeu
            | Mnemonic::Bgtu
            | Mnemonic::Bleu
            | Mnemonic::Bltu => self.encode_compare_branch(mnemonic, stmt)?,
            _ => unreachable!(),
        }
        Ok(())
    }

    fn encode_li(&mut self, stmt: &Statement) -> Result<(), AssemblyError> {
        let rd = reg_operand(&stmt.operands[0]);
        let value = imm_operand(&stmt.operands[1]);
        if fits_i16(value) {
            self.emit_word(encode_i(OP_ADDIU, 0, rd, value as u16));
        } else if fits_u16(value) {
            self.emit_word(encode_i(OP_ORI, 0, rd, value as u16));
        } else {
            let v = value as u32;
            self.emit_word(encode_i(OP_LUI, 0, REG_AT, (v >> 16) as u16));
            self.emit_word(encode_i(OP_ORI, REG_AT, rd, (v & 0xFFFF) as u16));
        }
        Ok(())
    }

    // bge/bgt/ble/blt and the unsigned variants: a set-on-less-than into
    // $at, then branch on $at against $0. beq when the comparison being
    // false means "taken" (bge, ble), bne otherwise.
    fn encode_compare_branch(
        &mut self,
        mnemonic: Mnemonic,
        stmt: &Statement,
    ) -> Result<(), AssemblyError> {
        let ops = &stmt.operands;
        let rs = reg_operand(&ops[0]);
        let target = self.target_value(&ops[2]);
        let unsigned = matches!(
            mnemonic,
            Mnemonic::Bgeu | Mnemonic::Bgtu | Mnemonic::Bleu | Mnemonic::Bltu
        );
        let slt_funct = if unsigned { FUNCT_SLTU } else { FUNCT_SLT };
        let branch_op = match mnemonic {
            Mnemonic::Bge | Mnemonic::Bgeu | Mnemonic::Ble | Mnemonic::Bleu => OP_BEQ,
            _ => OP_BNE,
        };

        match &ops[1] {
            Operand::Register(rt) => {
                // the slt operand order flips for the > / <= shapes
                let (a, b) = match mnemonic {
                    Mnemonic::Bge | Mnemonic::Bgeu | Mnemonic::Blt | Mnemonic::Bltu => (rs, *rt),
                    _ => (*rt, rs),
                };
                self.emit_word(encode_r(0, a, b, REG_AT, 0, slt_funct));
                self.emit_branch(branch_op, REG_AT, 0, target, stmt)?;
            }
            Operand::Immediate(value) => {
                if !fits_i16(*value) {
                    return Err(
                        self.semantic(stmt, "comparison immediate does not fit 16 bits".to_string())
                    );
                }
                match mnemonic {
                    Mnemonic::Bge | Mnemonic::Blt | Mnemonic::Bgeu | Mnemonic::Bltu => {
                        // slti/sltiu $1, rs, imm then branch on $1
                        let op = if unsigned { OP_SLTIU } else { OP_SLTI };
                        self.emit_word(encode_i(op, rs, REG_AT, *value as u16));
                        self.emit_branch(branch_op, REG_AT, 0, target, stmt)?;
                    }
                    _ => {
                        // materialize the immediate, compare imm < rs
                        self.emit_word(encode_i(OP_ADDIU, 0, REG_AT, *value as u16));
                        self.emit_word(encode_r(0, REG_AT, rs, REG_AT, 0, slt_funct));
                        self.emit_branch(branch_op, REG_AT, 0, target, stmt)?;
                    }
                }
            }
            _ => unreachable!(),
        }
        Ok(())
    }
}
