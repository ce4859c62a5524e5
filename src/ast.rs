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

use crate::assembler::segment::SegmentId;
use crate::tables::{Directive, Mnemonic};
use bitflags::bitflags;

bitflags! {
    // Operand classes a format slot accepts. REPEAT lets the slot consume
    // any number of further operands of the same classes; OPTIONAL lets the
    // slot be empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassMask: u8 {
        const LABEL = 0x01;
        const IMMEDIATE = 0x02;
        const REGISTER = 0x04;
        const ADDRESS = 0x08;
        const STRING = 0x10;
        const REPEAT = 0x20;
        const OPTIONAL = 0x40;
    }
}

// One slot per possible operand position.
pub type OperandFormat = [ClassMask; 3];

// Represents all possible forms an argument to an instruction or directive
// can take. Immediates are stored as their 32-bit pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(u8),
    Immediate(i32),
    Label(String),
    Str(String),
    Address { base: u8, disp: i32 }, // e.g., 8($sp) or ($sp)
}

impl Operand {
    pub fn class(&self) -> ClassMask {
        match self {
            Operand::Register(_) => ClassMask::REGISTER,
            Operand::Immediate(_) => ClassMask::IMMEDIATE,
            Operand::Label(_) => ClassMask::LABEL,
            Operand::Str(_) => ClassMask::STRING,
            Operand::Address { .. } => ClassMask::ADDRESS,
        }
    }
}

// What a statement names: an instruction mnemonic or a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOp {
    Mnemonic(Mnemonic),
    Directive(Directive),
}

// A parsed source line that emits something. The (segment, offset) pair is
// captured when the statement is first encoded so the resolution pass can
// seek back and re-encode in place.
#[derive(Debug, Clone)]
pub struct Statement {
    pub op: StatementOp,
    pub operands: Vec<Operand>,
    pub segment: SegmentId,
    pub offset: u32,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Statement {
    pub fn new(
        op: StatementOp,
        operands: Vec<Operand>,
        file: impl Into<String>,
        line: u32,
        col: u32,
    ) -> Self {
        Self {
            op,
            operands,
            segment: SegmentId::Text,
            offset: 0,
            file: file.into(),
            line,
            col,
        }
    }
}
