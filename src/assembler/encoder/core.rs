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

//! The three classical 32-bit instruction forms:
//!
//! ```text
//! R: [op:6][rs:5][rt:5][rd:5][shamt:5][funct:6]
//! I: [op:6][rs:5][rt:5][imm:16]
//! J: [op:6][address:26]
//! ```

// Opcodes and functs the pseudo expansions reach for directly.
pub const OP_BCOND: u8 = 0x01;
pub const OP_BEQ: u8 = 0x04;
pub const OP_BNE: u8 = 0x05;
pub const OP_ADDIU: u8 = 0x09;
pub const OP_SLTI: u8 = 0x0A;
pub const OP_SLTIU: u8 = 0x0B;
pub const OP_ORI: u8 = 0x0D;
pub const OP_LUI: u8 = 0x0F;

pub const FUNCT_SLL: u8 = 0x00;
pub const FUNCT_SRL: u8 = 0x02;
pub const FUNCT_SRA: u8 = 0x03;
pub const FUNCT_ADD: u8 = 0x20;
pub const FUNCT_ADDU: u8 = 0x21;
pub const FUNCT_SUB: u8 = 0x22;
pub const FUNCT_SUBU: u8 = 0x23;
pub const FUNCT_AND: u8 = 0x24;
pub const FUNCT_OR: u8 = 0x25;
pub const FUNCT_XOR: u8 = 0x26;
pub const FUNCT_NOR: u8 = 0x27;
pub const FUNCT_SLT: u8 = 0x2A;
pub const FUNCT_SLTU: u8 = 0x2B;

pub fn encode_r(op: u8, rs: u8, rt: u8, rd: u8, shamt: u8, funct: u8) -> u32 {
    ((op as u32 & 0x3F) << 26)
        | ((rs as u32 & 0x1F) << 21)
        | ((rt as u32 & 0x1F) << 16)
        | ((rd as u32 & 0x1F) << 11)
        | ((shamt as u32 & 0x1F) << 6)
        | (funct as u32 & 0x3F)
}

pub fn encode_i(op: u8, rs: u8, rt: u8, imm: u16) -> u32 {
    ((op as u32 & 0x3F) << 26)
        | ((rs as u32 & 0x1F) << 21)
        | ((rt as u32 & 0x1F) << 16)
        | imm as u32
}

/// `target` is a byte address; the word field holds it shifted out of the
/// two alignment bits.
pub fn encode_j(op: u8, target: u32) -> u32 {
    ((op as u32 & 0x3F) << 26) | ((target >> 2) & 0x03FF_FFFF)
}

/// syscall with its 20-bit code field (bits 25:6).
pub fn encode_syscall(code: u32, funct: u8) -> u32 {
    ((code & 0xF_FFFF) << 6) | funct as u32
}

// ------------- unit tests -------------
