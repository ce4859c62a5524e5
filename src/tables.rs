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

//! Static metadata: the reserved-keyword table mapping every mnemonic,
//! directive, and register spelling to its descriptor, and the opcode and
//! directive tables holding per-identity encoding data.

use crate::ast::{ClassMask, OperandFormat};

// Instruction mnemonics, declared in the reserved-table sort order. The
// OPCODES table below is indexed by this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Abs,
    Add,
    Addi,
    Addiu,
    Addu,
    And,
    Andi,
    B,
    Beq,
    Beqz,
    Bge,
    Bgeu,
    Bgez,
    Bgt,
    Bgtu,
    Bgtz,
    Ble,
    Bleu,
    Blez,
    Blt,
    Bltu,
    Bltz,
    Bne,
    Bnez,
    Div,
    Divu,
    J,
    Jal,
    Jr,
    La,
    Lb,
    Lbu,
    Lh,
    Lhu,
    Li,
    Lui,
    Lw,
    Mfhi,
    Mflo,
    Move,
    Mul,
    Mult,
    Multu,
    Neg,
    Nor,
    Not,
    Or,
    Ori,
    Rol,
    Ror,
    Sb,
    Sgt,
    Sh,
    Sll,
    Slt,
    Slti,
    Sltiu,
    Sltu,
    Sne,
    Sra,
    Srl,
    Sub,
    Subu,
    Sw,
    Syscall,
    Xor,
    Xori,
}

// Directives, declared in reserved-table sort order; DIRECTIVES is indexed
// by this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Align,
    Ascii,
    Asciiz,
    Byte,
    Data,
    Half,
    Include,
    KData,
    KText,
    Space,
    Text,
    Word,
}

// What a reserved name stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reserved {
    Mnemonic(Mnemonic),
    Directive(Directive),
    Register(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    Core,
    Pseudo,
}

// Encoding descriptor for one mnemonic. `size` is the declared layout size
// in bytes: the space reserved when a forward reference defers encoding.
// `rt` is the rt-field override used by the branch-on-condition group.
#[derive(Debug)]
pub struct OpcodeEntry {
    pub op: u8,
    pub funct: u8,
    pub rt: u8,
    pub kind: OpcodeKind,
    pub size: u32,
    pub format: OperandFormat,
}

// Descriptor for one directive. `unit` is the byte width emitted per data
// operand (0 for directives that do not emit fixed-width items).
#[derive(Debug)]
pub struct DirectiveEntry {
    pub unit: u32,
    pub format: OperandFormat,
}

const NONE: ClassMask = ClassMask::empty();
const REG: ClassMask = ClassMask::REGISTER;
const IMM: ClassMask = ClassMask::IMMEDIATE;
const LAB: ClassMask = ClassMask::LABEL;
const STR: ClassMask = ClassMask::STRING;
// A branch or jump target: a label or an absolute address.
const TARGET: ClassMask = LAB.union(IMM);
const REG_OR_IMM: ClassMask = REG.union(IMM);
// A load/store source: displacement(base), a bare label, or an absolute
// address.
const MEM: ClassMask = ClassMask::ADDRESS.union(LAB).union(IMM);
const IMM_LIST: ClassMask = IMM.union(ClassMask::REPEAT);
const DATA_LIST: ClassMask = IMM.union(LAB).union(ClassMask::REPEAT);
const CODE_OPT: ClassMask = IMM.union(ClassMask::OPTIONAL);

const R3: OperandFormat = [REG, REG, REG];
const R2: OperandFormat = [REG, REG, NONE];
const SHIFT: OperandFormat = [REG, REG, IMM];
const REG_IMM_2: OperandFormat = [REG, IMM, NONE];
const IMM_ALU: OperandFormat = [REG, REG, IMM];
const LOAD_STORE: OperandFormat = [REG, MEM, NONE];
const BRANCH2: OperandFormat = [REG, TARGET, NONE];
const BRANCH3: OperandFormat = [REG, REG, TARGET];
const CMP_BRANCH: OperandFormat = [REG, REG_OR_IMM, TARGET];
const JUMP: OperandFormat = [TARGET, NONE, NONE];
const BARE: OperandFormat = [NONE, NONE, NONE];

const fn core(op: u8, funct: u8, rt: u8, format: OperandFormat) -> OpcodeEntry {
    OpcodeEntry {
        op,
        funct,
        rt,
        kind: OpcodeKind::Core,
        size: 4,
        format,
    }
}

const fn pseudo(size: u32, format: OperandFormat) -> OpcodeEntry {
    OpcodeEntry {
        op: 0,
        funct: 0,
        rt: 0,
        kind: OpcodeKind::Pseudo,
        size,
        format,
    }
}

const fn dir(unit: u32, format: OperandFormat) -> DirectiveEntry {
    DirectiveEntry { unit, format }
}

// Indexed by the Mnemonic declaration order.
static OPCODES: [OpcodeEntry; 67] = [
    pseudo(12, R2),                         // abs
    core(0x00, 0x20, 0, R3),                // add
    core(0x08, 0x00, 0, IMM_ALU),           // addi
    core(0x09, 0x00, 0, IMM_ALU),           // addiu
    core(0x00, 0x21, 0, R3),                // addu
    core(0x00, 0x24, 0, R3),                // and
    core(0x0C, 0x00, 0, IMM_ALU),           // andi
    pseudo(4, JUMP),                        // b
    core(0x04, 0x00, 0, BRANCH3),           // beq
    pseudo(4, BRANCH2),                     // beqz
    pseudo(8, CMP_BRANCH),                  // bge
    pseudo(8, CMP_BRANCH),                  // bgeu
    core(0x01, 0x00, 1, BRANCH2),           // bgez
    pseudo(8, CMP_BRANCH),                  // bgt
    pseudo(8, CMP_BRANCH),                  // bgtu
    core(0x07, 0x00, 0, BRANCH2),           // bgtz
    pseudo(8, CMP_BRANCH),                  // ble
    pseudo(8, CMP_BRANCH),                  // bleu
    core(0x06, 0x00, 0, BRANCH2),           // blez
    pseudo(8, CMP_BRANCH),                  // blt
    pseudo(8, CMP_BRANCH),                  // bltu
    core(0x01, 0x00, 0, BRANCH2),           // bltz
    core(0x05, 0x00, 0, BRANCH3),           // bne
    pseudo(4, BRANCH2),                     // bnez
    core(0x00, 0x1A, 0, R2),                // div
    core(0x00, 0x1B, 0, R2),                // divu
    core(0x02, 0x00, 0, JUMP),              // j
    core(0x03, 0x00, 0, JUMP),              // jal
    core(0x00, 0x08, 0, [REG, NONE, NONE]), // jr
    pseudo(8, BRANCH2),                     // la (reg, label-or-addr)
    core(0x20, 0x00, 0, LOAD_STORE),        // lb
    core(0x24, 0x00, 0, LOAD_STORE),        // lbu
    core(0x21, 0x00, 0, LOAD_STORE),        // lh
    core(0x25, 0x00, 0, LOAD_STORE),        // lhu
    pseudo(8, REG_IMM_2),                   // li
    core(0x0F, 0x00, 0, REG_IMM_2),         // lui
    core(0x23, 0x00, 0, LOAD_STORE),        // lw
    core(0x00, 0x10, 0, [REG, NONE, NONE]), // mfhi
    core(0x00, 0x12, 0, [REG, NONE, NONE]), // mflo
    pseudo(4, R2),                          // move
    core(0x1C, 0x02, 0, R3),                // mul
    core(0x00, 0x18, 0, R2),                // mult
    core(0x00, 0x19, 0, R2),                // multu
    pseudo(4, R2),                          // neg
    core(0x00, 0x27, 0, R3),                // nor
    pseudo(4, R2),                          // not
    core(0x00, 0x25, 0, R3),                // or
    core(0x0D, 0x00, 0, IMM_ALU),           // ori
    pseudo(12, SHIFT),                      // rol
    pseudo(12, SHIFT),                      // ror
    core(0x28, 0x00, 0, LOAD_STORE),        // sb
    pseudo(4, R3),                          // sgt
    core(0x29, 0x00, 0, LOAD_STORE),        // sh
    core(0x00, 0x00, 0, SHIFT),             // sll
    core(0x00, 0x2A, 0, R3),                // slt
    core(0x0A, 0x00, 0, IMM_ALU),           // slti
    core(0x0B, 0x00, 0, IMM_ALU),           // sltiu
    core(0x00, 0x2B, 0, R3),                // sltu
    pseudo(8, R3),                          // sne
    core(0x00, 0x03, 0, SHIFT),             // sra
    core(0x00, 0x02, 0, SHIFT),             // srl
    core(0x00, 0x22, 0, R3),                // sub
    core(0x00, 0x23, 0, R3),                // subu
    core(0x2B, 0x00, 0, LOAD_STORE),        // sw
    core(0x00, 0x0C, 0, [CODE_OPT, NONE, NONE]), // syscall
    core(0x00, 0x26, 0, R3),                // xor
    core(0x0E, 0x00, 0, IMM_ALU),           // xori
];

// Indexed by the Directive declaration order.
static DIRECTIVES: [DirectiveEntry; 12] = [
    dir(0, [IMM, NONE, NONE]),      // .align
    dir(0, [STR, NONE, NONE]),      // .ascii
    dir(0, [STR, NONE, NONE]),      // .asciiz
    dir(1, [IMM_LIST, NONE, NONE]), // .byte
    dir(0, BARE),                   // .data
    dir(2, [IMM_LIST, NONE, NONE]), // .half
    dir(0, [STR, NONE, NONE]),      // .include
    dir(0, BARE),                   // .kdata
    dir(0, BARE),                   // .ktext
    dir(0, [IMM, NONE, NONE]),      // .space
    dir(0, BARE),                   // .text
    dir(4, [DATA_LIST, NONE, NONE]), // .word
];

pub fn opcode_entry(mnemonic: Mnemonic) -> &'static OpcodeEntry {
    &OPCODES[mnemonic as usize]
}

pub fn directive_entry(directive: Directive) -> &'static DirectiveEntry {
    &DIRECTIVES[directive as usize]
}

// The reserved-keyword table, sorted by name so lookup can binary-search.
// ASCII order puts register names ('$') first, then directives ('.'), then
// mnemonics.
static RESERVED: &[(&str, Reserved)] = &[
    ("$0", Reserved::Register(0)),
    ("$1", Reserved::Register(1)),
    ("$10", Reserved::Register(10)),
    ("$11", Reserved::Register(11)),
    ("$12", Reserved::Register(12)),
    ("$13", Reserved::Register(13)),
    ("$14", Reserved::Register(14)),
    ("$15", Reserved::Register(15)),
    ("$16", Reserved::Register(16)),
    ("$17", Reserved::Register(17)),
    ("$18", Reserved::Register(18)),
    ("$19", Reserved::Register(19)),
    ("$2", Reserved::Register(2)),
    ("$20", Reserved::Register(20)),
    ("$21", Reserved::Register(21)),
    ("$22", Reserved::Register(22)),
    ("$23", Reserved::Register(23)),
    ("$24", Reserved::Register(24)),
    ("$25", Reserved::Register(25)),
    ("$26", Reserved::Register(26)),
    ("$27", Reserved::Register(27)),
    ("$28", Reserved::Register(28)),
    ("$29", Reserved::Register(29)),
    ("$3", Reserved::Register(3)),
    ("$30", Reserved::Register(30)),
    ("$31", Reserved::Register(31)),
    ("$4", Reserved::Register(4)),
    ("$5", Reserved::Register(5)),
    ("$6", Reserved::Register(6)),
    ("$7", Reserved::Register(7)),
    ("$8", Reserved::Register(8)),
    ("$9", Reserved::Register(9)),
    ("$a0", Reserved::Register(4)),
    ("$a1", Reserved::Register(5)),
    ("$a2", Reserved::Register(6)),
    ("$a3", Reserved::Register(7)),
    ("$at", Reserved::Register(1)),
    ("$fp", Reserved::Register(30)),
    ("$gp", Reserved::Register(28)),
    ("$k0", Reserved::Register(26)),
    ("$k1", Reserved::Register(27)),
    ("$ra", Reserved::Register(31)),
    ("$s0", Reserved::Register(16)),
    ("$s1", Reserved::Register(17)),
    ("$s2", Reserved::Register(18)),
    ("$s3", Reserved::Register(19)),
    ("$s4", Reserved::Register(20)),
    ("$s5", Reserved::Register(21)),
    ("$s6", Reserved::Register(22)),
    ("$s7", Reserved::Register(23)),
    ("$sp", Reserved::Register(29)),
    ("$t0", Reserved::Register(8)),
    ("$t1", Reserved::Register(9)),
    ("$t2", Reserved::Register(10)),
    ("$t3", Reserved::Register(11)),
    ("$t4", Reserved::Register(12)),
    ("$t5", Reserved::Register(13)),
    ("$t6", Reserved::Register(14)),
    ("$t7", Reserved::Register(15)),
    ("$t8", Reserved::Register(24)),
    ("$t9", Reserved::Register(25)),
    ("$v0", Reserved::Register(2)),
    ("$v1", Reserved::Register(3)),
    ("$zero", Reserved::Register(0)),
    (".align", Reserved::Directive(Directive::Align)),
    (".ascii", Reserved::Directive(Directive::Ascii)),
    (".asciiz", Reserved::Directive(Directive::Asciiz)),
    (".byte", Reserved::Directive(Directive::Byte)),
    (".data", Reserved::Directive(Directive::Data)),
    (".half", Reserved::Directive(Directive::Half)),
    (".include", Reserved::Directive(Directive::Include)),
    (".kdata", Reserved::Directive(Directive::KData)),
    (".ktext", Reserved::Directive(Directive::KText)),
    (".space", Reserved::Directive(Directive::Space)),
    (".text", Reserved::Directive(Directive::Text)),
    (".word", Reserved::Directive(Directive::Word)),
    ("abs", Reserved::Mnemonic(Mnemonic::Abs)),
    ("add", Reserved::Mnemonic(Mnemonic::Add)),
    ("addi", Reserved::Mnemonic(Mnemonic::Addi)),
    ("addiu", Reserved::Mnemonic(Mnemonic::Addiu)),
    ("addu", Reserved::Mnemonic(Mnemonic::Addu)),
    ("and", Reserved::Mnemonic(Mnemonic::And)),
    ("andi", Reserved::Mnemonic(Mnemonic::Andi)),
    ("b", Reserved::Mnemonic(Mnemonic::B)),
    ("beq", Reserved::Mnemonic(Mnemonic::Beq)),
    ("beqz", Reserved::Mnemonic(Mnemonic::Beqz)),
    ("bge", Reserved::Mnemonic(Mnemonic::Bge)),
    ("bgeu", Reserved::Mnemonic(Mnemonic::Bgeu)),
    ("bgez", Reserved::Mnemonic(Mnemonic::Bgez)),
    ("bgt", Reserved::Mnemonic(Mnemonic::Bgt)),
    ("bgtu", Reserved::Mnemonic(Mnemonic::Bgtu)),
    ("bgtz", Reserved::Mnemonic(Mnemonic::Bgtz)),
    ("ble", Reserved::Mnemonic(Mnemonic::Ble)),
    ("bleu", Reserved::Mnemonic(Mnemonic::Bleu)),
    ("blez", Reserved::Mnemonic(Mnemonic::Blez)),
    ("blt", Reserved::Mnemonic(Mnemonic::Blt)),
    ("bltu", Reserved::Mnemonic(Mnemonic::Bltu)),
    ("bltz", Reserved::Mnemonic(Mnemonic::Bltz)),
    ("bne", Reserved::Mnemonic(Mnemonic::Bne)),
    ("bnez", Reserved::Mnemonic(Mnemonic::Bnez)),
    ("div", Reserved::Mnemonic(Mnemonic::Div)),
    ("divu", Reserved::Mnemonic(Mnemonic::Divu)),
    ("j", Reserved::Mnemonic(Mnemonic::J)),
    ("jal", Reserved::Mnemonic(Mnemonic::Jal)),
    ("jr", Reserved::Mnemonic(Mnemonic::Jr)),
    ("la", Reserved::Mnemonic(Mnemonic::La)),
    ("lb", Reserved::Mnemonic(Mnemonic::Lb)),
    ("lbu", Reserved::Mnemonic(Mnemonic::Lbu)),
    ("lh", Reserved::Mnemonic(Mnemonic::Lh)),
    ("lhu", Reserved::Mnemonic(Mnemonic::Lhu)),
    ("li", Reserved::Mnemonic(Mnemonic::Li)),
    ("lui", Reserved::Mnemonic(Mnemonic::Lui)),
    ("lw", Reserved::Mnemonic(Mnemonic::Lw)),
    ("mfhi", Reserved::Mnemonic(Mnemonic::Mfhi)),
    ("mflo", Reserved::Mnemonic(Mnemonic::Mflo)),
    ("move", Reserved::Mnemonic(Mnemonic::Move)),
    ("mul", Reserved::Mnemonic(Mnemonic::Mul)),
    ("mult", Reserved::Mnemonic(Mnemonic::Mult)),
    ("multu", Reserved::Mnemonic(Mnemonic::Multu)),
    ("neg", Reserved::Mnemonic(Mnemonic::Neg)),
    ("nor", Reserved::Mnemonic(Mnemonic::Nor)),
    ("not", Reserved::Mnemonic(Mnemonic::Not)),
    ("or", Reserved::Mnemonic(Mnemonic::Or)),
    ("ori", Reserved::Mnemonic(Mnemonic::Ori)),
    ("rol", Reserved::Mnemonic(Mnemonic::Rol)),
    ("ror", Reserved::Mnemonic(Mnemonic::Ror)),
    ("sb", Reserved::Mnemonic(Mnemonic::Sb)),
    ("sgt", Reserved::Mnemonic(Mnemonic::Sgt)),
    ("sh", Reserved::Mnemonic(Mnemonic::Sh)),
    ("sll", Reserved::Mnemonic(Mnemonic::Sll)),
    ("slt", Reserved::Mnemonic(Mnemonic::Slt)),
    ("slti", Reserved::Mnemonic(Mnemonic::Slti)),
    ("sltiu", Reserved::Mnemonic(Mnemonic::Sltiu)),
    ("sltu", Reserved::Mnemonic(Mnemonic::Sltu)),
    ("sne", Reserved::Mnemonic(Mnemonic::Sne)),
    ("sra", Reserved::Mnemonic(Mnemonic::Sra)),
    ("srl", Reserved::Mnemonic(Mnemonic::Srl)),
    ("sub", Reserved::Mnemonic(Mnemonic::Sub)),
    ("subu", Reserved::Mnemonic(Mnemonic::Subu)),
    ("sw", Reserved::Mnemonic(Mnemonic::Sw)),
    ("syscall", Reserved::Mnemonic(Mnemonic::Syscall)),
    ("xor", Reserved::Mnemonic(Mnemonic::Xor)),
    ("xori", Reserved::Mnemonic(Mnemonic::Xori)),
];

/// Look up an identifier in the reserved table. Identifiers are
/// case-sensitive.
pub fn lookup(name: &str) -> Option<Reserved> {
    RESERVED
        .binary_search_by_key(&name, |&(entry_name, _)| entry_name)
        .ok()
        .map(|index| RESERVED[index].1)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_table_is_sorted() {
        for pair in RESERVED.windows(2) {
            assert!(
                pair[0].0 < pair[1].0,
                "reserved table out of order: {} >= {}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn test_lookup_mnemonics() {
        assert_eq!(lookup("add"), Some(Reserved::Mnemonic(Mnemonic::Add)));
        assert_eq!(lookup("xori"), Some(Reserved::Mnemonic(Mnemonic::Xori)));
        assert_eq!(lookup("syscall"), Some(Reserved::Mnemonic(Mnemonic::Syscall)));
    }

    #[test]
    fn test_lookup_directives() {
        assert_eq!(lookup(".word"), Some(Reserved::Directive(Directive::Word)));
        assert_eq!(lookup(".text"), Some(Reserved::Directive(Directive::Text)));
        assert_eq!(
            lookup(".asciiz"),
            Some(Reserved::Directive(Directive::Asciiz))
        );
    }

    #[test]
    fn test_lookup_registers() {
        assert_eq!(lookup("$zero"), Some(Reserved::Register(0)));
        assert_eq!(lookup("$t0"), Some(Reserved::Register(8)));
        assert_eq!(lookup("$t8"), Some(Reserved::Register(24)));
        assert_eq!(lookup("$sp"), Some(Reserved::Register(29)));
        assert_eq!(lookup("$31"), Some(Reserved::Register(31)));
    }

    #[test]
    fn test_lookup_rejects_unknown_names() {
        assert_eq!(lookup("bogus"), None);
        assert_eq!(lookup("$t10"), None);
        assert_eq!(lookup(".org"), None);
        assert_eq!(lookup("ADD"), None); // case-sensitive
    }

    #[test]
    fn test_opcode_entries_line_up_with_mnemonics() {
        assert_eq!(opcode_entry(Mnemonic::Add).funct, 0x20);
        assert_eq!(opcode_entry(Mnemonic::Lw).op, 0x23);
        assert_eq!(opcode_entry(Mnemonic::Sw).op, 0x2B);
        assert_eq!(opcode_entry(Mnemonic::Bgez).rt, 1);
        assert_eq!(opcode_entry(Mnemonic::Bltz).rt, 0);
        assert_eq!(opcode_entry(Mnemonic::Mul).op, 0x1C);
        assert_eq!(opcode_entry(Mnemonic::Mul).funct, 0x02);
        assert_eq!(opcode_entry(Mnemonic::Xori).op, 0x0E);
        assert_eq!(opcode_entry(Mnemonic::Syscall).funct, 0x0C);
    }

    #[test]
    fn test_pseudo_declared_sizes() {
        assert_eq!(opcode_entry(Mnemonic::Li).size, 8);
        assert_eq!(opcode_entry(Mnemonic::La).size, 8);
        assert_eq!(opcode_entry(Mnemonic::Abs).size, 12);
        assert_eq!(opcode_entry(Mnemonic::Move).size, 4);
        assert_eq!(opcode_entry(Mnemonic::Bge).size, 8);
        assert_eq!(opcode_entry(Mnemonic::Sne).size, 8);
    }

    #[test]
    fn test_directive_units() {
        assert_eq!(directive_entry(Directive::Byte).unit, 1);
        assert_eq!(directive_entry(Directive::Half).unit, 2);
        assert_eq!(directive_entry(Directive::Word).unit, 4);
    }
}
