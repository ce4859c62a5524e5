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

use mipsasm::assemble;
use mipsasm::assembler::Assembly;
use mipsasm::assembler::segment::SegmentId;
use mipsasm::assembler::symbol_table::SymbolStatus;
use mipsasm::file_reader::MockFileReader;
use mipsasm::object_file;
use std::path::PathBuf;

fn assemble_one(source: &str) -> Assembly {
    let mut reader = MockFileReader::default();
    reader.add_file("test.s", source);
    assemble(&[PathBuf::from("test.s")], &reader).unwrap()
}

#[test]
fn test_single_add_instruction() {
    let assembly = assemble_one("add $t0, $t1, $t2\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 4);
    assert_eq!(text.word_at(0x0040_0000), 0x012A_4020);
}

#[test]
fn test_asciiz_in_data_segment() {
    let assembly = assemble_one(".data\nmsg: .asciiz \"hi\"\n");
    assert!(assembly.success());
    assert_eq!(assembly.segment(SegmentId::Data).image(), b"hi\0");
    let msg = assembly.symbols.get("msg").unwrap();
    assert_eq!(msg.status, SymbolStatus::Defined);
    assert_eq!(msg.segment, SegmentId::Data);
    assert_eq!(msg.offset, 0x1001_0000);
}

#[test]
fn test_forward_reference_layout_is_stable() {
    let assembly = assemble_one("j end\naddi $t0, $t0, 1\nend:\nsyscall\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 12);
    assert_eq!(assembly.symbols.get("end").unwrap().offset, 0x0040_0008);
    assert_eq!(text.word_at(0x0040_0000), 0x0810_0002);
    assert_eq!(text.word_at(0x0040_0004), 0x2108_0001);
    assert_eq!(text.word_at(0x0040_0008), 0x0000_000C);
}

#[test]
fn test_li_splits_a_wide_immediate() {
    let assembly = assemble_one("li $t0, 0x12345678\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 8);
    assert_eq!(text.word_at(0x0040_0000), 0x3C01_1234); // lui $1, 0x1234
    assert_eq!(text.word_at(0x0040_0004), 0x3428_5678); // ori $t0, $1, 0x5678
}

#[test]
fn test_li_small_immediates_take_one_word() {
    let assembly = assemble_one("li $t0, 5\nli $t1, 0xFFFF\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 8);
    assert_eq!(text.word_at(0x0040_0000), 0x2408_0005); // addiu $t0, $0, 5
    assert_eq!(text.word_at(0x0040_0004), 0x3409_FFFF); // ori $t1, $0, 0xFFFF
}

#[test]
fn test_double_definition_fails_but_still_encodes() {
    let assembly = assemble_one("lbl: add $t0,$t0,$t0\nlbl: sub $t0,$t0,$t0\n");
    assert!(!assembly.success());
    assert_eq!(assembly.diagnostics.len(), 1);
    assert!(
        assembly.diagnostics[0]
            .to_string()
            .contains("multiple definitions of label 'lbl'")
    );
    let lbl = assembly.symbols.get("lbl").unwrap();
    assert_eq!(lbl.status, SymbolStatus::Doubly);
    assert_eq!(lbl.offset, 0x0040_0000);
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 8);
    assert_eq!(text.word_at(0x0040_0000), 0x0108_4020);
    assert_eq!(text.word_at(0x0040_0004), 0x0108_4022);
}

#[test]
fn test_forward_bge_resolves_to_zero_displacement() {
    let assembly = assemble_one("bge $t0, $t1, target\ntarget: syscall\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 12);
    assert_eq!(text.word_at(0x0040_0000), 0x0109_082A); // slt $1, $t0, $t1
    assert_eq!(text.word_at(0x0040_0004), 0x1020_0000); // beq $1, $0, +0
}

#[test]
fn test_include_is_equivalent_to_inlining() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "a.s",
        "start:\nj end\n.include \"b.s\"\nend: syscall\n",
    );
    reader.add_file("b.s", "addi $t0, $t0, 1\naddi $t1, $t1, 2\n");
    let included = assemble(&[PathBuf::from("a.s")], &reader).unwrap();
    assert!(included.success());

    let inlined = assemble_one(
        "start:\nj end\naddi $t0, $t0, 1\naddi $t1, $t1, 2\nend: syscall\n",
    );
    assert!(inlined.success());

    assert_eq!(
        included.segment(SegmentId::Text).image(),
        inlined.segment(SegmentId::Text).image()
    );
}

#[test]
fn test_missing_include_is_a_diagnostic_not_a_crash() {
    let mut reader = MockFileReader::default();
    reader.add_file("a.s", ".include \"gone.s\"\nsyscall\n");
    let assembly = assemble(&[PathBuf::from("a.s")], &reader).unwrap();
    assert!(!assembly.success());
    assert!(assembly.diagnostics[0].to_string().contains("gone.s"));
    // assembly continued past the failed include
    assert_eq!(assembly.segment(SegmentId::Text).len(), 4);
}

#[test]
fn test_multiple_inputs_concatenate() {
    let mut reader = MockFileReader::default();
    reader.add_file("a.s", "j end\n");
    reader.add_file("b.s", "end: syscall\n");
    let assembly =
        assemble(&[PathBuf::from("a.s"), PathBuf::from("b.s")], &reader).unwrap();
    assert!(assembly.success());
    assert_eq!(assembly.symbols.get("end").unwrap().offset, 0x0040_0004);
    assert_eq!(
        assembly.segment(SegmentId::Text).word_at(0x0040_0000),
        0x0810_0001
    );
}

#[test]
fn test_load_from_label_splits_the_address() {
    let assembly = assemble_one(".data\nvalue: .word 42\n.text\nlw $t0, value\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.len(), 8);
    assert_eq!(text.word_at(0x0040_0000), 0x3C01_1001); // lui $1, 0x1001
    assert_eq!(text.word_at(0x0040_0004), 0x8C28_0000); // lw $t0, 0($1)
}

#[test]
fn test_la_loads_a_data_address() {
    let assembly = assemble_one(".data\nbuf: .space 4\n.text\nla $t0, buf\n");
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    assert_eq!(text.word_at(0x0040_0000), 0x3C01_1001); // lui $1, 0x1001
    assert_eq!(text.word_at(0x0040_0004), 0x3428_0000); // ori $t0, $1, 0
}

#[test]
fn test_character_literals_and_escapes() {
    let assembly = assemble_one(".data\n.byte 'A', '\\n', '\\0'\n.ascii \"a\\tb\"\n");
    assert!(assembly.success());
    assert_eq!(
        assembly.segment(SegmentId::Data).image(),
        &[65, 10, 0, b'a', b'\t', b'b']
    );
}

#[test]
fn test_half_auto_alignment() {
    let assembly = assemble_one(".data\n.byte 1\nh: .half 0x0203\n");
    assert!(assembly.success());
    assert_eq!(assembly.symbols.get("h").unwrap().offset, 0x1001_0002);
    let expected = {
        let mut bytes = vec![1u8, 0];
        bytes.extend_from_slice(&0x0203u16.to_ne_bytes());
        bytes
    };
    assert_eq!(assembly.segment(SegmentId::Data).image(), &expected[..]);
}

#[test]
fn test_every_error_is_reported_in_one_run() {
    let assembly = assemble_one(
        "frob $t0\nadd $t0, $t1\n.align 40\nj nowhere\n",
    );
    assert!(!assembly.success());
    // unrecognized mnemonic, missing operand, align range, undefined symbol
    assert_eq!(assembly.diagnostics.len(), 4);
}

#[test]
fn test_object_file_round_trips_through_disk() {
    let assembly = assemble_one(".data\nmsg: .asciiz \"ok\"\n.text\nsyscall\n");
    assert!(assembly.success());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.obj");
    object_file::write_file(&path, &assembly).unwrap();

    let object = object_file::read_file(&path).unwrap();
    assert_eq!(object.version, object_file::VERSION);
    assert_eq!(object.sections.len(), 2);
    assert_eq!(object.sections[0].segment_id, 1);
    assert_eq!(
        object.sections[0].bytes,
        assembly.segment(SegmentId::Text).image()
    );
    assert_eq!(object.sections[1].segment_id, 2);
    assert_eq!(object.sections[1].bytes, b"ok\0".to_vec());
}

#[test]
fn test_branch_displacement_field() {
    // beq with a backward target four words away
    let assembly = assemble_one(
        "top: syscall\nsyscall\nsyscall\nsyscall\nbeq $t0, $t1, top\n",
    );
    assert!(assembly.success());
    let text = assembly.segment(SegmentId::Text);
    // pc of branch = 0x00400010; disp = (0x00400000 - 0x00400014) >> 2 = -5
    assert_eq!(text.word_at(0x0040_0010), 0x1109_FFFB);
}
