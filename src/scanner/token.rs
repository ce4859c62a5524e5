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

use crate::tables::{Directive, Mnemonic};

// A single lexical token with its source position (1-based line/column).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub col: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, col: u32) -> Self {
        Self { kind, line, col }
    }
}

// Identifiers are reclassified through the reserved table as they are
// scanned, so mnemonics, directives, and registers arrive pre-resolved.
// Integer carries the 32-bit pattern of the literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    Eol,
    Colon,
    Comma,
    LParen,
    RParen,
    Identifier(String),
    Integer(i32),
    Str(String),
    Mnemonic(Mnemonic),
    Directive(Directive),
    Register(u8),
}

impl TokenKind {
    /// Short name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Eol => "end of line",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Integer(_) => "integer",
            TokenKind::Str(_) => "string",
            TokenKind::Mnemonic(_) => "mnemonic",
            TokenKind::Directive(_) => "directive",
            TokenKind::Register(_) => "register",
        }
    }
}
