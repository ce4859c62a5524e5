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

//! Directive semantics. Segment switching, alignment, and data emission.
//! `.half`/`.word` auto-alignment runs in the driver before the statement's
//! offset is captured, so re-encoding during resolution lands exactly
//! where layout reserved.

use super::{Encoded, Encoder, imm_operand};
use crate::assembler::segment::SegmentId;
use crate::ast::{Operand, Statement};
use crate::errors::AssemblyError;
use crate::tables::{Directive, directive_entry};

impl<'a> Encoder<'a> {
    pub(crate) fn encode_directive(
        &mut self,
        directive: Directive,
        stmt: &Statement,
    ) -> Result<Encoded, AssemblyError> {
        match directive {
            Directive::Text => {
                self.segments.switch(SegmentId::Text);
                Ok(Encoded::Complete)
            }
            Directive::Data => {
                self.segments.switch(SegmentId::Data);
                Ok(Encoded::Complete)
            }
            Directive::KText => {
                self.segments.switch(SegmentId::KText);
                Ok(Encoded::Complete)
            }
            Directive::KData => {
                self.segments.switch(SegmentId::KData);
                Ok(Encoded::Complete)
            }
            // the driver pushes the include's scanner; it never reaches the
            // encoder
            Directive::Include => unreachable!(),
            Directive::Align => self.encode_align(stmt),
            Directive::Space => self.encode_space(stmt),
            Directive::Ascii => self.encode_ascii(stmt, false),
            Directive::Asciiz => self.encode_ascii(stmt, true),
            Directive::Byte | Directive::Half => self.encode_data_items(directive, stmt),
            Directive::Word => self.encode_words(stmt),
        }
    }

    fn encode_align(&mut self, stmt: &Statement) -> Result<Encoded, AssemblyError> {
        let n = imm_operand(&stmt.operands[0]);
        if n == 0 {
            // `.align 0` would disable the next data auto-alignment;
            // that corner is unfinished and stays a no-op.
            return Ok(Encoded::Complete);
        }
        if !(1..=31).contains(&n) {
            return Err(self.semantic(stmt, ".align amount out of range".to_string()));
        }
        match self.segments.current().align(1u32 << n) {
            Some(_) => Ok(Encoded::Complete),
            None => {
                let name = self.segments.current_id().name();
                Err(self.semantic(stmt, format!("{} segment limit exceeded", name)))
            }
        }
    }

    fn encode_space(&mut self, stmt: &Statement) -> Result<Encoded, AssemblyError> {
        let n = imm_operand(&stmt.operands[0]);
        if n < 0 {
            return Err(self.semantic(stmt, ".space length is negative".to_string()));
        }
        self.check_room(stmt, n as u32)?;
        self.segments.current().reserve(n as u32);
        Ok(Encoded::Complete)
    }

    fn encode_ascii(&mut self, stmt: &Statement, terminate: bool) -> Result<Encoded, AssemblyError> {
        self.check_data_segment(stmt)?;
        let text = match &stmt.operands[0] {
            Operand::Str(s) => s,
            _ => unreachable!(),
        };
        let mut bytes = text.as_bytes().to_vec();
        if terminate {
            bytes.push(0);
        }
        self.check_room(stmt, bytes.len() as u32)?;
        self.segments.current().emit(&bytes);
        Ok(Encoded::Complete)
    }

    fn encode_data_items(
        &mut self,
        directive: Directive,
        stmt: &Statement,
    ) -> Result<Encoded, AssemblyError> {
        self.check_data_segment(stmt)?;
        let unit = directive_entry(directive).unit;
        self.check_room(stmt, unit * stmt.operands.len() as u32)?;
        for operand in &stmt.operands {
            let value = imm_operand(operand);
            match directive {
                Directive::Byte => {
                    if !(-0x80..=0xFF).contains(&value) {
                        return Err(
                            self.semantic(stmt, format!("value {} does not fit in a byte", value))
                        );
                    }
                    self.segments.current().emit(&[value as u8]);
                }
                Directive::Half => {
                    if !(-0x8000..=0xFFFF).contains(&value) {
                        return Err(self.semantic(
                            stmt,
                            format!("value {} does not fit in a halfword", value),
                        ));
                    }
                    self.segments.current().emit(&(value as u16).to_ne_bytes());
                }
                _ => unreachable!(),
            }
        }
        Ok(Encoded::Complete)
    }

    // `.word` accepts labels; a forward reference defers the whole
    // directive, reserving all of its items.
    fn encode_words(&mut self, stmt: &Statement) -> Result<Encoded, AssemblyError> {
        let size = 4 * stmt.operands.len() as u32;
        self.check_room(stmt, size)?;
        if !self.resolving {
            if let Some(name) = self.unresolved_label(&stmt.operands) {
                self.segments.current().reserve(size);
                self.symbols.defer(&name, stmt.clone());
                return Ok(Encoded::Deferred);
            }
        }
        for operand in &stmt.operands {
            let word = match operand {
                Operand::Immediate(v) => *v as u32,
                Operand::Label(name) => self.symbols.value(name).unwrap_or(0),
                _ => unreachable!(),
            };
            self.emit_word(word);
        }
        Ok(Encoded::Complete)
    }

    fn check_data_segment(&self, stmt: &Statement) -> Result<(), AssemblyError> {
        let segment_id = self.segments.current_id();
        if segment_id.is_text() {
            return Err(self.semantic(
                stmt,
                format!("data directive not permitted in {} segment", segment_id.name()),
            ));
        }
        Ok(())
    }
}
