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

//! The object-file format:
//!
//! ```text
//! file header (8 bytes):
//!   magic[4]    'm' 'i' 'p' 's'
//!   endianness  1 = little-endian host, 2 = big-endian
//!   version     1
//!   shnum       number of non-empty segments
//!   pad         1 zero byte
//! shnum section headers (12 bytes each), in segment-id order:
//!   pad[3]      zero
//!   segment_id  1 Text | 2 Data | 3 KText | 4 KData
//!   file_offset u32, where the payload begins in this file
//!   size        u32, payload byte count
//! payloads, same order
//! ```
//!
//! Multi-byte fields are host-endian; the header records which.

use crate::assembler::Assembly;
use crate::assembler::segment::SegmentId;
use byteorder::{BigEndian, LittleEndian, NativeEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"mips";
pub const VERSION: u8 = 1;
pub const ENDIAN_LITTLE: u8 = 1;
pub const ENDIAN_BIG: u8 = 2;

const FILE_HEADER_LEN: u32 = 8;
const SECTION_HEADER_LEN: u32 = 12;

fn host_endianness() -> u8 {
    if cfg!(target_endian = "little") {
        ENDIAN_LITTLE
    } else {
        ENDIAN_BIG
    }
}

pub fn write<W: Write>(writer: &mut W, assembly: &Assembly) -> io::Result<()> {
    let present: Vec<_> = SegmentId::ALL
        .iter()
        .map(|&id| assembly.segment(id))
        .filter(|segment| !segment.is_empty())
        .collect();

    writer.write_all(&MAGIC)?;
    writer.write_u8(host_endianness())?;
    writer.write_u8(VERSION)?;
    writer.write_u8(present.len() as u8)?;
    writer.write_u8(0)?;

    let mut file_offset = FILE_HEADER_LEN + SECTION_HEADER_LEN * present.len() as u32;
    for segment in &present {
        writer.write_all(&[0, 0, 0])?;
        writer.write_u8(segment.id().number())?;
        writer.write_u32::<NativeEndian>(file_offset)?;
        writer.write_u32::<NativeEndian>(segment.len())?;
        file_offset += segment.len();
    }
    for segment in &present {
        writer.write_all(segment.image())?;
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub struct Section {
    pub segment_id: u8,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq)]
pub struct ObjectFile {
    pub endianness: u8,
    pub version: u8,
    pub sections: Vec<Section>,
}

pub fn read<R: Read>(reader: &mut R) -> io::Result<ObjectFile> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "not a mips object file",
        ));
    }
    let endianness = reader.read_u8()?;
    let version = reader.read_u8()?;
    if version != VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported object file version {}", version),
        ));
    }
    let shnum = reader.read_u8()?;
    let _pad = reader.read_u8()?;

    let mut headers = Vec::with_capacity(shnum as usize);
    for _ in 0..shnum {
        let mut pad = [0u8; 3];
        reader.read_exact(&mut pad)?;
        let segment_id = reader.read_u8()?;
        let (_file_offset, size) = if endianness == ENDIAN_LITTLE {
            (
                reader.read_u32::<LittleEndian>()?,
                reader.read_u32::<LittleEndian>()?,
            )
        } else {
            (
                reader.read_u32::<BigEndian>()?,
                reader.read_u32::<BigEndian>()?,
            )
        };
        headers.push((segment_id, size));
    }

    let mut sections = Vec::with_capacity(headers.len());
    for (segment_id, size) in headers {
        let mut bytes = vec![0u8; size as usize];
        reader.read_exact(&mut bytes)?;
        sections.push(Section { segment_id, bytes });
    }

    Ok(ObjectFile {
        endianness,
        version,
        sections,
    })
}

pub trait WriteObjectExt: Write + Sized {
    fn write_object(&mut self, assembly: &Assembly) -> io::Result<()> {
        write(self, assembly)
    }
}

impl<W: Write + Sized> WriteObjectExt for W {}

pub trait ReadObjectExt: Read + Sized {
    fn read_object(&mut self) -> io::Result<ObjectFile> {
        read(self)
    }
}

impl<R: Read + Sized> ReadObjectExt for R {}

pub fn write_file<P: AsRef<Path>>(path: P, assembly: &Assembly) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_object(assembly)?;
    writer.flush()
}

pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<ObjectFile> {
    BufReader::new(File::open(path)?).read_object()
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_reader::MockFileReader;
    use std::path::PathBuf;

    fn assemble_source(source: &str) -> Assembly {
        let mut reader = MockFileReader::default();
        reader.add_file("test.s", source);
        crate::assemble(&[PathBuf::from("test.s")], &reader).unwrap()
    }

    #[test]
    fn test_round_trip_two_segments() {
        let assembly = assemble_source(".data\nmsg: .asciiz \"hi\"\n.text\nsyscall\n");
        let mut buffer = Vec::new();
        write(&mut buffer, &assembly).unwrap();

        let object = read(&mut buffer.as_slice()).unwrap();
        assert_eq!(object.endianness, host_endianness());
        assert_eq!(object.version, VERSION);
        assert_eq!(object.sections.len(), 2);
        // segment-id order: text before data
        assert_eq!(object.sections[0].segment_id, 1);
        assert_eq!(object.sections[0].bytes.len(), 4);
        assert_eq!(object.sections[1].segment_id, 2);
        assert_eq!(object.sections[1].bytes, b"hi\0".to_vec());
    }

    #[test]
    fn test_empty_segments_are_omitted() {
        let assembly = assemble_source("syscall\n");
        let mut buffer = Vec::new();
        write(&mut buffer, &assembly).unwrap();
        assert_eq!(buffer[6], 1); // shnum
        let object = read(&mut buffer.as_slice()).unwrap();
        assert_eq!(object.sections.len(), 1);
        assert_eq!(object.sections[0].segment_id, 1);
    }

    #[test]
    fn test_header_layout() {
        let assembly = assemble_source("syscall\n");
        let mut buffer = Vec::new();
        write(&mut buffer, &assembly).unwrap();
        assert_eq!(&buffer[0..4], b"mips");
        assert_eq!(buffer[4], host_endianness());
        assert_eq!(buffer[5], VERSION);
        assert_eq!(buffer[7], 0); // pad
        // section header: 3 pad bytes then the id
        assert_eq!(&buffer[8..11], &[0, 0, 0]);
        assert_eq!(buffer[11], 1);
        // payload begins right after the headers
        assert_eq!(buffer.len(), 8 + 12 + 4);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let bytes = b"nope\x01\x01\x00\x00".to_vec();
        assert!(read(&mut bytes.as_slice()).is_err());
    }
}
