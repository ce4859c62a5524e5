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

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod logging;
pub mod object_file;
pub mod parser;
pub mod scanner;
pub mod tables;

use anyhow::{Context, Result};
use assembler::{Assembler, Assembly};
use file_reader::FileReader;
use std::path::PathBuf;

/// Assemble the given source files into segment images. Diagnostics are
/// collected on the returned `Assembly`; only unreadable inputs are fatal.
pub fn assemble<F: FileReader>(inputs: &[PathBuf], reader: &F) -> Result<Assembly> {
    let mut assembler = Assembler::new();
    assembler
        .assemble_files(inputs, reader)
        .context("Failed during assembly")?;
    Ok(assembler.into_assembly())
}
