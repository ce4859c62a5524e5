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

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use mipsasm::assembler::segment::SegmentId;
use mipsasm::file_reader::AsmFileReader;
use mipsasm::{assemble, logging, object_file};
use std::fs;
use std::path::PathBuf;

#[derive(clap_parser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    /// Assembly source files, assembled in order
    #[clap(required = true)]
    inputs: Vec<PathBuf>,
    /// Assemble only; do not write an object file
    #[clap(short = 'a', long)]
    assemble_only: bool,
    /// Object file path
    #[clap(short, long, default_value = "a.obj")]
    output: PathBuf,
    /// Dump the raw text-segment bytes to a file
    #[clap(short = 't', long)]
    text_dump: Option<PathBuf>,
    /// Dump the raw data-segment bytes to a file
    #[clap(short = 'd', long)]
    data_dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    let reader = AsmFileReader;

    let assembly = assemble(&opts.inputs, &reader)?;

    for diagnostic in &assembly.diagnostics {
        logging::error(diagnostic.to_string());
    }
    if !assembly.success() {
        std::process::exit(1);
    }

    if let Some(path) = &opts.text_dump {
        fs::write(path, assembly.segment(SegmentId::Text).image())
            .with_context(|| format!("Failed to write text dump: {}", path.display()))?;
    }
    if let Some(path) = &opts.data_dump {
        fs::write(path, assembly.segment(SegmentId::Data).image())
            .with_context(|| format!("Failed to write data dump: {}", path.display()))?;
    }

    if !opts.assemble_only {
        object_file::write_file(&opts.output, &assembly)
            .with_context(|| format!("Failed to write object file: {}", opts.output.display()))?;
        println!(
            "Successfully assembled {} input file(s) to {}",
            opts.inputs.len(),
            opts.output.display()
        );
    }

    Ok(())
}
