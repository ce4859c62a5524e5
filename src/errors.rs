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

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("Lexical Error at {line}:{col}: {reason}")]
    LexicalError { line: u32, col: u32, reason: String },

    #[error("Syntax Error at {line}:{col}: {reason}")]
    SyntaxError { line: u32, col: u32, reason: String },

    #[error("Semantic Error at {line}:{col}: {reason}")]
    SemanticError { line: u32, col: u32, reason: String },

    #[error("Symbol Error at {line}:{col}: {reason}")]
    SymbolError { line: u32, col: u32, reason: String },

    #[error("Include Error at {line}:{col}: {reason}")]
    IncludeError { line: u32, col: u32, reason: String },
}

// A non-fatal error bound to the file it came from. The assembler collects
// these and keeps going, so one run reports every problem in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: String,
    pub error: AssemblyError,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, error: AssemblyError) -> Self {
        Self {
            file: file.into(),
            error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.error)
    }
}
