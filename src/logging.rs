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

//! Pretty-printing diagnostics to the console

use colored::Colorize;

/// Pretty-print an error message to stderr
pub fn error(message: impl AsRef<str>) {
    let title = "error:".red().bold();
    eprintln!("{} {}", title, message.as_ref());
}

/// Pretty-print a warning message to stderr
pub fn warning(message: impl AsRef<str>) {
    let title = "warning:".yellow().bold();
    eprintln!("{} {}", title, message.as_ref());
}
