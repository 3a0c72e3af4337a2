//! spack - Command-line tool for packing and unpacking sprite archives

use std::process::ExitCode;

use sprite_pack::cli;

fn main() -> ExitCode {
    cli::run()
}
