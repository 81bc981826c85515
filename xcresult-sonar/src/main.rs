// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use std::io::{self, BufWriter};
use xcresult_sonar::XcresultSonarApp;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = enable_ansi_support::enable_ansi_support();

    let app = XcresultSonarApp::parse();
    app.init_output();

    match app.exec(&mut BufWriter::new(io::stdout().lock())) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr();
            std::process::exit(error.process_exit_code())
        }
    }
}
