// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Context;
use msvc_compdb::{args, config, event, session};
use std::path::Path;
use std::process::ExitCode;
use std::{env, fs, io};

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Initialize the logging system.
    env_logger::init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::info!("Running on... {family}/{os} {arch}");

    // Parse the command line arguments.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;
    log::info!("{arguments}");
    // Load the configuration.
    let current_directory =
        env::current_dir().with_context(|| "Failed to get current working directory")?;
    let configuration = config::Loader::load(&current_directory, &arguments.config)?;
    log::info!("{configuration}");

    let input: Box<dyn io::Read> = match &arguments.input {
        Some(path) => Box::new(io::BufReader::new(
            fs::File::open(path).with_context(|| format!("Failed to open build events: {path}"))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    // Run the session over the build events.
    let mut session = session::Session::open(&configuration, Path::new(&arguments.output))?;
    for event in event::read(input) {
        session.handle(&event?)?;
    }
    let publication = session.finish()?;
    log::debug!("Session finished: {publication:?}");

    Ok(ExitCode::SUCCESS)
}
