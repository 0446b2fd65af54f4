use anyhow::Result;
use clap::Parser;
use log::info;

use splitpairs::{cli::Cli, options::Options, run};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = match cli.options_file {
        Some(path) => Options::load_from_file(&path)?,
        None => {
            info!("no options file given, running with built-in defaults");
            Options::defaults()
        }
    };

    run(&options)?;
    Ok(())
}
