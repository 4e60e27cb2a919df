mod cli;
mod execute;

use clap::Parser;
use suggest::ui::error_style;
use crate::cli::CLI;

fn main() {
    let cli = CLI::parse();
    if let Err(e) = execute::execute(cli) {
        eprintln!(" {}", error_style(&format!("{e:#}")));
        std::process::exit(1);
    }
}
