use clap::Parser;
use qfolio::cli::{self, Cli};

fn main() {
    let args = Cli::parse();
    if let Err(e) = cli::execute(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
