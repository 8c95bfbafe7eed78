use clap::Parser;
use provenant::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(provenant::run(&cli));
}
