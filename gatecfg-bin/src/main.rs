use clap::Parser;
use gatecfg_cli::Cli;

fn main() {
    let cli = Cli::parse();

    let verdict = match cli.run() {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --verbose for details.");
            e.verdict()
        }
    };
    std::process::exit(verdict.exit_code());
}
