//! `apibuilder` binary.

fn main() {
    let code = apibuilder_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
