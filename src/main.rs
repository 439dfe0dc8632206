use std::process;

use clap::Parser;
use hydroc::cli::Options;
use hydroc::driver;

fn main() {
  let options = Options::parse();

  tracing_subscriber::fmt()
    .with_max_level(options.log_level())
    .with_writer(std::io::stderr)
    .init();

  if let Err(err) = driver::compile(&options) {
    eprintln!("error: {err}");
    process::exit(1);
  }
}
