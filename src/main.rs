use std::path::PathBuf;
use std::process::ExitCode;

use gambit::{Options, run};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let extra_model = args.next().map(PathBuf::from);
    if args.next().is_some() {
        eprintln!("usage: gambit [model.obj]");
        return ExitCode::FAILURE;
    }

    let options = Options {
        extra_model,
        ..Options::default()
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
