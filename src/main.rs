#[macro_use]
mod logger;
mod app;
mod config;
mod error;
mod git;
mod input;
mod session;
mod tui;
mod views;
mod widgets;

use std::path::PathBuf;

use app::App;
use error::Result;

const USAGE: &str = "twig - interactive git branch manager

Usage: twig [OPTIONS]

Options:
  -C, --directory <PATH>  run against the repository at PATH
  -h, --help              print this help
  -V, --version           print the version";

#[derive(Debug)]
enum CliAction {
    Run(PathBuf),
    Exit,
}

fn main() {
    // If a draw path panics the terminal is still in raw mode on the
    // alternate screen; undo that before the message prints.
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = std::io::Write::write_all(&mut std::io::stdout(), b"\x1b[?25h\x1b[?1049l");
        eprintln!("panic: {}", panic_info);
    }));

    let dir = match parse_args(std::env::args().skip(1)) {
        Ok(CliAction::Run(dir)) => dir,
        Ok(CliAction::Exit) => return,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(dir) {
        let _ = std::io::Write::write_all(&mut std::io::stdout(), b"\x1b[?25h\x1b[?1049l");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> std::result::Result<CliAction, String> {
    let mut dir: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("twig {}", env!("CARGO_PKG_VERSION"));
                return Ok(CliAction::Exit);
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(CliAction::Exit);
            }
            "--directory" | "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{} requires a path\n\n{}", arg, USAGE))?;
                dir = Some(PathBuf::from(value));
            }
            other => {
                return Err(format!("unrecognized argument '{}'\n\n{}", other, USAGE));
            }
        }
    }
    Ok(CliAction::Run(dir.unwrap_or_else(|| PathBuf::from("."))))
}

fn run(dir: PathBuf) -> Result<()> {
    logger::init();
    info!("starting in {}", dir.display());
    App::new(dir)?.run()
}
