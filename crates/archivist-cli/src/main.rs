use archivist::{run, Cli};
use clap::Parser;

fn main() {
    reset_sigpipe();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("archivist: {}", err);
        std::process::exit(1);
    }
}

/// Restores default SIGPIPE behavior so piping into `head`/`less` exits
/// quietly instead of printing a broken-pipe panic.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
