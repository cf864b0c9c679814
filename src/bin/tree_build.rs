//! `tree-build`: interactive construction of a B+ tree index file.
//!
//! Presents a numbered menu for creating/opening an index, inserting and
//! searching keys, and quitting. Run `tree-print` on the resulting file
//! to inspect its node blocks.

use bpidx::cli::{ignore_interrupts, Menu};
use eyre::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    env_logger::init();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("tree-build {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other => eyre::bail!("unknown option: {}", other),
        }
    }

    ignore_interrupts();

    let mut menu = Menu::new()?;
    menu.run()?;
    Ok(())
}

fn print_usage() {
    println!("tree-build - interactive B+ tree index builder");
    println!();
    println!("USAGE:");
    println!("    tree-build");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!();
    println!("The index file is chosen interactively from the menu.");
}
