//! `tree-print`: dumps every node block of an index file in file order.

use bpidx::cli::ignore_interrupts;
use bpidx::storage::NodeBlock;
use bpidx::tree::Walker;
use bpidx::types::{BlockOff, NO_BLOCK};
use eyre::{bail, Result, WrapErr};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    env_logger::init();
    ignore_interrupts();

    let mut path: Option<String> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("tree-print {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ if arg.starts_with('-') => bail!("unknown option: {}", arg),
            _ => {
                if path.is_some() {
                    bail!("multiple index files specified");
                }
                path = Some(arg);
            }
        }
    }
    let Some(path) = path else {
        bail!("syntax: tree-print <index file name>");
    };

    let mut walker =
        Walker::open(&path).wrap_err_with(|| format!("cannot inspect index file {path}"))?;
    while let Some((off, node)) = walker
        .next_node()
        .wrap_err_with(|| format!("cannot read index file {path}"))?
    {
        print_node(off, &node);
    }
    Ok(())
}

fn print_node(off: BlockOff, node: &NodeBlock) {
    println!("Block {off}:");
    println!(">Keys in node: {}", node.keys_used());
    println!("{}", if node.is_leaf() { ">Leaf." } else { ">Node." });
    if node.parent() == NO_BLOCK {
        println!(">Current node is the root of the B+ tree.");
    } else {
        println!(">Parent block: {}.", node.parent());
    }

    let keys: Vec<String> = (0..node.keys_used())
        .map(|slot| node.key(slot).to_string())
        .collect();
    println!("{}", keys.join(" "));

    let children: Vec<String> = (0..=node.keys_used())
        .map(|slot| match node.child(slot) {
            NO_BLOCK => "<nip>".to_string(),
            child => child.to_string(),
        })
        .collect();
    println!("{}", children.join(" "));
    println!();
}

fn print_usage() {
    println!("tree-print - B+ tree index file inspector");
    println!();
    println!("USAGE:");
    println!("    tree-print <index file name>");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}
