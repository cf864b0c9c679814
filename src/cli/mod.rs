//! Front-end shim: the interactive menu and its input prompts.

mod input;
mod menu;

pub use menu::Menu;

/// Ignores SIGINT for the rest of the process.
///
/// A Ctrl-C delivered between the dependent writes of a split cascade
/// would leave the file with torn parent links, so both binaries run
/// with the signal ignored and quit through the menu instead.
pub fn ignore_interrupts() {
    #[cfg(unix)]
    {
        use nix::sys::signal::{signal, SigHandler, Signal};
        if unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.is_err() {
            eprintln!("Unable to install interrupt disposition.");
        }
    }
}
