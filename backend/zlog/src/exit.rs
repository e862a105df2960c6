//! Process termination seam.
//!
//! `fatal` records end the process through an [`ExitHook`] so tests can swap
//! in a hook that records the code instead.

use std::fmt;

pub trait ExitHook: Send + Sync {
    fn exit(&self, code: i32);
}

/// Default hook: `std::process::exit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ExitHook for ProcessExit {
    fn exit(&self, code: i32) {
        terminate(code)
    }
}

impl fmt::Debug for dyn ExitHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExitHook")
    }
}

/// Flush stdio and end the process.
pub fn terminate(code: i32) -> ! {
    use std::io::Write;
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    std::process::exit(code)
}
