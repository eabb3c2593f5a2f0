mod instance;
mod types;

mod alu;
mod ctl;
mod io;
mod mem;
mod reg;

pub use ctl::Instruction;
pub use instance::{Instance, State};
pub use io::{Io, Storage};
pub use mem::Buffer;
pub use types::{Fault, LoadError};
