mod memory;
mod process_control_block;
mod scheduler;

use memory::FrameTable;
use process_control_block::ProcessControlBlock;

pub mod driver;

pub use driver::Driver;
pub use memory::Frame;
pub use process_control_block::{Pid, ROOT_PID};
pub use scheduler::{KernelError, Scheduler};
