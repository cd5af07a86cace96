use std::io::{self, BufRead};

use anyhow::Result;
use log::{debug, warn};

use super::{KernelError, Scheduler};

/// Owns the kernel instance and drives it from lines of text: one command
/// per line, whitespace-tokenized, one kernel operation per command.
pub struct Driver {
    scheduler: Scheduler,
}

#[derive(Debug, PartialEq)]
enum Command {
    ShowReady,
    ShowIo,
    ShowMemory,
    Create,
    Tick,
    Fork,
    Exit,
    Wait,
    RequestDisk { disk: usize, file_name: String },
    ReleaseDisk { disk: usize },
    MemoryOp { address: u64 },
}

impl Driver {
    pub fn new(ram: u64, page_size: u64, disk_count: usize) -> Driver {
        Driver {
            scheduler: Scheduler::new(ram, page_size, disk_count),
        }
    }

    // Reads commands from stdin until end of input. No command is fatal;
    // rejected commands are reported and the loop moves on.
    pub fn start(&mut self) -> Result<()> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            self.handle_line(&line);
        }

        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match parse_command(line) {
            Some(command) => {
                debug!("dispatching command: {}", line);
                if let Err(err) = self.dispatch(command) {
                    println!("{}", err);
                }
            }
            None => {
                warn!("unrecognized command: {}", line);
                println!("Unrecognized command: {}", line);
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<(), KernelError> {
        match command {
            Command::ShowReady => {
                print!("{}", render_ready_snapshot(&self.scheduler));
                Ok(())
            }
            Command::ShowIo => {
                print!("{}", render_io_snapshot(&self.scheduler));
                Ok(())
            }
            Command::ShowMemory => {
                print!("{}", render_memory_snapshot(&self.scheduler));
                Ok(())
            }
            Command::Create => {
                let pid = self.scheduler.create_process();
                debug!("created process {}", pid);
                Ok(())
            }
            Command::Tick => self.scheduler.schedule_tick(),
            Command::Fork => self.scheduler.fork().map(|_| ()),
            Command::Exit => self.scheduler.exit(),
            Command::Wait => self.scheduler.wait(),
            Command::RequestDisk { disk, file_name } => {
                self.scheduler.request_disk(disk, file_name)
            }
            Command::ReleaseDisk { disk } => self.scheduler.release_disk(disk),
            Command::MemoryOp { address } => self.scheduler.request_memory_operation(address),
        }
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        ["S", "r"] => Some(Command::ShowReady),
        ["S", "i"] => Some(Command::ShowIo),
        ["S", "m"] => Some(Command::ShowMemory),
        ["A"] => Some(Command::Create),
        ["Q"] => Some(Command::Tick),
        ["fork"] => Some(Command::Fork),
        ["exit"] => Some(Command::Exit),
        ["wait"] => Some(Command::Wait),
        ["d", disk, file_name] => Some(Command::RequestDisk {
            disk: disk.parse().ok()?,
            file_name: (*file_name).to_string(),
        }),
        ["D", disk] => Some(Command::ReleaseDisk {
            disk: disk.parse().ok()?,
        }),
        ["m", address] => Some(Command::MemoryOp {
            address: address.parse().ok()?,
        }),
        _ => None,
    }
}

fn render_ready_snapshot(scheduler: &Scheduler) -> String {
    let mut out = String::new();

    match scheduler.get_cpu() {
        Some(pid) => out.push_str(&format!("Process using CPU: {}\n", pid)),
        None => out.push_str("Process using CPU: idle\n"),
    }

    out.push_str("Ready queue:");
    for pid in scheduler.get_ready_queue() {
        out.push_str(&format!(" <- {}", pid));
    }
    out.push('\n');

    out
}

fn render_io_snapshot(scheduler: &Scheduler) -> String {
    let mut out = String::new();

    for (number, disk) in scheduler.get_disks().iter().enumerate() {
        match disk.get_current() {
            None => out.push_str(&format!("Disk {}: idle\n", number)),
            Some(request) => {
                out.push_str(&format!(
                    "Disk {}: [{} {}]\n",
                    number, request.pid, request.file_name
                ));
                out.push_str(&format!("Queue for disk {}:", number));
                for queued in disk.get_wait_queue() {
                    out.push_str(&format!(" <- [{} {}]", queued.pid, queued.file_name));
                }
                out.push('\n');
            }
        }
    }

    out
}

fn render_memory_snapshot(scheduler: &Scheduler) -> String {
    let mut out = String::from("Frame   Page    Pid     Timestamp\n");

    for (number, slot) in scheduler.get_frame_slots().iter().enumerate() {
        match slot {
            Some(frame) => out.push_str(&format!(
                "{:<8}{:<8}{:<8}{}\n",
                number, frame.page, frame.pid, frame.timestamp
            )),
            None => out.push_str(&format!("{}\n", number)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> Driver {
        Driver::new(32, 8, 2)
    }

    #[test]
    fn test_driver_parse_snapshot_commands() {
        assert_eq!(parse_command("S r"), Some(Command::ShowReady));
        assert_eq!(parse_command("S i"), Some(Command::ShowIo));
        assert_eq!(parse_command("S m"), Some(Command::ShowMemory));
    }

    #[test]
    fn test_driver_parse_process_commands() {
        assert_eq!(parse_command("A"), Some(Command::Create));
        assert_eq!(parse_command("Q"), Some(Command::Tick));
        assert_eq!(parse_command("fork"), Some(Command::Fork));
        assert_eq!(parse_command("exit"), Some(Command::Exit));
        assert_eq!(parse_command("wait"), Some(Command::Wait));
    }

    #[test]
    fn test_driver_parse_resource_commands() {
        assert_eq!(
            parse_command("d 1 file.txt"),
            Some(Command::RequestDisk {
                disk: 1,
                file_name: "file.txt".to_string()
            })
        );
        assert_eq!(parse_command("D 0"), Some(Command::ReleaseDisk { disk: 0 }));
        assert_eq!(parse_command("m 300"), Some(Command::MemoryOp { address: 300 }));
    }

    #[test]
    fn test_driver_parse_tolerates_extra_whitespace() {
        assert_eq!(parse_command("  S    r  "), Some(Command::ShowReady));
        assert_eq!(
            parse_command("d   0   f"),
            Some(Command::RequestDisk {
                disk: 0,
                file_name: "f".to_string()
            })
        );
    }

    #[test]
    fn test_driver_parse_rejects_malformed_commands() {
        assert_eq!(parse_command("S"), None);
        assert_eq!(parse_command("S x"), None);
        assert_eq!(parse_command("d zero file"), None);
        assert_eq!(parse_command("d 0"), None);
        assert_eq!(parse_command("D"), None);
        assert_eq!(parse_command("m eleven"), None);
        assert_eq!(parse_command("halt"), None);
    }

    #[test]
    fn test_driver_render_ready_snapshot_idle() {
        let driver = driver();

        let out = render_ready_snapshot(&driver.scheduler);

        assert_eq!(out, "Process using CPU: idle\nReady queue:\n");
    }

    #[test]
    fn test_driver_render_ready_snapshot_with_queue() {
        let mut driver = driver();
        driver.handle_line("A");
        driver.handle_line("A");
        driver.handle_line("A");

        let out = render_ready_snapshot(&driver.scheduler);

        assert_eq!(out, "Process using CPU: 2\nReady queue: <- 3 <- 4\n");
    }

    #[test]
    fn test_driver_render_io_snapshot() {
        let mut driver = driver();
        driver.handle_line("A");
        driver.handle_line("A");
        driver.handle_line("d 1 notes.txt");
        driver.handle_line("d 1 log.txt");

        let out = render_io_snapshot(&driver.scheduler);

        assert_eq!(
            out,
            "Disk 0: idle\nDisk 1: [2 notes.txt]\nQueue for disk 1: <- [3 log.txt]\n"
        );
    }

    #[test]
    fn test_driver_render_memory_snapshot_blank_rows_for_empty_slots() {
        let mut driver = driver();
        driver.handle_line("A");
        driver.handle_line("A");
        driver.handle_line("m 0"); // Page 0 for pid 2.
        driver.handle_line("Q");
        driver.handle_line("m 8"); // Page 1 for pid 3.
        driver.handle_line("exit"); // Pid 3 exits; its frame empties.

        let out = render_memory_snapshot(&driver.scheduler);

        assert_eq!(
            out,
            "Frame   Page    Pid     Timestamp\n0       0       2       0\n1\n"
        );
    }

    #[test]
    fn test_driver_rejected_command_leaves_state_unchanged() {
        let mut driver = driver();
        driver.handle_line("A");

        driver.handle_line("D 7"); // No such disk.
        driver.handle_line("fork me"); // Malformed.

        assert_eq!(driver.scheduler.get_cpu(), Some(2));
        assert_eq!(driver.scheduler.get_ready_queue().count(), 0);
    }
}
