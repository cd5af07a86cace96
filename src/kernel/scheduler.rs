use std::collections::{HashMap, VecDeque};

use log::{debug, info, warn};
use thiserror::Error;

use super::memory::Frame;
use super::{FrameTable, Pid, ProcessControlBlock, ROOT_PID};

use crate::io::DiskController;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum KernelError {
    #[error("there is no disk {0}")]
    NoSuchDisk(usize),
    #[error("no process is using the CPU")]
    CpuIdle,
}

/// The kernel orchestrator: owns the process table, the ready queue, the
/// CPU slot, the frame table and the disk controllers, and implements every
/// cross-cutting operation on them.
///
/// The CPU slot is an explicit `Option`; `None` means idle. The root record
/// (pid 1) anchors the process tree but never runs, so a pid appears in at
/// most one of the CPU slot, the ready queue, a disk slot or a disk queue.
pub struct Scheduler {
    cpu: Option<Pid>,
    ready_queue: VecDeque<Pid>,
    processes: HashMap<Pid, ProcessControlBlock>,
    frames: FrameTable,
    disks: Vec<DiskController>,
    next_pid: Pid,
    clock: u64,
    page_size: u64,
}

impl Scheduler {
    pub fn new(ram: u64, page_size: u64, disk_count: usize) -> Scheduler {
        assert!(page_size > 0, "page size must be nonzero");

        let frame_capacity = (ram / page_size) as usize;
        info!(
            "kernel initialized: {} frames of {} bytes, {} disks",
            frame_capacity, page_size, disk_count
        );

        let mut processes = HashMap::new();
        processes.insert(ROOT_PID, ProcessControlBlock::new(ROOT_PID, ROOT_PID));

        Scheduler {
            cpu: None,
            ready_queue: VecDeque::new(),
            processes,
            frames: FrameTable::new(frame_capacity),
            disks: (0..disk_count).map(|_| DiskController::new()).collect(),
            next_pid: ROOT_PID + 1,
            clock: 0,
            page_size,
        }
    }

    // Creates a process parented to the root and admits it for scheduling.
    pub fn create_process(&mut self) -> Pid {
        let pid = self.allocate_pid();
        self.processes.insert(pid, ProcessControlBlock::new(pid, ROOT_PID));
        self.process_mut(ROOT_PID).add_child(pid);
        self.admit(pid);

        pid
    }

    // Creates a child of the process currently using the CPU.
    pub fn fork(&mut self) -> Result<Pid, KernelError> {
        let parent = self.cpu.ok_or(KernelError::CpuIdle)?;

        let pid = self.allocate_pid();
        self.processes.insert(pid, ProcessControlBlock::new(pid, parent));
        self.process_mut(parent).add_child(pid);
        self.admit(pid);

        Ok(pid)
    }

    // Round-robin quantum expiry: the running process goes to the back of
    // the ready queue and the queue head takes the CPU.
    pub fn schedule_tick(&mut self) -> Result<(), KernelError> {
        let pid = self.cpu.take().ok_or(KernelError::CpuIdle)?;

        self.ready_queue.push_back(pid);
        self.cpu = self.ready_queue.pop_front();

        Ok(())
    }

    // The running process waits for a child to terminate. With no children
    // this is a no-op; with a zombie child the zombie is reaped and the
    // caller keeps the CPU; otherwise the caller leaves the CPU until one
    // of its children exits.
    pub fn wait(&mut self) -> Result<(), KernelError> {
        let pid = self.cpu.ok_or(KernelError::CpuIdle)?;

        if !self.process(pid).has_children() {
            return Ok(());
        }

        if let Some(zombie) = self.find_zombie_child(pid) {
            debug!("process {} reaping zombie child {}", pid, zombie);
            self.tear_down(zombie, false);
            self.process_mut(pid).remove_child(zombie);
        } else {
            self.process_mut(pid).set_waiting(true);
            self.cpu = self.ready_queue.pop_front();
        }

        Ok(())
    }

    // The running process terminates. Its whole subtree is torn down; the
    // process itself is erased if its parent is waiting or is the root, and
    // lingers as a zombie otherwise.
    pub fn exit(&mut self) -> Result<(), KernelError> {
        let pid = self.cpu.ok_or(KernelError::CpuIdle)?;
        let parent = self.process(pid).get_parent();

        if self.process(parent).is_waiting() {
            self.tear_down(pid, false);
            self.process_mut(parent).remove_child(pid);
            self.process_mut(parent).set_waiting(false);
            // The dying process still occupies the CPU, so the parent joins
            // the queue tail before the slot is refilled from the head.
            self.ready_queue.push_back(parent);
        } else if parent == ROOT_PID {
            self.tear_down(pid, false);
            self.process_mut(parent).remove_child(pid);
        } else {
            self.process_mut(pid).set_zombie(true);
            self.tear_down(pid, true);
        }

        self.cpu = self.ready_queue.pop_front();

        Ok(())
    }

    // The running process blocks on the given disk and the CPU is refilled
    // from the ready queue.
    pub fn request_disk(&mut self, disk_index: usize, file_name: String) -> Result<(), KernelError> {
        if disk_index >= self.disks.len() {
            return Err(KernelError::NoSuchDisk(disk_index));
        }
        let pid = self.cpu.ok_or(KernelError::CpuIdle)?;

        self.disks[disk_index].request(file_name, pid);
        self.cpu = self.ready_queue.pop_front();

        Ok(())
    }

    // The given disk finishes its current operation; the outgoing process,
    // if any, is admitted for scheduling again.
    pub fn release_disk(&mut self, disk_index: usize) -> Result<(), KernelError> {
        if disk_index >= self.disks.len() {
            return Err(KernelError::NoSuchDisk(disk_index));
        }

        if let Some(pid) = self.disks[disk_index].release_current() {
            self.admit(pid);
        }

        Ok(())
    }

    // Pages in the given logical address for the running process: refresh
    // on a hit, append while the table has room, otherwise evict the least
    // recently used frame. The clock advances once per request either way.
    pub fn request_memory_operation(&mut self, address: u64) -> Result<(), KernelError> {
        let pid = self.cpu.ok_or(KernelError::CpuIdle)?;
        let page = address / self.page_size;

        if !self.frames.touch(page, pid, self.clock) {
            if self.frames.has_capacity() {
                self.frames.append(page, pid, self.clock);
            } else if self.frames.get_capacity() > 0 {
                debug!("evicting a frame for page {} of process {}", page, pid);
                self.frames.evict_and_insert(page, pid, self.clock);
            } else {
                warn!("memory operation dropped: frame table has zero capacity");
            }
        }
        self.clock += 1;

        Ok(())
    }

    pub fn get_cpu(&self) -> Option<Pid> {
        self.cpu
    }

    pub fn get_ready_queue(&self) -> impl Iterator<Item = Pid> + '_ {
        self.ready_queue.iter().copied()
    }

    pub fn get_frame_slots(&self) -> &[Option<Frame>] {
        self.frames.get_slots()
    }

    pub fn get_disks(&self) -> &[DiskController] {
        &self.disks
    }

    // Pids are handed out once, in increasing order, starting right after
    // the root.
    fn allocate_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;

        pid
    }

    // The shared enqueue rule: an idle CPU takes the process directly,
    // otherwise it joins the back of the ready queue.
    fn admit(&mut self, pid: Pid) {
        if self.cpu.is_none() {
            self.cpu = Some(pid);
        } else {
            self.ready_queue.push_back(pid);
        }
    }

    fn find_zombie_child(&self, pid: Pid) -> Option<Pid> {
        self.process(pid)
            .get_children()
            .iter()
            .copied()
            .find(|&child| self.process(child).is_zombie())
    }

    // Post-order teardown of a subtree. Every descendant is untangled from
    // the disks, the frame table and the ready queue, then erased from the
    // process table; the subtree root is erased too unless it is being kept
    // as a zombie.
    fn tear_down(&mut self, pid: Pid, keep_as_zombie: bool) {
        let children = self.process_mut(pid).take_children();
        for child in children {
            self.tear_down(child, false);
        }

        self.purge_from_resources(pid);

        if !keep_as_zombie {
            self.processes.remove(&pid);
        }
    }

    fn purge_from_resources(&mut self, pid: Pid) {
        for disk in self.disks.iter_mut() {
            disk.purge(pid);
        }
        self.frames.purge_pid(pid);
        self.ready_queue.retain(|&queued| queued != pid);
    }

    fn process(&self, pid: Pid) -> &ProcessControlBlock {
        match self.processes.get(&pid) {
            Some(pcb) => pcb,
            None => panic!("no process found for pid: {}", pid),
        }
    }

    fn process_mut(&mut self, pid: Pid) -> &mut ProcessControlBlock {
        match self.processes.get_mut(&pid) {
            Some(pcb) => pcb,
            None => panic!("no process found for pid: {}", pid),
        }
    }
}
