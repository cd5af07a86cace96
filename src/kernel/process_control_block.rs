pub type Pid = u32;

/// Pid of the root of the process tree. The root is never scheduled,
/// never touches a disk or a frame, and exists for the whole run.
pub const ROOT_PID: Pid = 1;

pub(crate) struct ProcessControlBlock {
    pid: Pid,
    parent: Pid,
    children: Vec<Pid>,
    waiting: bool,
    zombie: bool,
}

impl ProcessControlBlock {
    pub fn new(pid: Pid, parent: Pid) -> ProcessControlBlock {
        ProcessControlBlock {
            pid,
            parent,
            children: Vec::new(),
            waiting: false,
            zombie: false,
        }
    }

    pub fn get_pid(&self) -> Pid {
        self.pid
    }

    pub fn get_parent(&self) -> Pid {
        self.parent
    }

    // Children are kept in creation order; wait() reaps the first zombie
    // found in this order.
    pub fn get_children(&self) -> &[Pid] {
        &self.children
    }

    pub fn add_child(&mut self, pid: Pid) {
        self.children.push(pid);
    }

    pub fn remove_child(&mut self, pid: Pid) {
        self.children.retain(|&child| child != pid);
    }

    pub fn take_children(&mut self) -> Vec<Pid> {
        std::mem::take(&mut self.children)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting = waiting;
    }

    pub fn is_zombie(&self) -> bool {
        self.zombie
    }

    pub fn set_zombie(&mut self, zombie: bool) {
        self.zombie = zombie;
    }
}
