use std::collections::VecDeque;

use crate::kernel::Pid;

/// One pending or active disk operation: the requesting process and the
/// name of the file it wants to read or write.
pub struct IoRequest {
    pub pid: Pid,
    pub file_name: String,
}

/// Arbiter for a single hard disk: at most one active user, everyone else
/// waits in FIFO order.
pub struct DiskController {
    current: Option<IoRequest>,
    wait_queue: VecDeque<IoRequest>,
}

impl DiskController {
    pub fn new() -> DiskController {
        DiskController {
            current: None,
            wait_queue: VecDeque::new(),
        }
    }

    // An idle disk is taken immediately; otherwise the request joins the
    // back of the wait queue.
    pub fn request(&mut self, file_name: String, pid: Pid) {
        let request = IoRequest { pid, file_name };

        if self.current.is_none() {
            self.current = Some(request);
        } else {
            self.wait_queue.push_back(request);
        }
    }

    // The active user leaves the disk and the head of the wait queue, if
    // any, takes its place. Returns the outgoing pid, or None if the disk
    // was already idle.
    pub fn release_current(&mut self) -> Option<Pid> {
        let outgoing = self.current.take()?;
        self.current = self.wait_queue.pop_front();

        Some(outgoing.pid)
    }

    // Removes the given process wherever it appears on this disk. If it was
    // the active user, the hand-off is the same as release_current.
    pub fn purge(&mut self, pid: Pid) {
        if self.current.as_ref().map(|request| request.pid) == Some(pid) {
            self.release_current();
        }

        self.wait_queue.retain(|request| request.pid != pid);
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn get_current(&self) -> Option<&IoRequest> {
        self.current.as_ref()
    }

    pub fn get_wait_queue(&self) -> impl Iterator<Item = &IoRequest> {
        self.wait_queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued_pids(disk: &DiskController) -> Vec<Pid> {
        disk.get_wait_queue().map(|request| request.pid).collect()
    }

    #[test]
    fn test_disk_controller_request_idle_disk_becomes_occupant() {
        let mut disk = DiskController::new();

        disk.request("a.txt".to_string(), 2);

        assert!(!disk.is_idle());
        assert_eq!(disk.get_current().map(|r| r.pid), Some(2));
        assert_eq!(disk.get_current().map(|r| r.file_name.as_str()), Some("a.txt"));
        assert!(queued_pids(&disk).is_empty());
    }

    #[test]
    fn test_disk_controller_request_busy_disk_queues_fifo() {
        let mut disk = DiskController::new();

        disk.request("a.txt".to_string(), 2);
        disk.request("b.txt".to_string(), 3);
        disk.request("c.txt".to_string(), 4);

        assert_eq!(disk.get_current().map(|r| r.pid), Some(2));
        assert_eq!(queued_pids(&disk), vec![3, 4]);
    }

    #[test]
    fn test_disk_controller_release_hands_off_in_fifo_order() {
        let mut disk = DiskController::new();

        disk.request("x".to_string(), 9);
        disk.request("a".to_string(), 2);
        disk.request("b".to_string(), 3);
        disk.request("c".to_string(), 4);

        assert_eq!(disk.release_current(), Some(9));
        assert_eq!(disk.get_current().map(|r| r.pid), Some(2));
        assert_eq!(disk.release_current(), Some(2));
        assert_eq!(disk.release_current(), Some(3));
        assert_eq!(disk.release_current(), Some(4));
        assert!(disk.is_idle());
    }

    #[test]
    fn test_disk_controller_release_idle_disk_returns_none() {
        let mut disk = DiskController::new();

        assert_eq!(disk.release_current(), None);
        assert!(disk.is_idle());
    }

    #[test]
    fn test_disk_controller_purge_active_user_triggers_hand_off() {
        let mut disk = DiskController::new();

        disk.request("a".to_string(), 2);
        disk.request("b".to_string(), 3);

        disk.purge(2);

        assert_eq!(disk.get_current().map(|r| r.pid), Some(3));
        assert!(queued_pids(&disk).is_empty());
    }

    #[test]
    fn test_disk_controller_purge_queued_process() {
        let mut disk = DiskController::new();

        disk.request("a".to_string(), 2);
        disk.request("b".to_string(), 3);
        disk.request("c".to_string(), 4);

        disk.purge(3);

        assert_eq!(disk.get_current().map(|r| r.pid), Some(2));
        assert_eq!(queued_pids(&disk), vec![4]);
    }

    #[test]
    fn test_disk_controller_purge_unknown_pid_changes_nothing() {
        let mut disk = DiskController::new();

        disk.request("a".to_string(), 2);
        disk.purge(7);

        assert_eq!(disk.get_current().map(|r| r.pid), Some(2));
    }
}
