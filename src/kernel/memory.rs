use super::Pid;

/// Residency metadata for one page of physical memory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub page: u64,
    pub pid: Pid,
    pub timestamp: u64,
}

/// Fixed-capacity table of frame slots. Slots are appended until the table
/// is full and are never compacted; purging a process empties its slots in
/// place, and an empty slot counts as timestamp 0 when a victim is chosen.
pub(crate) struct FrameTable {
    slots: Vec<Option<Frame>>,
    capacity: usize,
}

impl FrameTable {
    pub fn new(capacity: usize) -> FrameTable {
        FrameTable {
            slots: Vec::new(),
            capacity,
        }
    }

    // Refreshes the timestamp of the frame holding (page, pid), if one
    // exists. Recency is tracked per (page, owning process) pair, so two
    // processes can hold the same page number in different frames.
    pub fn touch(&mut self, page: u64, pid: Pid, clock: u64) -> bool {
        for slot in self.slots.iter_mut() {
            if let Some(frame) = slot {
                if frame.page == page && frame.pid == pid {
                    frame.timestamp = clock;
                    return true;
                }
            }
        }

        false
    }

    pub fn has_capacity(&self) -> bool {
        self.slots.len() < self.capacity
    }

    pub fn append(&mut self, page: u64, pid: Pid, clock: u64) {
        self.slots.push(Some(Frame {
            page,
            pid,
            timestamp: clock,
        }));
    }

    // Overwrites the slot with the minimum timestamp. Ties go to the last
    // minimum in scan order, matching the observed reference behavior; the
    // tie only matters immediately after the table fills.
    pub fn evict_and_insert(&mut self, page: u64, pid: Pid, clock: u64) {
        let mut oldest = clock;
        let mut victim = None;

        for (index, slot) in self.slots.iter().enumerate() {
            let timestamp = slot.map_or(0, |frame| frame.timestamp);
            if timestamp <= oldest {
                oldest = timestamp;
                victim = Some(index);
            }
        }

        if let Some(index) = victim {
            self.slots[index] = Some(Frame {
                page,
                pid,
                timestamp: clock,
            });
        }
    }

    // Empties every slot belonging to the given process. Slots stay in the
    // table and are reclaimed through eviction, not compaction.
    pub fn purge_pid(&mut self, pid: Pid) {
        for slot in self.slots.iter_mut() {
            if slot.map(|frame| frame.pid) == Some(pid) {
                *slot = None;
            }
        }
    }

    pub fn get_slots(&self) -> &[Option<Frame>] {
        &self.slots
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }
}
