//! Advisory messages for the host to show, e.g. as a toast.

/// One advisory. Ids increase monotonically so the host can dismiss
/// exactly the notice it showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
}

/// Holds at most one notice; a newer one replaces the older.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_id: u64,
    duration_ms: u64,
}

impl NoticeBoard {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            current: None,
            next_id: 1,
            duration_ms,
        }
    }

    /// Post a notice, replacing any pending one. Returns its id.
    pub fn post(&mut self, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let text = text.into();
        log::info!("Notice #{id}: {text}");
        self.current = Some(Notice { id, text });
        id
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Dismiss the notice with `id`. A stale id (already replaced) is ignored.
    pub fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// How long the host should keep a notice visible.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}
