//! Page/state model of a single pagination session.

use super::error::PaginationError;
use super::token::ActionKind;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFirstRender,
    Active,
    /// Ended by the owner pressing stop.
    Terminated,
    /// Ended by the idle deadline or a lost message.
    Expired,
}

/// Position of a rendered page, handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub index: usize,
    pub total: usize,
}

impl PageContext {
    /// One-based label such as `2/3`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.index + 1, self.total)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }
}

/// Number of pages needed for `item_count` items.
pub fn total_pages(item_count: usize, per_page: usize) -> usize {
    item_count.div_ceil(per_page.max(1))
}

/// Start/end indices of `page` (0-based). The caller guarantees `page` is in range.
pub fn page_window(item_count: usize, per_page: usize, page: usize) -> (usize, usize) {
    let start = page.saturating_mul(per_page).min(item_count);
    let end = start.saturating_add(per_page).min(item_count);
    (start, end)
}

#[derive(Debug)]
pub struct PaginationSession<T> {
    items: Vec<T>,
    items_per_page: usize,
    current_page: usize,
    owner_id: u64,
    state: SessionState,
}

impl<T> PaginationSession<T> {
    pub fn new(items: Vec<T>, items_per_page: usize, owner_id: u64) -> Result<Self, PaginationError> {
        if items.is_empty() {
            return Err(PaginationError::EmptyItems);
        }
        if items_per_page == 0 {
            return Err(PaginationError::ZeroItemsPerPage);
        }

        Ok(Self {
            items,
            items_per_page,
            current_page: 0,
            owner_id,
            state: SessionState::AwaitingFirstRender,
        })
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.items.len(), self.items_per_page)
    }

    /// Once set, no further events are accepted.
    pub fn expired(&self) -> bool {
        matches!(self.state, SessionState::Expired | SessionState::Terminated)
    }

    pub fn context(&self, page: usize) -> PageContext {
        PageContext {
            index: page,
            total: self.total_pages(),
        }
    }

    /// Items visible on `page`.
    pub fn page_items(&self, page: usize) -> &[T] {
        let (start, end) = page_window(self.items.len(), self.items_per_page, page);
        &self.items[start..end]
    }

    /// Page a navigation action would lead to. Non-navigation actions stay put.
    pub fn target_page(&self, action: ActionKind) -> usize {
        match action {
            ActionKind::Prev => self.current_page.saturating_sub(1),
            ActionKind::Next => (self.current_page + 1).min(self.total_pages() - 1),
            ActionKind::Stop | ActionKind::Select => self.current_page,
        }
    }

    /// Commit a page after its render reached the user.
    pub(crate) fn set_page(&mut self, page: usize) {
        debug_assert!(page < self.total_pages());
        self.current_page = page;
    }

    pub(crate) fn activate(&mut self) {
        if self.state == SessionState::AwaitingFirstRender {
            self.state = SessionState::Active;
        }
    }

    /// Move into a terminal state. Returns `false` if the session had already ended.
    pub(crate) fn end(&mut self, state: SessionState) -> bool {
        debug_assert!(matches!(
            state,
            SessionState::Expired | SessionState::Terminated
        ));
        if self.expired() {
            return false;
        }
        self.state = state;
        true
    }
}
