//! Message listing parameters

/// Direction in which a conversation's history is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageOrder {
    /// Oldest first (conversation detail view)
    #[default]
    Ascending,
    /// Newest first (paged history)
    Descending,
}

/// Page of messages to read from one conversation
///
/// `limit`/`offset` are applied after ordering, so page 1 of a descending
/// query holds the most recent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    pub order: MessageOrder,
    pub limit: i64,
    pub offset: i64,
}

impl MessageQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Build a query from a 1-based page number, clamping the page size to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn page(order: MessageOrder, page: u32, page_size: u32) -> Self {
        let size = page_size.clamp(1, Self::MAX_PAGE_SIZE);
        let page = page.max(1);
        Self {
            order,
            limit: i64::from(size),
            offset: i64::from(page - 1) * i64::from(size),
        }
    }

    pub fn ascending(page: u32, page_size: u32) -> Self {
        Self::page(MessageOrder::Ascending, page, page_size)
    }

    pub fn newest_first(page: u32, page_size: u32) -> Self {
        Self::page(MessageOrder::Descending, page, page_size)
    }
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self::ascending(1, Self::DEFAULT_PAGE_SIZE)
    }
}
