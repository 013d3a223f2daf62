use serde::Serialize;
use utoipa::ToSchema;

/// Page size used when the client sends none, zero or a negative value.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Normalized page request derived from the raw `page` / `pageSize` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Clamp raw query values.
    ///
    /// * `page < 1` (or absent) becomes 1
    /// * `page_size <= 0` (or absent) becomes [`DEFAULT_PAGE_SIZE`]
    /// * `page_size` above `max_page_size` is capped
    #[must_use]
    pub fn new(page: Option<i64>, page_size: Option<i64>, max_page_size: u64) -> Self {
        let page = page
            .and_then(|value| u64::try_from(value).ok())
            .filter(|value| *value >= 1)
            .unwrap_or(1);
        let page_size = page_size
            .and_then(|value| u64::try_from(value).ok())
            .filter(|value| *value >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size.max(1));

        Self { page, page_size }
    }

    /// Rows to skip, capped at `i64::MAX` since the drivers bind offsets as signed integers.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.page_size)
            .min(MAX_OFFSET)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Filters that carry pagination parameters.
pub trait Paginated {
    fn page(&self) -> Option<i64>;
    fn page_size(&self) -> Option<i64>;

    fn page_request(&self, max_page_size: u64) -> PageRequest {
        PageRequest::new(self.page(), self.page_size(), max_page_size)
    }
}

/// `{data, page, pageSize, totalItems}` list envelope.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            data,
            page: request.page,
            page_size: request.page_size,
            total_items,
        }
    }
}

/// `{data}` envelope for single records and master lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{message}` envelope returned by deletes.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub message: String,
}
