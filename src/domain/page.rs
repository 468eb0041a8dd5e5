use serde::{Deserialize, Serialize};

use super::LoadStatus;
use crate::error::{BrokerError, Result};

/// Listing filters. Shipper narrows first, then status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFilter {
    pub status: Option<LoadStatus>,
    pub shipper_id: Option<String>,
}

impl LoadFilter {
    pub fn by_status(status: LoadStatus) -> Self {
        Self {
            status: Some(status),
            shipper_id: None,
        }
    }

    pub fn by_shipper(shipper_id: impl Into<String>) -> Self {
        Self {
            status: None,
            shipper_id: Some(shipper_id.into()),
        }
    }
}

/// Validated page request. Construct through `PageRequest::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page and limit must be >= 1; limit is clamped to `max_limit`.
    pub fn new(page: u32, limit: u32, max_limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(BrokerError::invalid_input("page must be a positive integer"));
        }
        if limit == 0 {
            return Err(BrokerError::invalid_input("limit must be a positive integer"));
        }
        Ok(Self {
            page,
            limit: limit.min(max_limit.max(1)),
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(u64::from(request.limit())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
