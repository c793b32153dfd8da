//! # 分页参数

use serde::Serialize;

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// 从 1 开始
    pub page: u64,
    pub page_size: u64,
}

impl PaginationParams {
    /// 默认每页条数
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    /// 每页条数上限
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// 页码至少为 1，每页条数限制在 `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 标准分页信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[must_use]
pub const fn build_page(total: u64, params: PaginationParams) -> PaginationInfo {
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.page_size)
    };
    PaginationInfo {
        page: params.page,
        page_size: params.page_size,
        total,
        total_pages,
    }
}
