use crate::params::QueryParams;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 1-based page number and page size after defaults and bounds have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
	pub page: u32,
	pub page_size: u32,
}
impl Pagination {
	pub fn new(page: u32, page_size: u32) -> Self {
		Self { page: page.max(1), page_size: page_size.max(1) }
	}

	/// Reads `page` and `pageSize`. A size outside `1..=max_page_size` falls back to the default.
	pub fn from_params(params: &QueryParams, cfg: &jb_config::Search) -> Self {
		let page = params.number::<u32>("page").filter(|page| *page >= 1).unwrap_or(1);
		let page_size = params
			.number::<u32>("pageSize")
			.filter(|size| (1..=cfg.max_page_size).contains(size))
			.unwrap_or(cfg.default_page_size);

		Self::new(page, page_size)
	}

	pub fn range(self) -> PageRange {
		PageRange::new(self.page, self.page_size)
	}
}
impl Default for Pagination {
	fn default() -> Self {
		Self::new(1, DEFAULT_PAGE_SIZE)
	}
}

/// Zero-based inclusive row range of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
	pub start: u64,
	pub end: u64,
}
impl PageRange {
	pub fn new(page: u32, page_size: u32) -> Self {
		let size = u64::from(page_size.max(1));
		let start = u64::from(page.max(1) - 1) * size;

		Self { start, end: start + size - 1 }
	}

	pub fn offset(self) -> i64 {
		i64::try_from(self.start).unwrap_or(i64::MAX)
	}

	pub fn limit(self) -> i64 {
		i64::try_from(self.end - self.start + 1).unwrap_or(i64::MAX)
	}
}
