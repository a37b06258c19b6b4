use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

/// Slices `items` into the requested page. Page numbers start at 1; a page
/// past the end is a 404 unless the list is empty.
pub fn paginate<T>(items: Vec<T>, params: &PageParams, default_size: u32) -> Result<Page<T>, AppError> {
    let size = params
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(default_size)
        .clamp(1, MAX_PAGE_SIZE) as usize;
    let page = params.page.unwrap_or(1);

    let count = items.len();
    let last_page = count.div_ceil(size).max(1) as u32;
    if page == 0 || page > last_page {
        return Err(AppError::NotFoundError("Invalid page.".into()));
    }

    let start = (page as usize - 1) * size;
    let results: Vec<T> = items.into_iter().skip(start).take(size).collect();

    Ok(Page {
        count,
        next: (page < last_page).then_some(page + 1),
        previous: (page > 1).then(|| page - 1),
        results,
    })
}
