use crate::{error::Error, record::UserRecord};

/// The paged-fetch contract the paginated stream iterates over.
///
/// `fetch_page` must be stateless across calls: each call prepares its own query and no
/// cursor is held between pages.
pub trait PagedSource {
    fn fetch_page(&self, offset: i64, limit: i64) -> std::result::Result<Vec<UserRecord>, Error>;
}

/// Lazily pages through `source`, starting at offset 0 and advancing by `page_size`
/// after each non-empty page.
///
/// The stream ends at the first empty page. A failing fetch yields `Err` once, distinct
/// from end-of-data, and then the stream ends.
///
/// Panics if `page_size` is not positive.
pub fn pages<S: PagedSource>(source: &S, page_size: i64) -> Pages<'_, S> {
    assert!(page_size > 0, "page_size must be positive");
    Pages {
        source,
        page_size,
        offset: 0,
        done: false,
    }
}

pub struct Pages<'a, S> {
    source: &'a S,
    page_size: i64,
    offset: i64,
    done: bool,
}

impl<S: PagedSource> Iterator for Pages<'_, S> {
    type Item = std::result::Result<Vec<UserRecord>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.fetch_page(self.offset, self.page_size) {
            Ok(page) if page.is_empty() => {
                self.done = true;
                None
            }
            Ok(page) => {
                self.offset += self.page_size;
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
