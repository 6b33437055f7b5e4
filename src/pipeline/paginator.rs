use futures::future::BoxFuture;

use crate::{
    error::CallError,
    observe::{Event, ObserverHandle},
    types::{Cursor, Page},
};

type FetchNext<'a, T> = Box<dyn FnMut(Cursor) -> BoxFuture<'a, Result<Page<T>, CallError>> + Send + 'a>;

/// Lazy, single-pass walk over a cursor-paginated listing.
///
/// Items of the current page are handed out before the next page is requested.
/// A page without an items field, a repeated cursor or a failed continuation
/// ends the walk quietly; whatever was yielded so far stands. Dropping the
/// paginator early issues no further requests.
pub struct Paginator<'a, T> {
    buffered: std::vec::IntoIter<T>,
    cursor: Option<Cursor>,
    fetch_next: FetchNext<'a, T>,
    observer: ObserverHandle,
    pages: usize,
}

impl<'a, T: Send + 'a> Paginator<'a, T> {
    pub fn new<F>(first: Page<T>, fetch_next: F, observer: ObserverHandle) -> Self
    where
        F: FnMut(Cursor) -> BoxFuture<'a, Result<Page<T>, CallError>> + Send + 'a,
    {
        let mut paginator = Self {
            buffered: Vec::new().into_iter(),
            cursor: None,
            fetch_next: Box::new(fetch_next),
            observer,
            pages: 0,
        };
        paginator.load(first, None);
        paginator
    }

    /// Number of pages received so far, including the first one.
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub async fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.buffered.next() {
                return Some(item);
            }

            let cursor = self.cursor.take()?;
            match (self.fetch_next)(cursor.clone()).await {
                Ok(page) => self.load(page, Some(cursor)),
                Err(e) => {
                    self.truncate(format!("fetching page {} failed: {}", self.pages + 1, e));
                    return None;
                }
            }
        }
    }

    pub async fn collect_all(mut self) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item);
        }
        items
    }

    fn load(&mut self, page: Page<T>, previous: Option<Cursor>) {
        self.pages += 1;

        let Some(items) = page.items else {
            self.truncate(format!("page {} carried no items", self.pages));
            return;
        };

        self.buffered = items.into_iter();
        self.cursor = match page.next {
            Some(next) if previous.as_ref() == Some(&next) => {
                self.truncate(format!("page {} repeated its own cursor", self.pages));
                None
            }
            next => next,
        };
    }

    fn truncate(&mut self, reason: String) {
        self.cursor = None;
        self.observer.emit(&Event::PageTruncated { reason });
    }
}
