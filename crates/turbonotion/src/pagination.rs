//! Cursor pagination
//!
//! List and query endpoints answer with a [`Page`]: a slice of results plus
//! an opaque `next_cursor`. Every function here takes a *fetch* closure that
//! performs one call for a given cursor (`None` for the first page) and
//! threads the returned cursor into the next call. The cursor is forwarded
//! verbatim and never inspected.
//!
//! Three traversals share that contract:
//!
//! - [`collect_paginated`] fetches every page eagerly and returns all items
//! - [`Paginator`] yields one item at a time and fetches a page only when the
//!   previous one is drained; dropping it early stops further fetches
//! - [`collect_paginated_with_meta`] is the eager traversal plus page and
//!   item counts
//!
//! Items come out in server order, page by page. Nothing is reordered or
//! deduplicated.
//!
//! # Examples
//!
//! ```rust
//! use turbonotion::pagination::{Page, collect_paginated};
//!
//! # async fn example() -> turbonotion::Result<()> {
//! let items = collect_paginated(|cursor: Option<String>| async move {
//!     Ok(match cursor.as_deref() {
//!         None => Page::new(vec![1, 2], Some("cursor-1".into())),
//!         _ => Page::new(vec![3], None),
//!     })
//! })
//! .await?;
//!
//! assert_eq!(items, vec![1, 2, 3]);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::observability::log_page_fetched;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;

/// One page of a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order
    pub results: Vec<T>,
    /// Cursor for the next page; `None` on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether the server reports more pages
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page whose `has_more` agrees with `next_cursor`.
    pub fn new(results: Vec<T>, next_cursor: Option<String>) -> Self {
        let has_more = next_cursor.is_some();
        Self {
            results,
            next_cursor,
            has_more,
        }
    }

    /// Split into results and the cursor to continue with.
    ///
    /// Traversal is driven by `next_cursor` alone. A page claiming
    /// `has_more` without a cursor ends the traversal, with a warning.
    fn into_parts(self) -> (Vec<T>, Option<String>) {
        if self.has_more != self.next_cursor.is_some() {
            tracing::warn!(
                has_more = self.has_more,
                has_cursor = self.next_cursor.is_some(),
                "Page has_more disagrees with next_cursor; following next_cursor"
            );
        }
        (self.results, self.next_cursor)
    }
}

/// Items from an eager traversal, with traversal counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedCollection<T> {
    /// Every item, in server order
    pub items: Vec<T>,
    /// Number of fetch calls made
    pub page_count: usize,
    /// Number of items collected
    pub total_count: usize,
}

/// Fetch every page and return all items.
///
/// There is no upper bound on the number of pages: an unbounded list is
/// accumulated in full. Use [`Paginator`] to stop early.
///
/// # Errors
///
/// The first failed fetch ends the traversal and its error is returned.
pub async fn collect_paginated<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    collect_paginated_with_meta(fetch)
        .await
        .map(|collection| collection.items)
}

/// Fetch every page, returning items with page and item counts.
///
/// # Errors
///
/// The first failed fetch ends the traversal and its error is returned.
pub async fn collect_paginated_with_meta<T, F, Fut>(mut fetch: F) -> Result<PaginatedCollection<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page_count = 0;
    let mut cursor = None;

    loop {
        let (results, next_cursor) = fetch(cursor).await?.into_parts();
        page_count += 1;
        items.extend(results);
        log_page_fetched(page_count, items.len(), next_cursor.is_some());

        match next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let total_count = items.len();
    Ok(PaginatedCollection {
        items,
        page_count,
        total_count,
    })
}

/// Lazy, single-pass, forward-only traversal.
///
/// Buffers one page at a time. A fetch happens only when the buffer is empty
/// and the previous page supplied a cursor, so there is no read-ahead: a
/// consumer that stops after the first few items causes exactly one fetch.
/// After an error or the last page, [`next`](Self::next) returns `None`.
///
/// # Examples
///
/// ```rust
/// use turbonotion::pagination::{Page, Paginator};
///
/// # async fn example() -> turbonotion::Result<()> {
/// let mut pages = Paginator::new(|cursor: Option<String>| async move {
///     Ok(match cursor.as_deref() {
///         None => Page::new(vec!["a", "b"], Some("cursor-1".into())),
///         _ => Page::new(vec!["c"], None),
///     })
/// });
///
/// while let Some(item) = pages.next().await {
///     if item? == "b" {
///         break;
///     }
/// }
/// assert_eq!(pages.pages_fetched(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Paginator<T, F> {
    fetch: F,
    buffer: VecDeque<T>,
    cursor: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    /// Create a paginator; nothing is fetched until the first `next`.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Next item, fetching the next page if the current one is drained.
    pub async fn next(&mut self) -> Option<Result<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }

            match (self.fetch)(self.cursor.take()).await {
                Ok(page) => {
                    let (results, next_cursor) = page.into_parts();
                    self.pages_fetched += 1;
                    self.exhausted = next_cursor.is_none();
                    self.cursor = next_cursor;
                    self.buffer.extend(results);
                    log_page_fetched(self.pages_fetched, self.buffer.len(), !self.exhausted);
                }
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
    }

    /// `false` once the last page has been fetched and fully yielded.
    ///
    /// Does no I/O. Before the first fetch, and between pages, it reports
    /// `true` even if the next page turns out to be empty.
    pub fn has_next(&self) -> bool {
        !self.buffer.is_empty() || !self.exhausted
    }

    /// Number of fetch calls made so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Adapt into a [`Stream`] with the same no-read-ahead behavior.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        futures::stream::unfold(self, |mut paginator| async move {
            paginator.next().await.map(|item| (item, paginator))
        })
    }
}
