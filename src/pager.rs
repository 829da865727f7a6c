//! Accumulating loader for paginated list endpoints.

use serde::de::DeserializeOwned;

use crate::{
    client::Client,
    types::{PaginatedResponse, Paginator},
    Error,
};

const DEFAULT_PAGE_SIZE: i64 = 20;

fn initial_paginator(page_size: i64) -> Paginator {
    Paginator {
        current_page: 1,
        page_size,
        total_page: 0,
        total_record: 0,
    }
}

/// Loads a list endpoint page by page, appending records until the server's
/// page count is exhausted.
///
/// `current_page` advances by exactly 1 per successful fetch while it is
/// within `total_page`; once it passes `total_page`, further loads issue no
/// request.
pub struct PageLoader<T> {
    path: String,
    params: Vec<(String, String)>,
    paginator: Paginator,
    items: Vec<T>,
    started: bool,
}

impl<T: DeserializeOwned> PageLoader<T> {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            paginator: initial_paginator(DEFAULT_PAGE_SIZE),
            items: Vec::new(),
            started: false,
        }
    }

    /// Overrides the page size requested from the server.
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.paginator.page_size = page_size;
        self
    }

    /// Adds an extra query parameter sent with every page fetch.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Fetches the next page. With `init` the loader resets and the fetched
    /// page replaces the accumulated list; otherwise the page appends.
    ///
    /// Returns `Ok(false)` without issuing a request once every page has been
    /// fetched.
    pub async fn load(&mut self, client: &Client, init: bool) -> Result<bool, Error> {
        if init {
            self.paginator = initial_paginator(self.paginator.page_size);
            self.started = false;
        } else if self.started && self.paginator.current_page > self.paginator.total_page {
            return Ok(false);
        }

        let mut query: Vec<(&str, String)> = vec![
            ("current_page", self.paginator.current_page.to_string()),
            ("page_size", self.paginator.page_size.to_string()),
        ];
        query.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.clone())));

        let resp: PaginatedResponse<T> = client.get(&self.path, &query).await?;
        self.paginator = resp.data.paginator;
        if self.paginator.current_page <= self.paginator.total_page {
            self.paginator.current_page += 1;
        }
        if init {
            self.items = resp.data.list;
        } else {
            self.items.extend(resp.data.list);
        }
        self.started = true;
        Ok(true)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }
}
