//! Paginated fetching with endpoint fallback
//!
//! The fetcher walks a resource's candidate endpoints in order and accepts
//! the first one that answers 2xx with a non-empty record list. Candidate
//! errors are not retried; the next shape is simply tried. Once a candidate
//! is accepted, pagination continues on it alone and any later error
//! propagates to the caller as a unit-level failure.

use crate::endpoints::{EndpointResolver, RequestDescriptor};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RateLimiter};
use crate::types::{FetchParams, JsonValue, Resource};
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Default records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Page numbering starts at 1
const FIRST_PAGE: u32 = 1;

/// Hard ceiling on records per fetch, guarding against a source that
/// ignores paging and repeats itself forever
const MAX_RECORDS: usize = 1_000_000;

/// Fetches complete record sets from the source API
pub struct Fetcher {
    client: HttpClient,
    limiter: RateLimiter,
    resolver: EndpointResolver,
    page_size: u32,
}

impl Fetcher {
    /// Fetcher with the default page size
    pub fn new(client: HttpClient, limiter: RateLimiter, resolver: EndpointResolver) -> Self {
        Self {
            client,
            limiter,
            resolver,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size (minimum 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch every record the source has for `resource` under `params`.
    ///
    /// Returns `Ok(vec![])` when no candidate produces data; that is "no
    /// data", not an error.
    pub async fn fetch_all(
        &self,
        resource: Resource,
        params: &FetchParams,
    ) -> Result<Vec<JsonValue>> {
        let page_size = self.page_size as usize;

        for descriptor in self.resolver.candidates_for(resource, params) {
            let mut records = match self.fetch_page(resource, &descriptor, FIRST_PAGE).await {
                Ok(records) => records,
                Err(e) => {
                    debug!(
                        "Candidate {} for {} failed, trying next: {}",
                        descriptor.label, resource, e
                    );
                    continue;
                }
            };

            if records.is_empty() {
                debug!(
                    "Candidate {} for {} returned no records, trying next",
                    descriptor.label, resource
                );
                continue;
            }

            // Candidate accepted. From here on errors propagate.
            let mut last_count = records.len();
            let mut page = FIRST_PAGE;
            while last_count >= page_size {
                if records.len() >= MAX_RECORDS {
                    warn!(
                        "Reached {} record limit fetching {} from candidate {}",
                        MAX_RECORDS, resource, descriptor.label
                    );
                    break;
                }
                page += 1;
                let next = self.fetch_page(resource, &descriptor, page).await?;
                last_count = next.len();
                records.extend(next);
            }

            debug!(
                "Fetched {} {} records from candidate {} across {} page(s)",
                records.len(),
                resource,
                descriptor.label,
                page
            );
            return Ok(records);
        }

        debug!("No candidate for {} produced data", resource);
        Ok(Vec::new())
    }

    /// Single-page sweep over the candidates, for reachability checks.
    ///
    /// Returns the record count of the first candidate that answers at all;
    /// an empty page still counts as reachable.
    pub async fn probe(&self, resource: Resource) -> Result<usize> {
        for descriptor in self.resolver.candidates_for(resource, &FetchParams::none()) {
            match self.fetch_page(resource, &descriptor, FIRST_PAGE).await {
                Ok(records) => {
                    debug!(
                        "Probe hit candidate {} for {}: {} record(s)",
                        descriptor.label,
                        resource,
                        records.len()
                    );
                    return Ok(records.len());
                }
                Err(e) => debug!(
                    "Probe candidate {} for {} failed: {}",
                    descriptor.label, resource, e
                ),
            }
        }
        Err(Error::Other(format!(
            "No {resource} endpoint answered the probe"
        )))
    }

    async fn fetch_page(
        &self,
        resource: Resource,
        descriptor: &RequestDescriptor,
        page: u32,
    ) -> Result<Vec<JsonValue>> {
        self.limiter.wait().await;

        let mut query = descriptor.query.clone();
        query.push(("page".to_string(), page.to_string()));
        query.push(("rows".to_string(), self.page_size.to_string()));

        let body = self
            .client
            .get_value(descriptor.url.clone(), &descriptor.headers, &query)
            .await?;
        extract_records(resource, body)
    }
}

/// Pull the record array out of a response body.
///
/// Bare arrays are used directly; objects are probed for the resource's
/// wrapper fields. Anything else is a decode error for the candidate.
fn extract_records(resource: Resource, body: JsonValue) -> Result<Vec<JsonValue>> {
    match body {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Object(mut map) => {
            for field in resource.wrapper_fields() {
                if let Some(JsonValue::Array(items)) = map.remove(*field) {
                    return Ok(items);
                }
            }
            Err(Error::decode(format!(
                "Response object for {resource} has no known record field"
            )))
        }
        _ => Err(Error::decode(format!(
            "Expected an array or object body for {resource}"
        ))),
    }
}
