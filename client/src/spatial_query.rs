use std::collections::HashMap;

use log::warn;

use xrlink_shared::{
    Operation, QueryFilter, RequestCorrelator, RequestId, ResultCode, SpaceQueryInfo,
    SpaceQueryResult, SpatialEntityRuntime, SpatialError, TwoCallEnumerator, Uuid,
};

use crate::client::SpatialClient;

/// Every result of a query, in delivery order. An empty list is a
/// successful query that matched nothing.
pub type QueryOutcome = Result<Vec<SpaceQueryResult>, SpatialError>;

/// In-flight queries.
///
/// A query completes in two kinds of events: any number of "results
/// available" pages, each fetched with the two-call idiom and appended to the
/// query's accumulator, then one "complete" that hands the accumulator to the
/// waiting continuation. Both maps always hold the same set of request ids.
pub struct SpatialQueryEngine<R> {
    requests: RequestCorrelator<SpatialClient<R>, QueryOutcome>,
    accumulators: HashMap<RequestId, Vec<SpaceQueryResult>>,
    enumerator: TwoCallEnumerator,
}

impl<R> SpatialQueryEngine<R> {
    pub fn new() -> Self {
        Self {
            requests: RequestCorrelator::new("space query"),
            accumulators: HashMap::new(),
            enumerator: TwoCallEnumerator::new("space query results"),
        }
    }

    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    /// Results received so far for an in-flight query
    pub fn accumulated(&self, request_id: RequestId) -> Option<&[SpaceQueryResult]> {
        self.accumulators.get(&request_id).map(Vec::as_slice)
    }

    pub(crate) fn clear(&mut self) -> usize {
        self.accumulators.clear();
        self.requests.clear()
    }
}

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    /// Queries spaces matching `filter`, with limits taken from the client's
    /// [`QueryConfig`](crate::QueryConfig)
    pub fn query<F>(&mut self, filter: QueryFilter, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, QueryOutcome) + 'static,
    {
        let max_results = match &filter {
            QueryFilter::ByUuid { uuids, .. } => {
                u32::try_from(uuids.len()).unwrap_or(u32::MAX)
            }
            QueryFilter::All | QueryFilter::ByComponent { .. } => self.config.query.max_results,
        };
        let info = SpaceQueryInfo::new(filter, max_results, self.config.query.timeout);
        self.query_with_info(info, on_complete)
    }

    /// Looks up a single persisted space
    pub fn query_by_uuid<F>(&mut self, uuid: Uuid, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, QueryOutcome) + 'static,
    {
        let filter = QueryFilter::ByUuid {
            uuids: vec![uuid],
            location: self.config.storage_location,
        };
        self.query(filter, on_complete)
    }

    /// Returns false if the runtime refused the query, in which case
    /// `on_complete` has already run with the failure.
    pub fn query_with_info<F>(&mut self, info: SpaceQueryInfo, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, QueryOutcome) + 'static,
    {
        match self.runtime.query_spaces(&info) {
            Ok(request_id) => {
                self.queries
                    .requests
                    .register(request_id, Box::new(on_complete));
                self.queries.accumulators.insert(request_id, Vec::new());
                true
            }
            Err(code) => {
                warn!("Failed to query spaces: {}", code);
                on_complete(
                    self,
                    Err(SpatialError::IssueFailed {
                        operation: Operation::QuerySpaces,
                        code,
                    }),
                );
                false
            }
        }
    }

    pub(crate) fn on_query_results_available(&mut self, request_id: RequestId) -> bool {
        let Some(accumulator) = self.queries.accumulators.get_mut(&request_id) else {
            warn!(
                "Received unexpected query results for request {}",
                request_id
            );
            return false;
        };

        let runtime = &mut self.runtime;
        let page = self
            .queries
            .enumerator
            .enumerate_with(|capacity| runtime.retrieve_space_query_results(request_id, capacity));
        match page {
            Ok(mut results) => accumulator.append(&mut results),
            Err(error) => warn!(
                "Dropping a page of results for query {}: {}",
                request_id, error
            ),
        }
        true
    }

    pub(crate) fn on_query_complete(&mut self, request_id: RequestId, result: ResultCode) -> bool {
        let results = self.queries.accumulators.remove(&request_id);
        let Some(on_complete) = self.queries.requests.take(request_id) else {
            return false;
        };
        let outcome = if result.is_success() {
            Ok(results.unwrap_or_default())
        } else {
            Err(SpatialError::RuntimeFailed {
                operation: Operation::QuerySpaces,
                code: result,
            })
        };
        on_complete(self, outcome);
        true
    }
}
