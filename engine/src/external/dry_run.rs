//! Request sink that records requests instead of sending them

use async_trait::async_trait;

use super::{MarketplaceRequest, RequestSink};
use crate::error::{AppError, AppResult};

/// Records every request it receives.
///
/// `fail_at` makes the n-th request (0-based) fail, which lets callers
/// exercise the abort path of a run.
#[derive(Debug, Default, Clone)]
pub struct DryRunRequests {
    sent: Vec<MarketplaceRequest>,
    attempts: usize,
    fail_at: Option<usize>,
}

impl DryRunRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the request with the given 0-based index
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Requests accepted so far, in send order
    pub fn sent(&self) -> &[MarketplaceRequest] {
        &self.sent
    }

    pub fn into_sent(self) -> Vec<MarketplaceRequest> {
        self.sent
    }
}

#[async_trait]
impl RequestSink for DryRunRequests {
    async fn send(&mut self, request: &MarketplaceRequest) -> AppResult<()> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(AppError::RequestFailure(format!(
                "{} {} rejected (dry run)",
                request.kind().as_str(),
                request.path()
            )));
        }
        tracing::info!(kind = request.kind().as_str(), path = %request.path(), "dry run: request recorded");
        self.sent.push(request.clone());
        Ok(())
    }
}
