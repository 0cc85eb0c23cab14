//! In-process request/response channel between the transport and the
//! verification pipeline.
//!
//! The transport holds a [`BridgeClient`]; a single [`BridgeServer`] task
//! owns the handler and answers requests one at a time. Every request gets
//! exactly one [`BridgeResponse`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use verity_search::SearchBackend;

use super::contract::{BridgeCommand, BridgeResponse};
use crate::error::{Result, VerityError};
use crate::pipeline::{VerificationPipeline, VerificationReport};

/// Something that can verify a quote.
#[async_trait]
pub trait VerificationHandler: Send + Sync + 'static {
    async fn verify(&self, quote: &str) -> Result<VerificationReport>;
}

#[async_trait]
impl<S: SearchBackend + 'static> VerificationHandler for VerificationPipeline<S> {
    async fn verify(&self, quote: &str) -> Result<VerificationReport> {
        VerificationPipeline::verify(self, quote).await
    }
}

struct PendingRequest {
    command: BridgeCommand,
    response_tx: oneshot::Sender<BridgeResponse>,
}

#[derive(Clone)]
pub struct BridgeClient {
    request_tx: mpsc::Sender<PendingRequest>,
}

impl BridgeClient {
    /// Submit a command and wait for its response.
    ///
    /// # Errors
    ///
    /// [`VerityError::Bridge`] when the server has stopped.
    pub async fn send(&self, command: BridgeCommand) -> Result<BridgeResponse> {
        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(PendingRequest {
                command,
                response_tx,
            })
            .await
            .map_err(|e| VerityError::Bridge(format!("failed to send bridge request: {e}")))?;

        response_rx
            .await
            .map_err(|e| VerityError::Bridge(format!("bridge response dropped: {e}")))
    }
}

pub struct BridgeServer<H: VerificationHandler> {
    request_rx: mpsc::Receiver<PendingRequest>,
    handler: H,
    deadline: Duration,
}

/// Create a connected client/server pair.
///
/// `deadline` bounds each verification; expiry yields a
/// "Request timed out" error response.
#[must_use]
pub fn bridge_channel<H: VerificationHandler>(
    request_capacity: usize,
    deadline: Duration,
    handler: H,
) -> (BridgeClient, BridgeServer<H>) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));
    (
        BridgeClient { request_tx },
        BridgeServer {
            request_rx,
            handler,
            deadline,
        },
    )
}

impl<H: VerificationHandler> BridgeServer<H> {
    /// Serve until every client is dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.handle(request.command).await;
            if request.response_tx.send(response).is_err() {
                tracing::debug!("bridge client went away before the response was ready");
            }
        }
        tracing::debug!("bridge request channel closed");
    }

    /// Answer one command.
    pub async fn handle(&self, command: BridgeCommand) -> BridgeResponse {
        match command {
            BridgeCommand::DetectMisinformation { quote } => {
                match tokio::time::timeout(self.deadline, self.handler.verify(&quote)).await {
                    Ok(Ok(report)) => {
                        tracing::info!(
                            verdict = %report.verdict.verdict,
                            sources = report.verdict.supporting_sources.len(),
                            "verification succeeded"
                        );
                        BridgeResponse::from_report(&report)
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "verification failed");
                        BridgeResponse::from_error(&err)
                    }
                    Err(_) => {
                        let err = VerityError::Timeout(format!(
                            "verification exceeded {}s",
                            self.deadline.as_secs()
                        ));
                        tracing::warn!(error = %err, "verification timed out");
                        BridgeResponse::from_error(&err)
                    }
                }
            }
        }
    }
}
