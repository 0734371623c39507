use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use robustify_logging::{robustify_debug, robustify_info, robustify_warn};
use serde::Serialize;

use crate::settings::map_reqwest_error;
use crate::{
    is_record_candidate, parse_record, ClientSettings, EngineError, EngineEvent, FailureKind,
    LineBuffer, RunId, StreamSummary,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Robustifier: Send + Sync {
    /// Submits `uris` for the document `key` and emits one `EngineEvent::Record`
    /// per streamed result, in arrival order.
    async fn robustify(
        &self,
        run_id: RunId,
        key: &str,
        uris: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<StreamSummary, EngineError>;
}

#[derive(Serialize)]
struct RobustifyRequest<'a> {
    pdf_hash: &'a str,
    uris: &'a [String],
}

#[derive(Debug, Clone)]
pub struct ReqwestRobustifier {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestRobustifier {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }

    fn handle_line(
        &self,
        run_id: RunId,
        line: &str,
        sink: &dyn ProgressSink,
        summary: &mut StreamSummary,
    ) -> Result<(), EngineError> {
        if !is_record_candidate(line) {
            if !line.trim().is_empty() {
                robustify_warn!("Run {} skipped stream line: {:?}", run_id, line);
                summary.skipped_lines += 1;
            }
            return Ok(());
        }
        let record = parse_record(line)?;
        robustify_debug!("Run {} record for {}", run_id, record.uri());
        summary.records += 1;
        sink.emit(EngineEvent::Record { run_id, record });
        Ok(())
    }
}

#[async_trait::async_trait]
impl Robustifier for ReqwestRobustifier {
    async fn robustify(
        &self,
        run_id: RunId,
        key: &str,
        uris: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<StreamSummary, EngineError> {
        let url = self.settings.endpoint(&["robustify"])?;
        let body = serde_json::to_vec(&RobustifyRequest {
            pdf_hash: key,
            uris,
        })
        .map_err(|err| EngineError::new(FailureKind::MalformedRecord, err.to_string()))?;
        robustify_info!(
            "Run {} submitting {} URIs for {} to {}",
            run_id,
            uris.len(),
            key,
            url
        );

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/octet-stream, application/x-ndjson, */*")
            .body(body);
        if let Some(timeout) = self.settings.stream_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut lines = LineBuffer::new(self.settings.max_line_bytes);
        let mut summary = StreamSummary::default();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            for line in lines.push(&chunk)? {
                self.handle_line(run_id, &line, sink, &mut summary)?;
            }
        }
        if let Some(line) = lines.finish() {
            self.handle_line(run_id, &line, sink, &mut summary)?;
        }

        robustify_info!(
            "Run {} finished: {} records, {} skipped lines",
            run_id,
            summary.records,
            summary.skipped_lines
        );
        Ok(summary)
    }
}
