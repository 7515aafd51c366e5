//! # Query Session
//!
//! One user's query state plus what the result area shows, and the single
//! in-flight request slot.
//!
//! ## Ordering
//!
//! Issuing a request snapshots the encoded state and occupies the slot.
//! Issuing another while the first is outstanding simply replaces the slot;
//! nothing is cancelled. Every response is applied when it lands, so
//! whichever lands last owns the display. A response whose ticket no longer
//! matches the slot is still applied and logged as stale.

use std::sync::Arc;

use uuid::Uuid;

use crate::catalog::FieldCatalog;
use crate::config::ClientConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::query::{encode, QueryState, Sample};
use crate::response::{self, DisplayState, FetchMode, Notice};
use crate::transport::{Download, HttpTransport, QueryTransport};

use super::errors::{SessionError, SessionResult};
use super::flight::{FetchResponse, PendingFetch, Ticket};

pub struct Session {
    id: Uuid,
    config: ClientConfig,
    catalog: FieldCatalog,
    state: QueryState,
    display: DisplayState,
    transport: Arc<dyn QueryTransport>,
    in_flight: Option<Ticket>,
    next_ticket: Ticket,
}

impl Session {
    pub fn new(config: ClientConfig, transport: Arc<dyn QueryTransport>) -> Self {
        let catalog = config.field_catalog();
        let state = QueryState::from_config(&config, &catalog);
        let id = Uuid::new_v4();

        let id_text = id.to_string();
        log_event_with_fields(
            Event::SessionStart,
            &[("session", id_text.as_str()), ("entity", state.entity())],
        );

        Self {
            id,
            config,
            catalog,
            state,
            display: DisplayState::Idle,
            transport,
            in_flight: None,
            next_ticket: 1,
        }
    }

    /// Session talking HTTP to the configured endpoints
    pub fn connect(config: ClientConfig) -> SessionResult<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Direct access for edits that need no catalog or logging
    pub fn state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Ticket of the most recently issued request still awaiting its response
    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    // ------------------------------------------------------------------
    // Catalog-aware edits
    // ------------------------------------------------------------------

    pub fn set_entity(&mut self, entity: impl Into<String>) {
        let entity = entity.into();
        let known = self.catalog.has_entity(&entity);
        self.state.set_entity(entity, &self.catalog);

        log_event_with_fields(
            Event::EntityChanged,
            &[
                ("entity", self.state.entity()),
                ("known", if known { "true" } else { "false" }),
            ],
        );
    }

    /// Append a sort row on the entity's first field
    pub fn append_sort(&mut self) -> usize {
        self.state.append_sort(&self.catalog)
    }

    pub fn apply_sample(&mut self, sample: Sample) -> SessionResult<()> {
        sample.apply(&mut self.state)?;

        let number = sample.number().to_string();
        log_event_with_fields(
            Event::SampleApplied,
            &[("sample", number.as_str()), ("entity", self.state.entity())],
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------

    /// Issue a browse request for the current state
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.state.set_export_mode(false);
        self.issue()
    }

    /// Issue an export request
    ///
    /// Resets to the first page and uses `size`, or the configured export
    /// page size when none is given.
    pub fn begin_export(&mut self, size: Option<u32>) -> SessionResult<PendingFetch> {
        let size = size.unwrap_or(self.config.export_page_size);
        self.state.set_size(size)?;
        self.state.set_page(0);
        self.state.set_export_mode(true);
        Ok(self.issue())
    }

    fn issue(&mut self) -> PendingFetch {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.display = DisplayState::Loading;

        let payload = encode(&self.state);
        let mode = FetchMode::from_export_flag(payload.export);

        let ticket_text = ticket.to_string();
        let page = payload.page.to_string();
        let size = payload.size.to_string();
        log_event_with_fields(
            Event::FetchBegin,
            &[
                ("ticket", ticket_text.as_str()),
                ("mode", mode.as_str()),
                ("entity", payload.entity.as_str()),
                ("page", page.as_str()),
                ("size", size.as_str()),
            ],
        );

        PendingFetch {
            ticket,
            mode,
            payload,
            transport: Arc::clone(&self.transport),
        }
    }

    /// Apply a landed response. Never refuses on staleness.
    pub fn complete(&mut self, response: FetchResponse) -> Option<Notice> {
        let ticket_text = response.ticket.to_string();
        if self.in_flight == Some(response.ticket) {
            self.in_flight = None;
        } else {
            let current = self
                .in_flight
                .map(|t| t.to_string())
                .unwrap_or_else(|| "none".to_string());
            log_event_with_fields(
                Event::StaleResponseApplied,
                &[
                    ("ticket", ticket_text.as_str()),
                    ("in_flight", current.as_str()),
                ],
            );
        }

        let failure_code = response.result.as_ref().err().map(|e| e.code());
        let consumed = response::consume(&mut self.state, response.mode, response.result);

        match (&consumed.display, &consumed.notice) {
            (DisplayState::Error(msg), _) => {
                let code = failure_code.unwrap_or("DYNQ_TRANSPORT_MALFORMED");
                log_event_with_fields(
                    Event::FetchFailed,
                    &[
                        ("ticket", ticket_text.as_str()),
                        ("code", code),
                        ("error", msg.as_str()),
                    ],
                );
            }
            (_, Some(Notice::ExportReady(handle))) => {
                log_event_with_fields(
                    Event::ExportReady,
                    &[("ticket", ticket_text.as_str()), ("file", handle.as_str())],
                );
            }
            (_, Some(Notice::ExportDiagnostic(raw))) => {
                log_event_with_fields(
                    Event::ExportDiagnostic,
                    &[("ticket", ticket_text.as_str()), ("body", raw.as_str())],
                );
            }
            (display, _) => {
                let rows = match display {
                    DisplayState::Table(table) => table.rows.len(),
                    _ => 0,
                };
                let rows = rows.to_string();
                log_event_with_fields(
                    Event::FetchComplete,
                    &[("ticket", ticket_text.as_str()), ("rows", rows.as_str())],
                );
            }
        }

        self.display = consumed.display;
        consumed.notice
    }

    /// Browse round trip
    pub async fn fetch(&mut self) -> Option<Notice> {
        let pending = self.begin_fetch();
        let response = pending.send().await;
        self.complete(response)
    }

    /// Export round trip
    pub async fn export(&mut self, size: Option<u32>) -> SessionResult<Option<Notice>> {
        let pending = self.begin_export(size)?;
        let response = pending.send().await;
        Ok(self.complete(response))
    }

    /// Retrieve the file behind the last recorded export handle
    pub async fn download(&self) -> SessionResult<Download> {
        let handle = self
            .state
            .last_export_handle()
            .ok_or(SessionError::NoExport)?;

        match self.transport.download(handle).await {
            Ok(download) => {
                let bytes = download.bytes.len().to_string();
                log_event_with_fields(
                    Event::DownloadComplete,
                    &[
                        ("file", download.file_name.as_str()),
                        ("bytes", bytes.as_str()),
                    ],
                );
                Ok(download)
            }
            Err(err) => {
                let msg = err.to_string();
                log_event_with_fields(
                    Event::DownloadFailed,
                    &[("file", handle.as_str()), ("error", msg.as_str())],
                );
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("display", &self.display)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RequestPayload;
    use crate::response::ExportHandle;
    use crate::transport::{TransportError, TransportResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Answers browse requests with one row whose `id` is the requested
    /// page, and export requests from a script.
    struct ScriptedTransport {
        exports: Mutex<Vec<TransportResult<Value>>>,
        fail_browse: bool,
        seen: Mutex<Vec<RequestPayload>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                exports: Mutex::new(Vec::new()),
                fail_browse: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn with_exports(mut self, exports: Vec<TransportResult<Value>>) -> Self {
            self.exports = Mutex::new(exports);
            self
        }

        fn failing_browse(mut self) -> Self {
            self.fail_browse = true;
            self
        }
    }

    #[async_trait]
    impl QueryTransport for ScriptedTransport {
        async fn execute(&self, payload: &RequestPayload) -> TransportResult<Value> {
            self.seen.lock().unwrap().push(payload.clone());
            if payload.export {
                return self.exports.lock().unwrap().remove(0);
            }
            if self.fail_browse {
                return Err(TransportError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(json!({
                "content": [{"id": payload.page, "name": "row"}],
                "page": payload.page,
                "totalPages": 5,
                "totalElements": 50
            }))
        }

        async fn download(&self, handle: &ExportHandle) -> TransportResult<Download> {
            Ok(Download {
                file_name: handle.file_name().to_string(),
                bytes: b"id,name\n".to_vec(),
                content_type: Some("text/csv".into()),
            })
        }
    }

    fn session_with(transport: ScriptedTransport) -> (Session, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let session = Session::new(ClientConfig::default(), transport.clone());
        (session, transport)
    }

    fn first_cell(display: &DisplayState) -> String {
        match display {
            DisplayState::Table(table) => table.rows[0][0].clone(),
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let (session, _) = session_with(ScriptedTransport::new());
        assert_eq!(session.state().entity(), "Employee");
        assert_eq!(session.state().fields(), ["id", "name", "salary"]);
        assert_eq!(session.state().size(), 10);
        assert_eq!(session.display(), &DisplayState::Idle);
        assert!(session.in_flight().is_none());
    }

    #[tokio::test]
    async fn test_fetch_renders_table() {
        let (mut session, transport) = session_with(ScriptedTransport::new());
        session.state_mut().set_page(2);

        let notice = session.fetch().await;

        assert!(notice.is_none());
        assert_eq!(first_cell(session.display()), "2");
        assert!(session.in_flight().is_none());
        assert!(!transport.seen.lock().unwrap()[0].export);
    }

    #[tokio::test]
    async fn test_last_response_to_land_wins() {
        let (mut session, _) = session_with(ScriptedTransport::new());

        session.state_mut().set_page(0);
        let first = session.begin_fetch();
        session.state_mut().set_page(1);
        let second = session.begin_fetch();
        assert_eq!(session.in_flight(), Some(second.ticket()));
        assert_eq!(first.payload().page, 0);

        let second = second.send().await;
        let first = first.send().await;

        session.complete(second);
        assert_eq!(first_cell(session.display()), "1");
        assert!(session.in_flight().is_none());

        // The older request lands last and still takes the display
        session.complete(first);
        assert_eq!(first_cell(session.display()), "0");
        assert_eq!(session.state().page(), 1);
    }

    #[tokio::test]
    async fn test_issue_sets_loading() {
        let (mut session, _) = session_with(ScriptedTransport::new());
        let pending = session.begin_fetch();
        assert_eq!(session.display(), &DisplayState::Loading);
        assert_eq!(pending.mode(), FetchMode::Browse);
        assert!(!pending.payload().export);
    }

    #[test]
    fn test_mode_follows_export_flag() {
        let (mut session, _) = session_with(ScriptedTransport::new());

        let export = session.begin_export(None).unwrap();
        assert_eq!(export.mode(), FetchMode::Export);
        assert!(export.payload().export);

        let browse = session.begin_fetch();
        assert_eq!(browse.mode(), FetchMode::Browse);
        assert!(!session.state().export_mode());
    }

    #[tokio::test]
    async fn test_export_then_failed_browse_keeps_handle() {
        let transport = ScriptedTransport::new()
            .with_exports(vec![Ok(json!({"file": "exports/out.csv"}))])
            .failing_browse();
        let (mut session, _) = session_with(transport);

        let notice = session.export(None).await.unwrap();
        assert_eq!(
            notice,
            Some(Notice::ExportReady(ExportHandle::new("exports/out.csv")))
        );
        assert_eq!(session.display(), &DisplayState::ExportFinished);

        let notice = session.fetch().await;
        assert!(matches!(notice, Some(Notice::Alert(_))));
        assert!(session.display().is_error());
        assert_eq!(
            session.state().last_export_handle(),
            Some(&ExportHandle::new("exports/out.csv"))
        );
    }

    #[tokio::test]
    async fn test_export_resets_paging() {
        let transport =
            ScriptedTransport::new().with_exports(vec![Ok(json!({"file": "a.xlsx"}))]);
        let (mut session, transport) = session_with(transport);
        session.state_mut().set_page(4);

        session.export(None).await.unwrap();

        let sent = transport.seen.lock().unwrap()[0].clone();
        assert!(sent.export);
        assert_eq!(sent.page, 0);
        assert_eq!(sent.size, 1000);
        assert!(session.state().export_mode());
    }

    #[tokio::test]
    async fn test_export_with_explicit_size() {
        let transport =
            ScriptedTransport::new().with_exports(vec![Ok(json!({"file": "a.xlsx"}))]);
        let (mut session, transport) = session_with(transport);

        session.export(Some(25)).await.unwrap();
        assert_eq!(transport.seen.lock().unwrap()[0].size, 25);

        assert!(matches!(
            session.begin_export(Some(0)),
            Err(SessionError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_export_diagnostic() {
        let transport = ScriptedTransport::new()
            .with_exports(vec![Ok(json!({"message": "Export failed"}))]);
        let (mut session, _) = session_with(transport);

        let notice = session.export(None).await.unwrap();

        assert_eq!(
            notice,
            Some(Notice::ExportDiagnostic(
                r#"{"message":"Export failed"}"#.to_string()
            ))
        );
        assert!(session.state().last_export_handle().is_none());
    }

    #[tokio::test]
    async fn test_download_without_export() {
        let (session, _) = session_with(ScriptedTransport::new());
        let err = session.download().await.unwrap_err();
        assert!(matches!(err, SessionError::NoExport));
        assert_eq!(err.to_string(), "No export");
    }

    #[tokio::test]
    async fn test_download_after_export() {
        let transport =
            ScriptedTransport::new().with_exports(vec![Ok(json!({"file": "exports/out.csv"}))]);
        let (mut session, _) = session_with(transport);
        session.export(None).await.unwrap();

        let download = session.download().await.unwrap();
        assert_eq!(download.file_name, "out.csv");
        assert_eq!(download.bytes, b"id,name\n");
    }

    #[test]
    fn test_set_entity_clears_sorts() {
        let (mut session, _) = session_with(ScriptedTransport::new());
        session.append_sort();
        session.state_mut().filters_mut().set_like("name", "J");

        session.set_entity("Department");

        assert!(session.state().sorts().is_empty());
        assert_eq!(session.state().fields(), ["id", "name"]);
        assert_eq!(session.state().filters().len(), 1);
    }

    #[test]
    fn test_apply_sample() {
        let (mut session, _) = session_with(ScriptedTransport::new());
        session.apply_sample(Sample::DistinctDepartments).unwrap();
        assert!(session.state().distinct());
        assert_eq!(session.state().size(), 20);
    }
}
