//! Chat service: one user submission to one streamed assistant turn.
//!
//! ChatService owns the exchange lifecycle. It appends the user turn and an
//! empty assistant placeholder to the transcript, sends the history through
//! the `ChatTransport`, merges every decoded fragment into the placeholder,
//! and closes the placeholder with the outcome of the stream.

use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use profchat_types::chat::{OpenTurn, Turn, TurnOutcome};
use profchat_types::error::ChatError;

use crate::transcript::TranscriptStore;

use super::fragments::fragments;
use super::transport::ChatTransport;

/// What happened to a submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Blank input; nothing was appended and nothing was sent.
    Ignored,
    /// The reply stream ended normally and the turn was closed.
    Completed {
        turn: OpenTurn,
        fragments: usize,
        chars: usize,
    },
    /// The caller cancelled; the turn keeps whatever arrived before.
    Cancelled {
        turn: OpenTurn,
        fragments: usize,
        chars: usize,
    },
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    fragments: usize,
    chars: usize,
}

enum StreamEnd {
    Drained,
    Cancelled,
}

/// Closes an exchange's turn as cancelled if the exchange future is dropped
/// before it closes the turn itself.
struct OpenTurnGuard {
    store: TranscriptStore,
    turn: OpenTurn,
}

impl Drop for OpenTurnGuard {
    fn drop(&mut self) {
        if let Some(index) = self.store.finish_turn(&self.turn, TurnOutcome::Cancelled) {
            debug!(index, "Exchange dropped with its turn still open; closed as cancelled");
        }
    }
}

/// Drives chat exchanges against a transcript.
///
/// Generic over `ChatTransport` so the core crate never depends on an HTTP
/// client.
pub struct ChatService<T: ChatTransport> {
    transport: T,
    store: TranscriptStore,
    idle_timeout: Option<Duration>,
}

impl<T: ChatTransport> ChatService<T> {
    /// Create a service writing into `store`, with no idle timeout.
    pub fn new(transport: T, store: TranscriptStore) -> Self {
        Self {
            transport,
            store,
            idle_timeout: None,
        }
    }

    /// Fail an exchange when the response headers or any later chunk take
    /// longer than `idle_timeout` to arrive.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit `user_text` against the store's current history.
    pub async fn submit(
        &self,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        let history = self.store.history();
        self.send_message(history, user_text, cancel).await
    }

    /// Run one exchange.
    ///
    /// The request body is `pending_history` followed by the new user turn;
    /// the empty assistant placeholder is never sent.
    ///
    /// Blank input returns [`ExchangeOutcome::Ignored`] without touching the
    /// transcript. Cancelling `cancel` stops reading the reply, drops the
    /// response stream, and closes the turn as cancelled. Dropping the
    /// returned future before it resolves closes the turn as cancelled too.
    ///
    /// # Errors
    ///
    /// - [`ChatError::ConcurrentExchange`] if another exchange has a turn open.
    /// - [`ChatError::Transport`] if the request fails, the body stream
    ///   fails, or the idle timeout elapses while waiting for headers or a
    ///   chunk. The turn is closed as failed and
    ///   keeps whatever content arrived.
    pub async fn send_message(
        &self,
        pending_history: Vec<Turn>,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        if user_text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return Ok(ExchangeOutcome::Ignored);
        }

        let turn = self.store.append_user_turn(user_text)?;
        let _guard = OpenTurnGuard {
            store: self.store.clone(),
            turn,
        };

        let span = info_span!(
            "chat.exchange",
            chat.transport = self.transport.name(),
            chat.exchange_id = %turn.exchange,
            chat.turn_index = turn.index,
            chat.history_len = pending_history.len(),
        );

        let mut request = pending_history;
        request.push(Turn::user(user_text));

        self.run_exchange(turn, request, cancel)
            .instrument(span)
            .await
    }

    async fn run_exchange(
        &self,
        turn: OpenTurn,
        request: Vec<Turn>,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        let mut tally = Tally::default();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(StreamEnd::Cancelled),
            drained = self.stream_into(&turn, request, &mut tally) => drained.map(|()| StreamEnd::Drained),
        };

        match result {
            Ok(StreamEnd::Drained) => {
                self.store.finish_turn(&turn, TurnOutcome::Completed);
                info!(
                    fragments = tally.fragments,
                    chars = tally.chars,
                    "Exchange completed"
                );
                Ok(ExchangeOutcome::Completed {
                    turn,
                    fragments: tally.fragments,
                    chars: tally.chars,
                })
            }
            Ok(StreamEnd::Cancelled) => {
                self.store.finish_turn(&turn, TurnOutcome::Cancelled);
                info!(
                    fragments = tally.fragments,
                    chars = tally.chars,
                    "Exchange cancelled"
                );
                Ok(ExchangeOutcome::Cancelled {
                    turn,
                    fragments: tally.fragments,
                    chars: tally.chars,
                })
            }
            Err(err) => {
                self.store.finish_turn(
                    &turn,
                    TurnOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
                warn!(
                    error = %err,
                    fragments = tally.fragments,
                    "Exchange failed"
                );
                Err(err)
            }
        }
    }

    async fn stream_into(
        &self,
        turn: &OpenTurn,
        request: Vec<Turn>,
        tally: &mut Tally,
    ) -> Result<(), ChatError> {
        let body = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.open(request))
                .await
                .map_err(|_| {
                    ChatError::transport(format!(
                        "no response headers within {:.1}s",
                        limit.as_secs_f64()
                    ))
                })??,
            None => self.transport.open(request).await?,
        };
        let mut fragments = fragments(body, self.idle_timeout);

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            self.store.extend_turn(turn, &fragment)?;
            tally.fragments += 1;
            tally.chars += fragment.chars().count();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use futures_util::stream;
    use tokio::sync::broadcast;

    use profchat_types::chat::{DEFAULT_GREETING, Role};
    use profchat_types::event::TranscriptEvent;

    use super::*;
    use crate::chat::transport::ByteStream;

    /// Transport that replays scripted responses and records every request.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ByteStream, ChatError>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<ByteStream, ChatError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<Vec<Turn>> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatTransport for ScriptedTransport {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn open(&self, turns: Vec<Turn>) -> Result<ByteStream, ChatError> {
            self.requests.lock().unwrap().push(turns);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::transport("no scripted response")))
        }
    }

    fn chunks(parts: &[&[u8]]) -> ByteStream {
        let items: Vec<Result<Vec<u8>, ChatError>> =
            parts.iter().map(|p| Ok(p.to_vec())).collect();
        Box::pin(stream::iter(items))
    }

    /// Yields `parts` and then never ends.
    fn stalled(parts: &[&[u8]]) -> ByteStream {
        let items: Vec<Result<Vec<u8>, ChatError>> =
            parts.iter().map(|p| Ok(p.to_vec())).collect();
        Box::pin(stream::iter(items).chain(stream::pending()))
    }

    /// Transport whose response headers never arrive.
    struct SilentTransport;

    impl ChatTransport for SilentTransport {
        fn name(&self) -> &str {
            "silent"
        }

        async fn open(&self, _turns: Vec<Turn>) -> Result<ByteStream, ChatError> {
            std::future::pending().await
        }
    }

    fn service(responses: Vec<Result<ByteStream, ChatError>>) -> ChatService<ScriptedTransport> {
        ChatService::new(
            ScriptedTransport::new(responses),
            TranscriptStore::new(DEFAULT_GREETING),
        )
    }

    fn drain(rx: &mut broadcast::Receiver<TranscriptEvent>) -> Vec<TranscriptEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn streamed_reply_is_merged_into_one_turn() {
        let svc = service(vec![Ok(chunks(&[b"He", b"llo ", b"there"]))]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();

        let outcome = svc.submit("hi", &cancel).await.unwrap();

        let snap = svc.store().snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.turns[0], Turn::assistant(DEFAULT_GREETING));
        assert_eq!(snap.turns[1], Turn::user("hi"));
        assert_eq!(snap.turns[2], Turn::assistant("Hello there"));
        assert!(snap.open.is_none());

        match outcome {
            ExchangeOutcome::Completed {
                turn,
                fragments,
                chars,
            } => {
                assert_eq!(turn.index, 2);
                assert_eq!(fragments, 3);
                assert_eq!(chars, 11);
            }
            other => panic!("expected Completed, got {other:?}"),
        }

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                TranscriptEvent::TurnAppended {
                    index: 1,
                    role: Role::User
                },
                TranscriptEvent::TurnAppended {
                    index: 2,
                    role: Role::Assistant
                },
                TranscriptEvent::TurnExtended {
                    index: 2,
                    delta: "He".into()
                },
                TranscriptEvent::TurnExtended {
                    index: 2,
                    delta: "llo ".into()
                },
                TranscriptEvent::TurnExtended {
                    index: 2,
                    delta: "there".into()
                },
                TranscriptEvent::TurnClosed {
                    index: 2,
                    outcome: TurnOutcome::Completed
                },
            ]
        );
    }

    #[tokio::test]
    async fn request_carries_history_and_new_user_turn_only() {
        let svc = service(vec![Ok(chunks(&[b"ok"]))]);
        let cancel = CancellationToken::new();

        svc.submit("Who teaches calculus?", &cancel).await.unwrap();

        let requests = svc.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            vec![
                Turn::assistant(DEFAULT_GREETING),
                Turn::user("Who teaches calculus?"),
            ]
        );
    }

    #[tokio::test]
    async fn second_exchange_sends_completed_first_exchange() {
        let svc = service(vec![Ok(chunks(&[b"first"])), Ok(chunks(&[b"second"]))]);
        let cancel = CancellationToken::new();

        svc.submit("one", &cancel).await.unwrap();
        svc.submit("two", &cancel).await.unwrap();

        let requests = svc.transport().requests();
        assert_eq!(requests[1].len(), 4);
        assert_eq!(requests[1][2], Turn::assistant("first"));
        assert_eq!(requests[1][3], Turn::user("two"));
        assert_eq!(svc.store().len(), 5);
    }

    #[tokio::test]
    async fn explicit_pending_history_is_sent_verbatim() {
        let svc = service(vec![Ok(chunks(&[b"ok"]))]);
        let cancel = CancellationToken::new();
        let history = vec![Turn::assistant("custom seed")];

        svc.send_message(history, "hello", &cancel).await.unwrap();

        assert_eq!(
            svc.transport().requests()[0],
            vec![Turn::assistant("custom seed"), Turn::user("hello")]
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let svc = service(vec![Ok(chunks(&[b"unused"]))]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();

        for blank in ["", "   ", "\n\t"] {
            let outcome = svc.submit(blank, &cancel).await.unwrap();
            assert_eq!(outcome, ExchangeOutcome::Ignored);
        }

        assert_eq!(svc.store().len(), 1);
        assert!(svc.transport().requests().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_content() {
        let body: ByteStream = Box::pin(stream::iter(vec![
            Ok(b"He".to_vec()),
            Err(ChatError::transport("connection reset")),
        ]));
        let svc = service(vec![Ok(body)]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();

        let err = svc.submit("hi", &cancel).await.unwrap_err();
        assert_eq!(err, ChatError::transport("connection reset"));

        let snap = svc.store().snapshot();
        assert_eq!(snap.turns[2], Turn::assistant("He"));
        assert!(snap.open.is_none());

        let events = drain(&mut rx);
        match events.last() {
            Some(TranscriptEvent::TurnClosed {
                index: 2,
                outcome: TurnOutcome::Failed { reason },
            }) => assert!(reason.contains("connection reset")),
            other => panic!("expected failed close, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_request_closes_empty_placeholder() {
        let svc = service(vec![Err(ChatError::transport("HTTP 500: boom"))]);
        let cancel = CancellationToken::new();

        let err = svc.submit("hi", &cancel).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport { .. }));

        let snap = svc.store().snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.turns[2], Turn::assistant(""));
        assert!(!svc.store().is_open());
    }

    #[tokio::test]
    async fn store_accepts_next_exchange_after_failure() {
        let svc = service(vec![
            Err(ChatError::transport("HTTP 503")),
            Ok(chunks(&[b"back"])),
        ]);
        let cancel = CancellationToken::new();

        assert!(svc.submit("one", &cancel).await.is_err());
        let outcome = svc.submit("two", &cancel).await.unwrap();
        assert!(matches!(outcome, ExchangeOutcome::Completed { .. }));
        assert_eq!(svc.store().snapshot().turns[4], Turn::assistant("back"));
    }

    #[tokio::test]
    async fn empty_body_completes_with_empty_turn() {
        let svc = service(vec![Ok(chunks(&[]))]);
        let cancel = CancellationToken::new();

        let outcome = svc.submit("hi", &cancel).await.unwrap();
        assert!(matches!(
            outcome,
            ExchangeOutcome::Completed {
                fragments: 0,
                chars: 0,
                ..
            }
        ));
        assert_eq!(svc.store().snapshot().turns[2], Turn::assistant(""));
    }

    #[tokio::test]
    async fn split_multibyte_character_is_reassembled() {
        let bytes = "Müller ☕".as_bytes();
        let svc = service(vec![Ok(chunks(&[&bytes[..2], &bytes[2..9], &bytes[9..]]))]);
        let cancel = CancellationToken::new();

        svc.submit("hi", &cancel).await.unwrap();

        assert_eq!(svc.store().snapshot().turns[2], Turn::assistant("Müller ☕"));
    }

    #[tokio::test]
    async fn submit_while_turn_open_is_rejected() {
        let svc = service(vec![Ok(chunks(&[b"unused"]))]);
        svc.store().append_user_turn("first").unwrap();
        let before = svc.store().len();
        let cancel = CancellationToken::new();

        let err = svc.submit("second", &cancel).await.unwrap_err();

        assert_eq!(err, ChatError::ConcurrentExchange);
        assert_eq!(svc.store().len(), before);
        assert!(svc.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn cancel_closes_turn_with_partial_content() {
        let svc = service(vec![Ok(stalled(&[b"He"]))]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        let watcher = tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if matches!(event, TranscriptEvent::TurnExtended { .. }) {
                    canceller.cancel();
                    break;
                }
            }
        });

        let outcome = svc.submit("hi", &cancel).await.unwrap();
        watcher.await.unwrap();

        assert!(matches!(
            outcome,
            ExchangeOutcome::Cancelled { fragments: 1, .. }
        ));
        let snap = svc.store().snapshot();
        assert_eq!(snap.turns[2], Turn::assistant("He"));
        assert!(snap.open.is_none());
    }

    #[tokio::test]
    async fn already_cancelled_token_still_appends_and_closes() {
        let svc = service(vec![Ok(stalled(&[]))]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = svc.submit("hi", &cancel).await.unwrap();

        assert!(matches!(outcome, ExchangeOutcome::Cancelled { .. }));
        let events = drain(&mut rx);
        assert_eq!(
            events.last(),
            Some(&TranscriptEvent::TurnClosed {
                index: 2,
                outcome: TurnOutcome::Cancelled
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_stream_fails_after_idle_timeout() {
        let svc = service(vec![Ok(stalled(&[b"He"]))])
            .with_idle_timeout(Some(Duration::from_secs(30)));
        let cancel = CancellationToken::new();

        let err = svc.submit("hi", &cancel).await.unwrap_err();

        match err {
            ChatError::Transport { message } => assert!(message.contains("no data received")),
            other => panic!("expected Transport, got {other:?}"),
        }
        let snap = svc.store().snapshot();
        assert_eq!(snap.turns[2], Turn::assistant("He"));
        assert!(snap.open.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_response_headers_fail_after_idle_timeout() {
        let svc = ChatService::new(SilentTransport, TranscriptStore::new(DEFAULT_GREETING))
            .with_idle_timeout(Some(Duration::from_secs(30)));
        let cancel = CancellationToken::new();

        let result =
            tokio::time::timeout(Duration::from_secs(3600), svc.submit("hi", &cancel)).await;

        match result {
            Ok(Err(ChatError::Transport { message })) => {
                assert!(message.contains("no response headers"), "{message}")
            }
            other => panic!("expected Transport error, got {other:?}"),
        }
        let snap = svc.store().snapshot();
        assert_eq!(snap.turns[2], Turn::assistant(""));
        assert!(snap.open.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_exchange_closes_turn_as_cancelled() {
        let svc = service(vec![Ok(stalled(&[b"He"])), Ok(chunks(&[b"again"]))]);
        let mut rx = svc.store().subscribe();
        let cancel = CancellationToken::new();

        let abandoned =
            tokio::time::timeout(Duration::from_secs(1), svc.submit("hi", &cancel)).await;
        assert!(abandoned.is_err());

        let snap = svc.store().snapshot();
        assert_eq!(snap.turns[2], Turn::assistant("He"));
        assert!(snap.open.is_none());
        assert_eq!(
            drain(&mut rx).last(),
            Some(&TranscriptEvent::TurnClosed {
                index: 2,
                outcome: TurnOutcome::Cancelled
            })
        );

        let outcome = svc.submit("retry", &cancel).await.unwrap();
        assert!(matches!(outcome, ExchangeOutcome::Completed { .. }));
        assert_eq!(svc.store().snapshot().turns[4], Turn::assistant("again"));
    }
}
