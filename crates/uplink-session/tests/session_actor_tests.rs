// Integration tests for SessionActor: mock channel + recording collaborators.
#[cfg(test)]
mod tests {
    use actix::prelude::*;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use uplink_core::error::HostPageError;
    use uplink_core::framing::serialize_ipc_message;
    use uplink_session::collaborators::{EditSink, HostPage, StatusIndicator};
    use uplink_session::controller::{AttachChannel, PostMessage, SessionActor};
    use uplink_transport::channel::{ChannelNotice, InboundFrame, SendRaw};
    use uplink_transport::machine::SessionNotice;

    // --- Mock channel actor (captures outbound frames) ---

    #[derive(Default)]
    struct MockChannelState {
        sent: Vec<String>,
    }

    struct MockChannelActor {
        state: Arc<Mutex<MockChannelState>>,
    }

    impl Actor for MockChannelActor {
        type Context = Context<Self>;
    }

    impl Handler<SendRaw> for MockChannelActor {
        type Result = ();

        fn handle(&mut self, msg: SendRaw, _ctx: &mut Context<Self>) {
            self.state.lock().unwrap().sent.push(msg.0);
        }
    }

    // --- Recording collaborators ---

    #[derive(Default)]
    struct CollabState {
        applied: Vec<Value>,
        clears: u32,
        indicator_events: Vec<&'static str>,
        host_calls: Vec<String>,
    }

    #[derive(Clone)]
    struct Probe(Arc<Mutex<CollabState>>);

    struct RecordingRenderer(Probe);

    impl EditSink for RecordingRenderer {
        fn apply_edits(&mut self, edits: Value) {
            self.0.0.lock().unwrap().applied.push(edits);
        }

        fn clear(&mut self) {
            self.0.0.lock().unwrap().clears += 1;
        }
    }

    struct RecordingIndicator(Probe);

    impl StatusIndicator for RecordingIndicator {
        fn show_disconnected(&mut self) {
            self.0.0.lock().unwrap().indicator_events.push("show");
        }

        fn clear(&mut self) {
            self.0.0.lock().unwrap().indicator_events.push("clear");
        }
    }

    struct RecordingHostPage(Probe);

    impl HostPage for RecordingHostPage {
        fn call_function(&mut self, name: &str) -> Result<(), HostPageError> {
            if name == "missing" {
                return Err(HostPageError::MissingFunction(name.to_string()));
            }
            self.0.0.lock().unwrap().host_calls.push(format!("call:{name}"));
            Ok(())
        }

        fn set_attribute(
            &mut self,
            selector: &str,
            name: &str,
            value: &str,
        ) -> Result<(), HostPageError> {
            self.0
                .0
                .lock()
                .unwrap()
                .host_calls
                .push(format!("set:{selector}:{name}={value}"));
            Ok(())
        }

        fn container_exists(&self, _id: &str) -> bool {
            true
        }
    }

    // --- Helpers ---

    fn start_session(probe: &Probe) -> (Addr<SessionActor>, Arc<Mutex<MockChannelState>>) {
        let channel_state = Arc::new(Mutex::new(MockChannelState::default()));
        let channel = MockChannelActor {
            state: channel_state.clone(),
        }
        .start();

        let session = SessionActor::new(
            Box::new(RecordingRenderer(probe.clone())),
            Box::new(RecordingIndicator(probe.clone())),
            Box::new(RecordingHostPage(probe.clone())),
        )
        .start();
        session.do_send(AttachChannel(channel.recipient()));

        (session, channel_state)
    }

    async fn settle() {
        // Give the mock channel's mailbox a tick to drain
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    fn handshake_frame() -> String {
        json!({
            "edits": { "ops": ["CreateElement"] },
            "onDisconnect": [
                { "type": "CallJsFn", "data": "cleanup" },
                { "type": "SetAttribute",
                  "data": { "selector": "#status", "name": "class", "value": "offline" } }
            ]
        })
        .to_string()
    }

    // --- Tests ---

    #[actix_rt::test]
    async fn open_sends_initialize_handshake() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, channel_state) = start_session(&probe);

        session
            .send(ChannelNotice(SessionNotice::Opened { resumed: false }))
            .await
            .unwrap();
        settle().await;

        let sent = &channel_state.lock().unwrap().sent;
        assert_eq!(sent.as_slice(), [serialize_ipc_message("initialize")]);

        let state = probe.0.lock().unwrap();
        // The indicator is cleared on every open; a first open never clears
        // rendered content.
        assert_eq!(state.indicator_events, vec!["clear"]);
        assert_eq!(state.clears, 0);
    }

    #[actix_rt::test]
    async fn handshake_response_applies_edits_and_stores_actions() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session.send(InboundFrame(handshake_frame())).await.unwrap();

        {
            let state = probe.0.lock().unwrap();
            assert_eq!(state.applied, vec![json!({ "ops": ["CreateElement"] })]);
            assert!(state.host_calls.is_empty());
        }

        // The stored actions run, in order, when an episode starts
        session
            .send(ChannelNotice(SessionNotice::EpisodeStarted))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert_eq!(
            state.host_calls,
            vec!["call:cleanup", "set:#status:class=offline"]
        );
        assert_eq!(state.indicator_events, vec!["show"]);
    }

    #[actix_rt::test]
    async fn steady_state_payload_keeps_stored_actions() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session.send(InboundFrame(handshake_frame())).await.unwrap();
        session
            .send(InboundFrame(json!({ "ops": ["x"] }).to_string()))
            .await
            .unwrap();

        {
            let state = probe.0.lock().unwrap();
            // The steady-state payload is forwarded as the full object
            assert_eq!(state.applied[1], json!({ "ops": ["x"] }));
        }

        session
            .send(ChannelNotice(SessionNotice::EpisodeStarted))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert_eq!(
            state.host_calls,
            vec!["call:cleanup", "set:#status:class=offline"]
        );
    }

    #[actix_rt::test]
    async fn reconnect_handshake_replaces_actions_wholesale() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session.send(InboundFrame(handshake_frame())).await.unwrap();

        // A later handshake replaces the whole list
        let second = json!({
            "edits": {},
            "onDisconnect": [{ "type": "CallJsFn", "data": "only_this" }]
        })
        .to_string();
        session.send(InboundFrame(second)).await.unwrap();

        session
            .send(ChannelNotice(SessionNotice::EpisodeStarted))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert_eq!(state.host_calls, vec!["call:only_this"]);
    }

    #[actix_rt::test]
    async fn failing_action_skips_to_the_next() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        let frame = json!({
            "edits": {},
            "onDisconnect": [
                { "type": "CallJsFn", "data": "missing" },
                { "type": "Unknown", "data": 1 },
                { "type": "CallJsFn", "data": "still_runs" }
            ]
        })
        .to_string();
        session.send(InboundFrame(frame)).await.unwrap();
        session
            .send(ChannelNotice(SessionNotice::EpisodeStarted))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert_eq!(state.host_calls, vec!["call:still_runs"]);
    }

    #[actix_rt::test]
    async fn resumed_open_clears_rendered_content() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session
            .send(ChannelNotice(SessionNotice::Opened { resumed: true }))
            .await
            .unwrap();
        // Clearing twice in a row is safe and idempotent
        session
            .send(ChannelNotice(SessionNotice::Opened { resumed: true }))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert_eq!(state.clears, 2);
    }

    #[actix_rt::test]
    async fn pong_token_never_reaches_the_renderer() {
        // The channel layer discards the pong before classification; even if
        // one leaked through, it must produce no render call and no state
        // change.
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session
            .send(InboundFrame("__pong__".to_string()))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert!(state.applied.is_empty());
        assert!(state.host_calls.is_empty());
        assert!(state.indicator_events.is_empty());
    }

    #[actix_rt::test]
    async fn malformed_frame_is_dropped() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, _channel_state) = start_session(&probe);

        session
            .send(InboundFrame("this is not json".to_string()))
            .await
            .unwrap();

        let state = probe.0.lock().unwrap();
        assert!(state.applied.is_empty());
        assert!(state.host_calls.is_empty());
    }

    #[actix_rt::test]
    async fn post_message_delegates_to_channel() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let (session, channel_state) = start_session(&probe);

        session
            .send(PostMessage(r#"{"method":"user_event"}"#.to_string()))
            .await
            .unwrap();
        settle().await;

        let sent = &channel_state.lock().unwrap().sent;
        assert_eq!(sent.as_slice(), [r#"{"method":"user_event"}"#.to_string()]);
    }

    #[actix_rt::test]
    async fn post_message_without_channel_is_a_quiet_no_op() {
        let probe = Probe(Arc::new(Mutex::new(CollabState::default())));
        let session = SessionActor::new(
            Box::new(RecordingRenderer(probe.clone())),
            Box::new(RecordingIndicator(probe.clone())),
            Box::new(RecordingHostPage(probe.clone())),
        )
        .start();

        // No AttachChannel was sent; this must neither panic nor queue
        session
            .send(PostMessage("dropped".to_string()))
            .await
            .unwrap();
    }
}
