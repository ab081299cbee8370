//! # Lifecycle Integration Tests
//!
//! Two routers wired over the in-memory pair: handshake, buffered publishes,
//! detach cleanup, heartbeat liveness and close propagation.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use wirebus_router::testing::{link, RecordingEndpoint};
    use wirebus_router::{Router, RouterConfig, RouterNotice};

    /// Attach a collecting listener to a router.
    fn collect(router: &Router, name: &str) -> Arc<Mutex<Vec<Option<Value>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = router
            .subscribe(name, move |payload| {
                sink.lock().unwrap().push(payload.cloned());
            })
            .unwrap();
        seen
    }

    #[tokio::test]
    async fn test_handshake_exchanges_subscriptions() {
        let a = Router::default();
        let b = Router::default();
        let _listener = collect(&a, "ping");

        link(&a, &b);

        // The Start handshake carried A's local names to B.
        assert_eq!(b.subscribed_names(), vec!["ping".to_owned()]);
        assert_eq!(b.sources_for("ping"), vec![a.id()]);
        assert!(a.subscribed_names().is_empty());
    }

    #[tokio::test]
    async fn test_ping_delivered_exactly_once() {
        crate::init_tracing();
        let a = Router::default();
        let b = Router::default();
        let seen = collect(&a, "ping");

        link(&a, &b);
        b.publish("ping", Some(json!("hi")));

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!("hi"))]);
    }

    #[tokio::test]
    async fn test_buffered_publish_flushes_to_late_subscriber() {
        let a = Router::default();
        let b = Router::default();
        let seen = collect(&a, "ping");

        // Published into the void: no endpoint is subscribed yet.
        b.publish("ping", Some(json!(1)));
        b.publish("ping", Some(json!(2)));
        assert_eq!(b.buffered_len("ping"), 2);

        // Linking announces A's subscription; B flushes in publish order.
        link(&a, &b);

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!(1)), Some(json!(2))]);
        assert_eq!(b.buffered_len("ping"), 0);
        a.close();
        b.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_buffer_is_never_delivered() {
        let a = Router::default();
        let b = Router::new(RouterConfig::new().with_buffer_timeout(Duration::from_millis(200)));
        let seen = collect(&a, "ping");

        b.publish("ping", Some(json!("stale")));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(b.buffered_len("ping"), 0);

        link(&a, &b);
        b.publish("ping", Some(json!("fresh")));

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!("fresh"))]);
        a.close();
        b.close();
    }

    #[tokio::test]
    async fn test_detach_leaves_no_orphan_index_entries() {
        let a = Router::default();
        let b = Router::default();
        let _listener = collect(&a, "ping");
        let (_handle_a, handle_b) = link(&a, &b);

        assert!(b.tracks_source(a.id()));

        b.detach(handle_b.id());

        assert_eq!(b.endpoint_count(), 0);
        assert!(!b.tracks_source(a.id()));
        assert_eq!(b.endpoints_subscribed("ping"), 0);
        assert!(b.subscribed_names().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeats_keep_linked_routers_alive() {
        let config = || RouterConfig::new().with_heartbeat_interval(Duration::from_secs(1));
        let a = Router::new(config());
        let b = Router::new(config());
        link(&a, &b);

        // A silent endpoint on the same router is evicted; the linked peer,
        // exchanging heartbeats, survives.
        let silent = RecordingEndpoint::new();
        a.attach(silent.clone()).unwrap();
        assert_eq!(a.endpoint_count(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(a.endpoint_count(), 1);
        assert_eq!(b.endpoint_count(), 1);
        a.close();
        b.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_eviction_notifies_once() {
        let disconnects = Arc::new(AtomicUsize::new(0));
        let counter = disconnects.clone();
        let a = Router::new(RouterConfig::new().with_heartbeat_interval(Duration::from_secs(1)));
        let _token = a.observe(move |notice| {
            if matches!(notice, RouterNotice::Disconnected { .. }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        a.attach(RecordingEndpoint::new()).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(a.endpoint_count(), 0);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
        a.close();
    }

    #[tokio::test]
    async fn test_close_propagates_to_peer() {
        let a = Router::default();
        let b = Router::default();
        link(&a, &b);
        assert_eq!(b.endpoint_count(), 1);

        a.close();

        // B saw A's Close announcement and tore the endpoint down.
        assert!(a.is_closed());
        assert_eq!(b.endpoint_count(), 0);
        assert!(!b.is_closed());
        b.close();
    }
}
