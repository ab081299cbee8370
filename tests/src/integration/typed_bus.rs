//! # Typed Bus Integration Tests
//!
//! The [`EventBus`] client layer over linked routers: typed events cross the
//! wire, listener transitions drive the router subscriptions, and delivery
//! policies pass through.

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    use wirebus::{BusEvent, EventBus};
    use wirebus_router::testing::link;
    use wirebus_router::Router;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Greeting {
        text: String,
    }

    impl BusEvent for Greeting {
        const NAME: &'static str = "greeting";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Job {
        id: u32,
    }

    impl BusEvent for Job {
        const NAME: &'static str = "job";
    }

    #[tokio::test]
    async fn test_typed_event_crosses_the_wire_once() {
        let router_a = Router::default();
        let router_b = Router::default();
        link(&router_a, &router_b);

        let bus_a = EventBus::bound(Arc::new(()), router_a);
        let bus_b = EventBus::bound(Arc::new(()), router_b);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _token = bus_a.on::<Greeting>(move |event, _ctx| {
            sink.lock().unwrap().push(event);
        });

        bus_b.emit(&Greeting { text: "hi".into() });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Greeting { text: "hi".into() }]
        );
    }

    #[tokio::test]
    async fn test_listener_removal_withdraws_wire_subscription() {
        let router_a = Router::default();
        let router_b = Router::default();
        link(&router_a, &router_b);

        let bus_a = EventBus::bound(Arc::new(()), router_a.clone());
        let token = bus_a.on::<Greeting>(|_, _ctx| {});
        assert_eq!(router_b.subscribed_names(), vec!["greeting".to_owned()]);

        bus_a.off(token);

        // The peer saw the Unsubscribe and dropped its index entry.
        assert!(router_b.subscribed_names().is_empty());
        assert!(!router_b.tracks_source(router_a.id()));
    }

    #[tokio::test]
    async fn test_emit_to_reaches_only_the_target_bus() {
        let hub = Router::default();
        let router_b = Router::default();
        let router_c = Router::default();
        link(&hub, &router_b);
        link(&hub, &router_c);
        let target = router_c.id();

        let bus_hub = EventBus::bound(Arc::new(()), hub);
        let bus_b = EventBus::bound(Arc::new(()), router_b);
        let bus_c = EventBus::bound(Arc::new(()), router_c);

        let seen_b = Arc::new(Mutex::new(Vec::new()));
        let seen_c = Arc::new(Mutex::new(Vec::new()));
        let sink_b = seen_b.clone();
        let sink_c = seen_c.clone();
        let _token_b = bus_b.on::<Job>(move |event, _ctx| {
            sink_b.lock().unwrap().push(event);
        });
        let _token_c = bus_c.on::<Job>(move |event, _ctx| {
            sink_c.lock().unwrap().push(event);
        });

        bus_hub.emit_to(&Job { id: 7 }, target);

        assert!(seen_b.lock().unwrap().is_empty());
        assert_eq!(*seen_c.lock().unwrap(), vec![Job { id: 7 }]);
    }

    #[tokio::test]
    async fn test_raw_listener_sees_name_and_payload() {
        let router_a = Router::default();
        let router_b = Router::default();
        link(&router_a, &router_b);

        let bus_a = EventBus::bound(Arc::new(()), router_a);
        let bus_b = EventBus::bound(Arc::new(()), router_b);

        let seen: Arc<Mutex<Vec<(String, Option<Value>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _token = bus_a.on_named(&["greeting", "job"], move |name, payload, _ctx| {
            sink.lock().unwrap().push((name.to_owned(), payload.cloned()));
        });

        bus_b.emit(&Greeting { text: "hi".into() });
        bus_b.emit(&Job { id: 3 });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("greeting".to_owned(), Some(json!({"text": "hi"}))),
                ("job".to_owned(), Some(json!({"id": 3}))),
            ]
        );
    }

    #[tokio::test]
    async fn test_emit_buffers_until_remote_listener_appears() {
        let router_a = Router::default();
        let router_b = Router::default();
        link(&router_a, &router_b);

        let bus_a = EventBus::bound(Arc::new(()), router_a);
        let bus_b = EventBus::bound(Arc::new(()), router_b.clone());

        // Nobody listens yet: the emit is buffered on B.
        bus_b.emit(&Greeting { text: "early".into() });
        assert_eq!(router_b.buffered_len("greeting"), 1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _token = bus_a.on::<Greeting>(move |event, _ctx| {
            sink.lock().unwrap().push(event);
        });

        // Registering announced the subscription; B flushed its buffer.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Greeting { text: "early".into() }]
        );
        assert_eq!(router_b.buffered_len("greeting"), 0);
        bus_a.router().unwrap().close();
        router_b.close();
    }
}
