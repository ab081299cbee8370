//! # Delivery Policy Integration Tests
//!
//! A hub router linked to several leaves: fan-out, round-robin
//! single-consumer rotation, and targeted delivery.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    use wirebus_router::testing::link;
    use wirebus_router::{PublishOptions, Router, SourceId};

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

    /// A hub linked to `n` fresh leaf routers, in order.
    fn star(hub: &Router, n: usize) -> Vec<Router> {
        (0..n)
            .map(|_| {
                let leaf = Router::default();
                link(hub, &leaf);
                leaf
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_leaf_once() {
        let hub = Router::default();
        let leaves = star(&hub, 3);
        let seen: Vec<_> = leaves.iter().map(|leaf| collect(leaf, "tick")).collect();

        hub.publish("tick", Some(json!(42)));

        for leaf_seen in &seen {
            assert_eq!(*leaf_seen.lock().unwrap(), vec![Some(json!(42))]);
        }
    }

    #[tokio::test]
    async fn test_round_robin_star_rotates_b_c_b() {
        let hub = Router::default();
        let b = Router::default();
        let c = Router::default();
        link(&hub, &b);
        link(&hub, &c);

        // B announces before C; rotation follows announcement order.
        let seen_b = collect(&b, "job");
        let seen_c = collect(&c, "job");

        for i in 1..=3 {
            hub.publish_with("job", Some(json!(i)), PublishOptions::single_consumer());
        }

        assert_eq!(*seen_b.lock().unwrap(), vec![Some(json!(1)), Some(json!(3))]);
        assert_eq!(*seen_c.lock().unwrap(), vec![Some(json!(2))]);
    }

    #[tokio::test]
    async fn test_round_robin_distinct_until_wrap() {
        let hub = Router::default();
        let leaves = star(&hub, 3);
        let seen: Vec<_> = leaves.iter().map(|leaf| collect(leaf, "job")).collect();

        // n publishes over n subscribers: every leaf exactly one.
        for i in 0..3 {
            hub.publish_with("job", Some(json!(i)), PublishOptions::single_consumer());
        }
        for leaf_seen in &seen {
            assert_eq!(leaf_seen.lock().unwrap().len(), 1);
        }

        // The (n+1)-th wraps to the first subscriber.
        hub.publish_with("job", Some(json!(99)), PublishOptions::single_consumer());
        assert_eq!(seen[0].lock().unwrap().len(), 2);
        assert_eq!(seen[1].lock().unwrap().len(), 1);
        assert_eq!(seen[2].lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_targeted_delivery_reaches_only_the_target() {
        let hub = Router::default();
        let b = Router::default();
        let c = Router::default();
        link(&hub, &b);
        link(&hub, &c);
        let seen_b = collect(&b, "job");
        let seen_c = collect(&c, "job");

        hub.publish_with("job", Some(json!("for c")), PublishOptions::to_target(c.id()));

        assert!(seen_b.lock().unwrap().is_empty());
        assert_eq!(*seen_c.lock().unwrap(), vec![Some(json!("for c"))]);
    }

    #[tokio::test]
    async fn test_targeted_delivery_to_absent_source_drops() {
        let hub = Router::default();
        let b = Router::default();
        link(&hub, &b);
        let seen_b = collect(&b, "job");

        hub.publish_with(
            "job",
            Some(json!("lost")),
            PublishOptions::to_target(SourceId::random()),
        );

        // Delivered nowhere, and unlike the other policies never buffered.
        assert!(seen_b.lock().unwrap().is_empty());
        assert_eq!(hub.buffered_len("job"), 0);
    }

    #[tokio::test]
    async fn test_leaf_to_leaf_via_hub_needs_hub_listener() {
        // Routing is one hop: a leaf's publish reaches the hub's local
        // listeners, not other leaves. Relaying is the host's business.
        let hub = Router::default();
        let b = Router::default();
        let c = Router::default();
        link(&hub, &b);
        link(&hub, &c);
        let seen_hub = collect(&hub, "tick");
        let seen_c = collect(&c, "tick");

        b.publish("tick", Some(json!(1)));

        assert_eq!(*seen_hub.lock().unwrap(), vec![Some(json!(1))]);
        assert!(seen_c.lock().unwrap().is_empty());
    }
}
