// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subscription matching, delivery order, and subscriber liveness.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use trellis_core::{
    AttrMap, EntityKind, Event, EventClass, EventKind, NodeRecord, Patch, Store, StoreConfig,
    SubscribeOptions, Topic, Transaction,
};

#[test]
fn entity_topic_with_event_mask_sees_exactly_its_events() {
    let store = Store::start("events-mask", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(
        Topic::entity(EntityKind::Node, "x"),
        SubscribeOptions::default().with_event_classes([EventClass::Created, EventClass::Updated]),
    );

    store.insert(NodeRecord::new("person").with_id("x")).unwrap();
    store
        .update(EntityKind::Node, Patch::update("x").set("age", 1))
        .unwrap();
    store.delete(EntityKind::Node, &"x".into()).unwrap();

    let events = sub.drain();
    assert_eq!(events.len(), 2, "delete is masked out");

    assert_eq!(events[0].kind, EventKind::Created);
    assert_eq!(events[0].entity_id, Some("x".into()));

    assert_eq!(events[1].kind, EventKind::Updated);
    let previous = events[1].previous.as_ref().unwrap();
    let current = events[1].entity.as_ref().unwrap();
    assert_eq!(previous.metadata().version, 0);
    assert_eq!(current.metadata().version, 1);
    assert!(events[1].changes.contains_key("age"));

    Store::stop("events-mask").unwrap();
}

#[test]
fn other_entities_do_not_leak_into_an_entity_topic() {
    let store = Store::start("events-other", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(
        Topic::entity(EntityKind::Node, "x"),
        SubscribeOptions::default(),
    );

    store.insert(NodeRecord::new("person").with_id("y")).unwrap();
    assert!(sub.is_empty());

    Store::stop("events-other").unwrap();
}

#[test]
fn transaction_events_arrive_in_commit_order() {
    let store = Store::start("events-tx-order", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(Topic::Kind(EntityKind::Node), SubscribeOptions::default());

    let tx = Transaction::new()
        .insert(NodeRecord::new("person").with_id("a"))
        .insert(NodeRecord::new("person").with_id("b"))
        .update(EntityKind::Node, Patch::update("a").set("n", 1));
    store.commit(tx).unwrap();

    let kinds: Vec<(EventKind, String)> = sub
        .drain()
        .into_iter()
        .map(|e| (e.kind, e.entity_id.unwrap().to_string()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (EventKind::Created, "a".to_owned()),
            (EventKind::Created, "b".to_owned()),
            (EventKind::Updated, "a".to_owned()),
        ]
    );

    Store::stop("events-tx-order").unwrap();
}

#[test]
fn failed_transactions_publish_nothing() {
    let store = Store::start("events-tx-fail", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(Topic::Kind(EntityKind::Node), SubscribeOptions::default());

    let tx = Transaction::new()
        .insert(NodeRecord::new("person").with_id("a"))
        .delete(EntityKind::Node, "ghost");
    assert!(store.commit(tx).is_err());
    assert!(sub.is_empty(), "rolled-back writes must not emit events");

    Store::stop("events-tx-fail").unwrap();
}

#[test]
fn custom_events_reach_channel_subscribers() {
    let store = Store::start("events-custom", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(Topic::channel("sync"), SubscribeOptions::default());

    let mut meta = AttrMap::new();
    meta.insert("origin".to_owned(), serde_json::json!("watcher"));
    let delivered = store.publish(&Event::custom("sync", "refresh", meta));
    assert_eq!(delivered, 1);

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Custom("refresh".to_owned()));
    assert_eq!(events[0].metadata.get("origin"), Some(&serde_json::json!("watcher")));

    Store::stop("events-custom").unwrap();
}

#[test]
fn dropped_handles_vanish_before_the_next_publish() {
    let store = Store::start("events-liveness", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(Topic::Kind(EntityKind::Node), SubscribeOptions::default());
    assert_eq!(store.subscriptions().len(), 1);

    drop(sub);
    store.insert(NodeRecord::new("person").with_id("a")).unwrap();
    assert!(
        store.subscriptions().is_empty(),
        "dead subscription must be pruned and never listed again"
    );

    Store::stop("events-liveness").unwrap();
}

#[test]
fn slow_subscribers_drop_oldest_with_a_visible_counter() {
    let store = Store::start(
        "events-overflow",
        StoreConfig::default().with_mailbox_capacity(4),
    )
    .unwrap();
    let (id, sub) = store.subscribe(Topic::Kind(EntityKind::Node), SubscribeOptions::default());

    for i in 0..10 {
        store
            .insert(NodeRecord::new("person").with_id(format!("n{i:02}")))
            .unwrap();
    }

    assert_eq!(sub.dropped(), 6);
    let info = store
        .subscriptions()
        .into_iter()
        .find(|s| s.id == id)
        .unwrap();
    assert_eq!(info.dropped, 6, "drop counter surfaces through listing");

    let survivors: Vec<String> = sub
        .drain()
        .into_iter()
        .map(|e| e.entity_id.unwrap().to_string())
        .collect();
    let survivors: Vec<&str> = survivors.iter().map(String::as_str).collect();
    assert_eq!(survivors, vec!["n06", "n07", "n08", "n09"], "newest survive");

    Store::stop("events-overflow").unwrap();
}

#[test]
fn filters_apply_after_topic_matching() {
    let store = Store::start("events-filter", StoreConfig::default()).unwrap();
    let (_id, sub) = store.subscribe(
        Topic::Kind(EntityKind::Node),
        SubscribeOptions::default().with_filter(|event| {
            event
                .entity
                .as_ref()
                .is_some_and(|e| e.data().get("vip") == Some(&serde_json::json!(true)))
        }),
    );

    store
        .insert(NodeRecord::new("person").with_id("a").attr("vip", true))
        .unwrap();
    store.insert(NodeRecord::new("person").with_id("b")).unwrap();

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].entity_id, Some("a".into()));

    Store::stop("events-filter").unwrap();
}
