use futures::StreamExt;
use serial_test::serial;

use super::support::*;

async fn populate<S: SnapshotStore>(network: &Network<S>) -> PostId {
    befriend(network, ALICE, BOB).await;
    network.send_friend_request(CHARLIE, ALICE).await.expect("pending request");
    let post_id = network
        .create_post(new_post(ALICE, "persist me", Privacy::Friends))
        .await
        .expect("create post")
        .id;
    network.react(post_id, BOB, ReactionKind::Angry).await.expect("react");
    network.comment(post_id, BOB, "saved?".to_string()).await.expect("comment");
    post_id
}

#[tokio::test]
async fn json_files_round_trip_the_whole_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let network = Network::open(JsonFileStore::new(dir.path()), Fanout::default())
        .await
        .expect("open");
    let post_id = populate(&network).await;
    let saved = network.snapshot().await;
    drop(network);

    for file in ["users.json", "posts.json", "notifications.json"] {
        assert!(dir.path().join(file).exists(), "{file} should be written");
    }

    let reopened = Network::open(JsonFileStore::new(dir.path()), Fanout::default())
        .await
        .expect("reopen");
    assert_eq!(reopened.snapshot().await, saved);
    assert_eq!(reopened.relationship(ALICE, BOB).await.expect("rel"), Relationship::Friends);
    assert_eq!(
        reopened.relationship(ALICE, CHARLIE).await.expect("rel"),
        Relationship::IncomingPending
    );

    let next = reopened
        .create_post(new_post(BOB, "after restart", Privacy::Public))
        .await
        .expect("create after reload");
    assert!(next.id > post_id);
    let max_comment = saved.posts[0].comments.iter().map(|c| c.id).max().expect("comment");
    assert!(next.id > max_comment);
}

#[tokio::test]
async fn missing_files_seed_the_demo_users_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("fresh"));
    assert!(store.load().await.expect("load").is_none());

    let network = Network::open(store, Fanout::default()).await.expect("open");
    assert_eq!(network.users().await.len(), 3);
    assert!(!dir.path().join("fresh").join("users.json").exists());
}

#[tokio::test]
async fn broken_friend_records_are_repaired_on_load() {
    let mut users = hearth::types::seed_users();
    users[0].friends = vec![BOB, BOB];
    users[1].friend_requests = vec![ALICE];
    let snapshot = Snapshot {
        users,
        ..Snapshot::default()
    };

    let network = Network::open(MemoryStore::with_snapshot(snapshot), Fanout::default())
        .await
        .expect("open");
    let alice = network.user(ALICE).await.expect("alice");
    let bob = network.user(BOB).await.expect("bob");
    assert_eq!(alice.friends, vec![BOB]);
    assert_eq!(bob.friends, vec![ALICE]);
    assert!(bob.friend_requests.is_empty());
}

#[tokio::test]
#[serial]
async fn redis_round_trip_the_whole_state() {
    let prefix = unique_prefix();
    let network = Network::open(redis_store(&prefix).await, Fanout::default())
        .await
        .expect("open");
    populate(&network).await;
    let saved = network.snapshot().await;

    let loaded = redis_store(&prefix)
        .await
        .load()
        .await
        .expect("load")
        .expect("snapshot present");
    assert_eq!(loaded, saved);
}

#[tokio::test]
#[serial]
async fn redis_without_keys_loads_nothing() {
    let prefix = unique_prefix();
    let store = redis_store(&prefix).await;
    assert!(store.load().await.expect("load").is_none());
    assert_eq!(store.prefix(), prefix);
}

#[tokio::test]
#[serial]
async fn redis_relay_publishes_events_as_json() {
    let prefix = unique_prefix();
    let channel = hearth::keys::KeyContext::new(&prefix).events_channel();
    let client = redis::Client::open("redis://127.0.0.1/").expect("redis client");
    let mut pubsub = client.get_async_pubsub().await.expect("pubsub");
    pubsub.subscribe(&channel).await.expect("subscribe");

    let store = redis_store(&prefix).await;
    let conn = store.connection();
    let network = Network::open(store, Fanout::default()).await.expect("open");
    let relay = hearth::fanout::spawn_redis_relay(network.fanout(), conn, channel);

    network.send_friend_request(ALICE, CHARLIE).await.expect("send");

    let mut messages = std::pin::pin!(pubsub.on_message());
    let message = tokio::time::timeout(std::time::Duration::from_secs(5), messages.next())
        .await
        .expect("relay message in time")
        .expect("message");
    let payload: String = message.get_payload().expect("payload");
    let event: Event = serde_json::from_str(&payload).expect("event json");
    assert_eq!(event, Event::FriendRequest { to: CHARLIE });
    relay.abort();
}
