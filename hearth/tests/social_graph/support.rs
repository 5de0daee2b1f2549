pub(crate) use hearth::{
    AcceptOutcome, Backend, ClientView, Delivery, EntityKind, Event, Fanout, Followup, HearthError, JsonFileStore,
    MemoryStore, Network, NewPost, NotificationKind, Privacy, ReactionKind, RedisStore, Relationship, RequestOutcome,
    Snapshot, SnapshotStore,
    errors::HearthResult,
    types::{PostId, UserId},
};
pub(crate) use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

pub(crate) const ALICE: UserId = 1;
pub(crate) const BOB: UserId = 2;
pub(crate) const CHARLIE: UserId = 3;

pub(crate) async fn memory_network() -> Network<MemoryStore> {
    Network::open(MemoryStore::new(), Fanout::new(64))
        .await
        .expect("open memory network")
}

pub(crate) async fn backend_network() -> Arc<Network<Backend>> {
    let network = Network::open(Backend::Memory(MemoryStore::new()), Fanout::new(64))
        .await
        .expect("open memory network");
    Arc::new(network)
}

pub(crate) fn new_post(user_id: UserId, text: &str, privacy: Privacy) -> NewPost {
    NewPost {
        user_id,
        text: text.to_string(),
        media: None,
        privacy,
    }
}

pub(crate) async fn befriend<S: SnapshotStore>(network: &Network<S>, a: UserId, b: UserId) {
    assert_eq!(
        network.send_friend_request(a, b).await.expect("send request"),
        RequestOutcome::Sent
    );
    assert_eq!(
        network.accept_friend_request(b, a).await.expect("accept request"),
        AcceptOutcome::Accepted
    );
}

/// Drains everything currently queued for `observer`.
pub(crate) fn drain(observer: &mut hearth::Observer) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(delivery) = observer.try_recv() {
        match delivery {
            Delivery::Event(event) => events.push(event),
            Delivery::Missed(missed) => panic!("observer missed {missed} event(s)"),
        }
    }
    events
}

/// Store double whose saves can be switched to fail.
#[derive(Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl FailingStore {
    pub(crate) fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl SnapshotStore for FailingStore {
    async fn load(&self) -> HearthResult<Option<Snapshot>> {
        self.inner.load().await
    }

    async fn save(&self, snapshot: &Snapshot) -> HearthResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(HearthError::Storage {
                message: "disk full".into(),
            });
        }
        self.inner.save(snapshot).await
    }

    fn describe(&self) -> String {
        "failing test store".to_string()
    }
}

pub(crate) static TEST_NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique Redis key prefix per test.
pub(crate) fn unique_prefix() -> String {
    let idx = TEST_NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("hearth_test_{idx}_{}", &salt[..8])
}

pub(crate) async fn redis_store(prefix: &str) -> RedisStore {
    RedisStore::connect("redis://127.0.0.1/", prefix)
        .await
        .expect("connect to local redis")
}

pub(crate) async fn post_id_of<S: SnapshotStore>(network: &Network<S>, author: UserId, text: &str) -> PostId {
    network
        .create_post(new_post(author, text, Privacy::Public))
        .await
        .expect("create post")
        .id
}
