//! Registry client against the in-memory registry process

use std::sync::Arc;

use linkspace_core::{ContentId, DisconnectedWallet, KeypairWallet, Name, Wallet};
use linkspace_messaging::{MessageId, MessagingClient, MessagingConfig, MockProcessNetwork, ProcessId};
use linkspace_registry::{
    MockRegistryProcess, NameState, RegistryClient, RegistryError, RemoveOutcome,
};

struct Harness {
    network: Arc<MockProcessNetwork>,
    process: ProcessId,
}

impl Harness {
    fn new() -> Self {
        let network = Arc::new(MockProcessNetwork::new());
        let process = ProcessId::new("registry");
        network.spawn(process.clone(), MockRegistryProcess::new());
        Self { network, process }
    }

    fn client(&self, wallet: Arc<dyn Wallet>) -> RegistryClient {
        let messaging = MessagingClient::new(self.network.clone(), wallet, MessagingConfig::testing());
        RegistryClient::new(messaging, self.process.clone())
    }
}

fn name(s: &str) -> Name {
    Name::parse(s).unwrap()
}

fn content(tag: &str) -> ContentId {
    ContentId::from_data(tag.as_bytes())
}

#[tokio::test]
async fn test_register_then_lookup() {
    let harness = Harness::new();
    let wallet = Arc::new(KeypairWallet::generate());
    let client = harness.client(wallet.clone());

    let binding = client.register(&name("john-doe"), content("v1")).await.unwrap();
    assert_eq!(binding.owner, wallet.identity().unwrap());
    assert_eq!(client.name_state(&name("john-doe")), NameState::Bound);

    let found = client.lookup(&wallet.identity().unwrap()).await.unwrap().unwrap();
    assert_eq!(found.name, name("john-doe"));
    assert_eq!(found.content_id, content("v1"));
}

#[tokio::test]
async fn test_lookup_of_unknown_identity_is_none() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(DisconnectedWallet));
    let stranger = KeypairWallet::generate().identity().unwrap();
    assert_eq!(client.lookup(&stranger).await.unwrap(), None);
}

#[tokio::test]
async fn test_rebind_leaves_single_binding() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("republished");

    client.register(&n, content("v1")).await.unwrap();
    let rebound = client.rebind(&n, content("v2")).await.unwrap();
    assert_eq!(rebound.content_id, content("v2"));

    let matching: Vec<_> = client
        .list_bindings()
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.name == n)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].content_id, content("v2"));
    assert_eq!(client.name_state(&n), NameState::Bound);
}

#[tokio::test]
async fn test_remove_frees_name_for_others() {
    let harness = Harness::new();
    let alice = harness.client(Arc::new(KeypairWallet::generate()));
    let bob_wallet = Arc::new(KeypairWallet::generate());
    let bob = harness.client(bob_wallet.clone());
    let n = name("shared-name");

    alice.register(&n, content("alice")).await.unwrap();
    assert_eq!(alice.remove(&n).await.unwrap(), RemoveOutcome::Removed);
    assert_eq!(alice.name_state(&n), NameState::Unregistered);
    assert!(!alice.list_all().await.unwrap().contains(&n));

    let binding = bob.register(&n, content("bob")).await.unwrap();
    assert_eq!(binding.owner, bob_wallet.identity().unwrap());
}

#[tokio::test]
async fn test_concurrent_register_exactly_one_wins() {
    let harness = Harness::new();
    let alice = harness.client(Arc::new(KeypairWallet::generate()));
    let bob = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("contested");

    let (a, b) = tokio::join!(
        alice.register(&n, content("alice")),
        bob.register(&n, content("bob"))
    );

    let outcomes = [a, b];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::Conflict { .. })))
        .count();
    assert_eq!((wins, conflicts), (1, 1));
    assert_eq!(alice.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_unbound_name_is_not_found() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("never-claimed");

    assert_eq!(client.remove(&n).await.unwrap(), RemoveOutcome::NotFound);
    assert_eq!(client.name_state(&n), NameState::Unregistered);
}

#[tokio::test]
async fn test_only_owner_can_rebind_or_remove() {
    let harness = Harness::new();
    let alice = harness.client(Arc::new(KeypairWallet::generate()));
    let mallory = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("alice-page");
    alice.register(&n, content("alice")).await.unwrap();

    assert!(matches!(
        mallory.rebind(&n, content("evil")).await,
        Err(RegistryError::Unauthorized { .. })
    ));
    assert!(matches!(
        mallory.remove(&n).await,
        Err(RegistryError::Unauthorized { .. })
    ));
    assert_eq!(mallory.name_state(&n), NameState::Unregistered);

    let bindings = alice.list_bindings().await.unwrap();
    assert_eq!(bindings[0].content_id, content("alice"));
}

#[tokio::test]
async fn test_timeout_is_ambiguous_and_confirm_finds_late_result() {
    let harness = Harness::new();
    let wallet = Arc::new(KeypairWallet::generate());
    let client = harness.client(wallet.clone());
    let n = name("slow-name");

    harness.network.withhold_results(&harness.process, true);
    let err = client.register(&n, content("v1")).await.unwrap_err();
    assert!(err.is_ambiguous());
    assert_eq!(client.name_state(&n), NameState::Unregistered);

    // The write did land; only a fresh lookup can tell
    let found = client.lookup(&wallet.identity().unwrap()).await.unwrap();
    assert_eq!(found.map(|b| b.name), Some(n.clone()));

    let RegistryError::Timeout { message_id, .. } = err else {
        panic!("expected timeout");
    };
    let message_id = MessageId::new(message_id);
    assert!(client.confirm(&message_id).await.unwrap().is_none());

    harness.network.release_withheld(&harness.process).await;
    let late = client.confirm(&message_id).await.unwrap().unwrap();
    assert_eq!(late.error_code(), None);
}

#[tokio::test]
async fn test_overlapping_mutations_are_rejected() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("busy-name");

    harness.network.withhold_results(&harness.process, true);
    let (first, second) = tokio::join!(
        client.register(&n, content("v1")),
        client.register(&n, content("v1"))
    );

    assert!(first.unwrap_err().is_ambiguous());
    assert!(matches!(second, Err(RegistryError::RequestInFlight { .. })));
    assert_eq!(harness.network.post_count(&harness.process).await, 1);
}

#[tokio::test]
async fn test_no_wallet_fails_before_sending() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(DisconnectedWallet));

    let err = client.register(&name("no-wallet"), content("x")).await.unwrap_err();
    assert_eq!(err, RegistryError::NotAuthenticated);
    assert_eq!(harness.network.post_count(&harness.process).await, 0);
}

#[tokio::test]
async fn test_transport_errors_surface_unchanged() {
    let harness = Harness::new();
    let client = harness.client(Arc::new(KeypairWallet::generate()));
    let n = name("offline");

    harness.network.set_unreachable(&harness.process, true);
    let err = client.register(&n, content("x")).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(client.name_state(&n), NameState::Unregistered);
    assert_eq!(harness.network.post_count(&harness.process).await, 0);
}

#[tokio::test]
async fn test_listing_walks_every_page() {
    let harness = Harness::new();
    let mut expected = Vec::new();
    for i in 0..5 {
        let client = harness.client(Arc::new(KeypairWallet::generate()));
        let n = name(&format!("user-{}", i));
        client.register(&n, content(n.as_str())).await.unwrap();
        expected.push(n);
    }

    let reader = harness.client(Arc::new(DisconnectedWallet)).with_page_size(2);
    let names: Vec<Name> = reader.list_all().await.unwrap().into_iter().collect();
    assert_eq!(names, expected);
}
