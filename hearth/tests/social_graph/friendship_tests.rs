use super::support::*;

#[tokio::test]
async fn request_then_accept_leaves_mutual_friends_and_no_requests() {
    let network = memory_network().await;
    befriend(&network, ALICE, BOB).await;

    let alice = network.user(ALICE).await.expect("alice");
    let bob = network.user(BOB).await.expect("bob");
    assert_eq!(alice.friends, vec![BOB]);
    assert_eq!(bob.friends, vec![ALICE]);
    assert!(alice.friend_requests.is_empty());
    assert!(bob.friend_requests.is_empty());
    assert_eq!(network.relationship(ALICE, BOB).await.expect("rel"), Relationship::Friends);
}

#[tokio::test]
async fn pending_request_lives_on_the_recipient() {
    let network = memory_network().await;
    network.send_friend_request(ALICE, BOB).await.expect("send");

    assert_eq!(network.user(BOB).await.expect("bob").friend_requests, vec![ALICE]);
    assert!(network.user(ALICE).await.expect("alice").friend_requests.is_empty());
    assert_eq!(
        network.relationship(ALICE, BOB).await.expect("rel"),
        Relationship::OutgoingPending
    );
    assert_eq!(
        network.relationship(BOB, ALICE).await.expect("rel"),
        Relationship::IncomingPending
    );

    let notifications = network.notifications_for(BOB).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::FriendRequest);
    assert_eq!(notifications[0].from, ALICE);
}

#[tokio::test]
async fn repeated_request_is_not_duplicated() {
    let network = memory_network().await;
    network.send_friend_request(ALICE, BOB).await.expect("send");
    assert_eq!(
        network.send_friend_request(ALICE, BOB).await.expect("send again"),
        RequestOutcome::AlreadyPending
    );
    assert_eq!(network.user(BOB).await.expect("bob").friend_requests, vec![ALICE]);
    assert_eq!(network.notifications_for(BOB).await.len(), 1);
}

#[tokio::test]
async fn accepting_twice_matches_accepting_once() {
    let network = memory_network().await;
    befriend(&network, ALICE, BOB).await;
    let once = network.snapshot().await.users;

    assert_eq!(
        network.accept_friend_request(BOB, ALICE).await.expect("accept again"),
        AcceptOutcome::AlreadyFriends
    );
    assert_eq!(network.snapshot().await.users, once);
}

#[tokio::test]
async fn accept_without_request_changes_nothing() {
    let network = memory_network().await;
    let mut bob_view = ClientView::new(BOB, network.users().await, Vec::new(), Vec::new());
    let mut observer = network.subscribe();

    assert_eq!(
        network.accept_friend_request(BOB, CHARLIE).await.expect("accept"),
        AcceptOutcome::NoPendingRequest
    );
    assert_eq!(network.relationship(BOB, CHARLIE).await.expect("rel"), Relationship::None);

    let events = drain(&mut observer);
    assert!(
        !events.iter().any(|event| matches!(event, Event::FriendAccepted { .. })),
        "unexpected friendAccepted in {events:?}"
    );
    let followups: Vec<Followup> = events.iter().flat_map(|event| bob_view.apply_event(event)).collect();
    assert!(!followups.contains(&Followup::AnnounceFriendship));
    assert!(network.notifications_for(CHARLIE).await.is_empty());
}

#[tokio::test]
async fn crossing_requests_need_an_explicit_accept() {
    let network = memory_network().await;
    network.send_friend_request(ALICE, BOB).await.expect("send");
    assert_eq!(
        network.send_friend_request(BOB, ALICE).await.expect("send back"),
        RequestOutcome::Sent
    );

    assert_eq!(network.user(ALICE).await.expect("alice").friend_requests, vec![BOB]);
    assert_eq!(network.user(BOB).await.expect("bob").friend_requests, vec![ALICE]);
    assert_ne!(network.relationship(ALICE, BOB).await.expect("rel"), Relationship::Friends);

    assert_eq!(
        network.accept_friend_request(BOB, ALICE).await.expect("accept"),
        AcceptOutcome::Accepted
    );
    let alice = network.user(ALICE).await.expect("alice");
    let bob = network.user(BOB).await.expect("bob");
    assert_eq!(alice.friends, vec![BOB]);
    assert!(alice.friend_requests.is_empty() && bob.friend_requests.is_empty());
}

#[tokio::test]
async fn remove_friend_is_symmetric() {
    let network = memory_network().await;
    befriend(&network, ALICE, CHARLIE).await;

    assert!(network.remove_friend(CHARLIE, ALICE).await.expect("remove"));
    assert!(network.user(ALICE).await.expect("alice").friends.is_empty());
    assert!(network.user(CHARLIE).await.expect("charlie").friends.is_empty());
    assert!(!network.remove_friend(ALICE, CHARLIE).await.expect("remove again"));
}

#[tokio::test]
async fn cancel_and_delete_both_clear_the_pending_request() {
    let network = memory_network().await;

    network.send_friend_request(ALICE, BOB).await.expect("send");
    assert!(network.cancel_sent_request(ALICE, BOB).await.expect("cancel"));
    assert_eq!(network.relationship(ALICE, BOB).await.expect("rel"), Relationship::None);

    network.send_friend_request(CHARLIE, BOB).await.expect("send");
    assert!(network.delete_incoming_request(BOB, CHARLIE).await.expect("delete"));
    assert_eq!(network.relationship(BOB, CHARLIE).await.expect("rel"), Relationship::None);
}

#[tokio::test]
async fn self_request_is_ignored() {
    let network = memory_network().await;
    assert_eq!(
        network.send_friend_request(ALICE, ALICE).await.expect("self"),
        RequestOutcome::SelfRequest
    );
    let alice = network.user(ALICE).await.expect("alice");
    assert!(alice.friends.is_empty());
    assert!(alice.friend_requests.is_empty());
}

#[tokio::test]
async fn unknown_user_fails_without_touching_anyone() {
    let network = memory_network().await;
    let before = network.snapshot().await;

    let err = network.send_friend_request(ALICE, 404).await.expect_err("unknown target");
    assert_eq!(err.missing_entity(), Some(EntityKind::User));
    let err = network.remove_friend(404, ALICE).await.expect_err("unknown actor");
    assert_eq!(err.missing_entity(), Some(EntityKind::User));

    assert_eq!(network.snapshot().await, before);
    assert_eq!(network.store().save_count(), 0);
}

#[tokio::test]
async fn friendship_events_drive_the_client_view() {
    let network = memory_network().await;
    let mut bob_view = ClientView::new(BOB, network.users().await, Vec::new(), Vec::new());
    let mut observer = network.subscribe();

    network.send_friend_request(ALICE, BOB).await.expect("send");
    network.accept_friend_request(BOB, ALICE).await.expect("accept");

    let events = drain(&mut observer);
    assert_eq!(
        events,
        vec![
            Event::FriendRequest { to: BOB },
            Event::FriendAccepted {
                from_user_id: ALICE,
                to_user_id: BOB
            },
        ]
    );

    let followups: Vec<Followup> = events.iter().flat_map(|event| bob_view.apply_event(event)).collect();
    assert!(followups.contains(&Followup::AnnounceFriendship));

    bob_view.replace_users(network.users().await);
    assert_eq!(bob_view.relationship_with(ALICE), Some(Relationship::Friends));
}

#[tokio::test]
async fn optimistic_toggle_matches_the_server_outcome() {
    let network = memory_network().await;
    let mut alice_view = ClientView::new(ALICE, network.users().await, Vec::new(), Vec::new());

    let action = alice_view.toggle_friend(CHARLIE).expect("button action");
    network.send_friend_request(ALICE, CHARLIE).await.expect("send");

    assert_eq!(action, hearth::FriendAction::SendRequest);
    assert_eq!(alice_view.users(), network.users().await.as_slice());
}
