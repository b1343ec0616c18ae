mod common;

use common::{recording_session, recording_session_with_render, sphere_proxy};
use vizsync_manager::{GlobalId, Location, Session};

#[test]
fn server_traffic_reaches_both_controllers() {
    let (mut session, data, render) = recording_session_with_render();
    let id = session.next_global_id();
    session.register_proxy(sphere_proxy(id, Location::SERVERS));
    session.create_proxy_objects(id).unwrap();
    session.update_proxy(id).unwrap();

    assert_eq!(data.borrow().len(), 2);
    assert_eq!(render.borrow().len(), 2);
    // Both controllers received the identical instruction sequence.
    assert_eq!(
        data.borrow()
            .iter()
            .map(|message| message.payload.clone())
            .collect::<Vec<_>>(),
        render
            .borrow()
            .iter()
            .map(|message| message.payload.clone())
            .collect::<Vec<_>>()
    );
}

#[test]
fn render_only_traffic_degrades_to_the_data_server() {
    let (mut session, seen) = recording_session();
    let id = session.next_global_id();
    session.register_proxy(sphere_proxy(id, Location::RENDER_SERVER));
    session.create_proxy_objects(id).unwrap();

    let messages = seen.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].location, Location::DATA_SERVER);
}

#[test]
fn render_only_traffic_skips_the_data_server_when_a_render_server_exists() {
    let (mut session, data, render) = recording_session_with_render();
    let id = session.next_global_id();
    session.register_proxy(sphere_proxy(id, Location::RENDER_SERVER));
    session.create_proxy_objects(id).unwrap();

    assert!(data.borrow().is_empty());
    assert_eq!(render.borrow().len(), 1);
    assert_eq!(render.borrow()[0].location, Location::RENDER_SERVER);
}

#[test]
fn global_ids_are_unique_and_strictly_increasing() {
    let (mut session, _) = recording_session();
    let mut previous = GlobalId::NULL;
    for _ in 0..100 {
        let id = session.next_global_id();
        assert!(id > previous);
        previous = id;
    }
}

#[test]
fn reserved_ids_stay_below_allocated_ones() {
    let (mut session, _) = recording_session();
    let timekeeper = Session::reserved_id(1);
    let first = session.next_global_id();
    assert!(timekeeper < first);
    assert!(timekeeper.is_reserved());
    assert!(!first.is_reserved());
}

#[test]
fn unregistering_deletes_the_remote_objects() {
    let (mut session, seen) = recording_session();
    let id = session.next_global_id();
    session.register_proxy(sphere_proxy(id, Location::DATA_SERVER));
    session.create_proxy_objects(id).unwrap();

    session.unregister_proxy(id).unwrap();
    assert!(!session.is_registered(id));

    let calls = common::recorded_calls(&seen.borrow());
    assert_eq!(calls.last().unwrap().1, "Delete");
}

#[test]
fn claimed_ids_are_never_reallocated() {
    let (mut session, _) = recording_session();
    let adopted = GlobalId::from_value(5000);
    session.claim_id(adopted);
    let next = session.next_global_id();
    assert!(next > adopted);
}
