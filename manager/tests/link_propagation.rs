mod common;

use common::{recorded_calls, recording_session, sphere_proxy};
use vizsync_manager::{
    CameraLink, GlobalId, Link, LinkDirection, LinkRegistry, Location, Property,
    PropertyDefinition, PropertyLink, Proxy, ProxyLink, Session, Variant,
};

fn radius_of(session: &Session, id: GlobalId) -> Variant {
    session
        .proxy(id)
        .unwrap()
        .property("Radius")
        .unwrap()
        .as_value()
        .unwrap()
        .elements()[0]
        .clone()
}

fn ready_sphere(session: &mut Session, location: Location) -> GlobalId {
    let id = session.next_global_id();
    session.register_proxy(sphere_proxy(id, location));
    session.create_proxy_objects(id).unwrap();
    session.update_proxy(id).unwrap();
    id
}

#[test]
fn bidirectional_links_settle_in_one_cascade() {
    let (mut session, _) = recording_session();
    let a = ready_sphere(&mut session, Location::DATA_SERVER);
    let b = ready_sphere(&mut session, Location::DATA_SERVER);

    let mut link = ProxyLink::new();
    link.add_endpoint(a, LinkDirection::InputOutput);
    link.add_endpoint(b, LinkDirection::InputOutput);
    let mut links = LinkRegistry::new();
    links.register("spheres", Link::Proxy(link));

    session
        .proxy_mut(a)
        .unwrap()
        .property_mut("Radius")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_element(0, Variant::Float64(6.0))
        .unwrap();
    links
        .notify_property_modified(&mut session, a, "Radius")
        .unwrap();

    assert_eq!(radius_of(&session, a), Variant::Float64(6.0));
    assert_eq!(radius_of(&session, b), Variant::Float64(6.0));
    // The copy is staged, not pushed.
    assert!(session.proxy(b).unwrap().has_modified_properties());
}

#[test]
fn chained_links_carry_values_transitively() {
    let (mut session, _) = recording_session();
    let a = ready_sphere(&mut session, Location::DATA_SERVER);
    let b = ready_sphere(&mut session, Location::DATA_SERVER);
    let c = ready_sphere(&mut session, Location::DATA_SERVER);

    let mut links = LinkRegistry::new();
    let mut first = ProxyLink::new();
    first.add_endpoint(a, LinkDirection::Input);
    first.add_endpoint(b, LinkDirection::Output);
    links.register("a-to-b", Link::Proxy(first));
    let mut second = ProxyLink::new();
    second.add_endpoint(b, LinkDirection::Input);
    second.add_endpoint(c, LinkDirection::Output);
    links.register("b-to-c", Link::Proxy(second));

    session
        .proxy_mut(a)
        .unwrap()
        .property_mut("Radius")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_element(0, Variant::Float64(2.0))
        .unwrap();
    links
        .notify_property_modified(&mut session, a, "Radius")
        .unwrap();

    assert_eq!(radius_of(&session, c), Variant::Float64(2.0));
}

#[test]
fn property_links_join_differently_named_properties() {
    let (mut session, _) = recording_session();
    let a = ready_sphere(&mut session, Location::DATA_SERVER);

    let b = session.next_global_id();
    let mut other = Proxy::new(b, "ConeSource", "sources", "Cone", Location::DATA_SERVER);
    other.add_property(
        Property::from_definition(&PropertyDefinition::value(
            "Height",
            "SetHeight",
            vec![Variant::Float64(1.0)],
        ))
        .expect("valid definition"),
    );
    session.register_proxy(other);
    session.create_proxy_objects(b).unwrap();
    session.update_proxy(b).unwrap();

    let mut link = PropertyLink::new();
    link.add_endpoint(a, "Radius", LinkDirection::Input);
    link.add_endpoint(b, "Height", LinkDirection::Output);
    let mut links = LinkRegistry::new();
    links.register("radius-to-height", Link::Property(link));

    session
        .proxy_mut(a)
        .unwrap()
        .property_mut("Radius")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_element(0, Variant::Float64(3.0))
        .unwrap();
    links
        .notify_property_modified(&mut session, a, "Radius")
        .unwrap();

    let height = session
        .proxy(b)
        .unwrap()
        .property("Height")
        .unwrap()
        .as_value()
        .unwrap()
        .elements()[0]
        .clone();
    assert_eq!(height, Variant::Float64(3.0));
}

#[test]
fn opposite_direction_links_never_write_back_to_the_origin() {
    let (mut session, _) = recording_session();
    let a = ready_sphere(&mut session, Location::DATA_SERVER);
    let b = ready_sphere(&mut session, Location::DATA_SERVER);

    let mut forward = PropertyLink::new();
    forward.add_endpoint(a, "Radius", LinkDirection::Input);
    forward.add_endpoint(b, "Radius", LinkDirection::Output);
    let mut backward = PropertyLink::new();
    backward.add_endpoint(b, "Radius", LinkDirection::Input);
    backward.add_endpoint(a, "Radius", LinkDirection::Output);
    let mut links = LinkRegistry::new();
    links.register("forward", Link::Property(forward));
    links.register("backward", Link::Property(backward));

    session
        .proxy_mut(a)
        .unwrap()
        .property_mut("Radius")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_element(0, Variant::Float64(4.0))
        .unwrap();
    session.update_proxy(a).unwrap();
    links
        .notify_property_modified(&mut session, a, "Radius")
        .unwrap();

    assert_eq!(radius_of(&session, b), Variant::Float64(4.0));
    assert!(session.proxy(b).unwrap().has_modified_properties());
    // The backward link saw the copy land in b, but a is the origin and
    // stays untouched.
    assert!(!session.proxy(a).unwrap().has_modified_properties());
}

fn view_proxy(id: GlobalId) -> Proxy {
    let mut proxy = Proxy::new(id, "RenderView", "views", "RenderView", Location::RENDER_SERVER);
    for name in ["CameraPosition", "CameraFocalPoint", "CameraViewUp"] {
        proxy.add_property(
            Property::from_definition(&PropertyDefinition::value(
                name,
                &format!("Set{}", name),
                vec![
                    Variant::Float64(0.0),
                    Variant::Float64(0.0),
                    Variant::Float64(0.0),
                ],
            ))
            .expect("valid definition"),
        );
    }
    proxy
}

#[test]
fn camera_links_copy_the_camera_and_re_render_the_other_views() {
    let (mut session, seen) = recording_session();

    let view_a = session.next_global_id();
    session.register_proxy(view_proxy(view_a));
    session.create_proxy_objects(view_a).unwrap();
    session.update_proxy(view_a).unwrap();
    let view_b = session.next_global_id();
    session.register_proxy(view_proxy(view_b));
    session.create_proxy_objects(view_b).unwrap();
    session.update_proxy(view_b).unwrap();

    let mut camera = CameraLink::new();
    camera.add_endpoint(view_a, LinkDirection::InputOutput);
    camera.add_endpoint(view_b, LinkDirection::InputOutput);
    let mut links = LinkRegistry::new();
    links.register("cameras", Link::Camera(camera));

    session
        .proxy_mut(view_a)
        .unwrap()
        .property_mut("CameraPosition")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_elements(vec![
            Variant::Float64(1.0),
            Variant::Float64(2.0),
            Variant::Float64(3.0),
        ])
        .unwrap();
    let before = seen.borrow().len();
    links
        .notify_property_modified(&mut session, view_a, "CameraPosition")
        .unwrap();

    let position = session
        .proxy(view_b)
        .unwrap()
        .property("CameraPosition")
        .unwrap()
        .as_value()
        .unwrap()
        .elements()
        .to_vec();
    assert_eq!(
        position,
        vec![
            Variant::Float64(1.0),
            Variant::Float64(2.0),
            Variant::Float64(3.0),
        ]
    );

    let native_b = session.proxy(view_b).unwrap().native_id().unwrap();
    let native_a = session.proxy(view_a).unwrap().native_id().unwrap();
    let renders: Vec<GlobalId> = recorded_calls(&seen.borrow()[before..])
        .into_iter()
        .filter(|(_, method)| method == "StillRender")
        .map(|(target, _)| target)
        .collect();
    // Exactly one re-render, on the receiving view only.
    assert_eq!(renders, vec![native_b]);
    assert_ne!(native_a, native_b);
}

#[test]
fn broken_links_stop_firing_after_unregistration() {
    let (mut session, _) = recording_session();
    let a = ready_sphere(&mut session, Location::DATA_SERVER);
    let b = ready_sphere(&mut session, Location::DATA_SERVER);

    let mut link = ProxyLink::new();
    link.add_endpoint(a, LinkDirection::Input);
    link.add_endpoint(b, LinkDirection::Output);
    let mut links = LinkRegistry::new();
    links.register("spheres", Link::Proxy(link));
    assert!(links.unregister("spheres").is_some());

    session
        .proxy_mut(a)
        .unwrap()
        .property_mut("Radius")
        .unwrap()
        .as_value_mut()
        .unwrap()
        .set_element(0, Variant::Float64(9.0))
        .unwrap();
    links
        .notify_property_modified(&mut session, a, "Radius")
        .unwrap();
    assert_eq!(radius_of(&session, b), Variant::Float64(1.0));
}
