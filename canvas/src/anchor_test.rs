use super::*;

fn transform() -> ViewTransform {
    ViewTransform::new(100.0, 50.0, 200.0, 10.0, 1000.0)
}

#[test]
fn capture_binds_screen_and_view() {
    let a = GestureAnchor::capture(Contact::touch(3, Point::new(200.0, 150.0)), &transform());
    assert_eq!(a.id(), Some(ContactId(3)));
    assert_eq!(a.screen(), Point::new(200.0, 150.0));
    assert_eq!(a.view(), Point::new(0.5, 0.5));
}

#[test]
fn mouse_anchor_has_no_id() {
    let a = GestureAnchor::capture(Contact::mouse(Point::new(0.0, 0.0)), &transform());
    assert_eq!(a.id(), None);
}

#[test]
fn moved_to_keeps_view_and_id() {
    let a = GestureAnchor::capture(Contact::touch(1, Point::new(100.0, 50.0)), &transform());
    let b = a.moved_to(Point::new(400.0, 300.0));
    assert_eq!(b.id(), a.id());
    assert_eq!(b.view(), a.view());
    assert_eq!(b.screen(), Point::new(400.0, 300.0));
}

#[test]
fn midpoint_is_synthetic_and_halfway() {
    let t = transform();
    let a = GestureAnchor::capture(Contact::touch(1, Point::new(100.0, 50.0)), &t);
    let b = GestureAnchor::capture(Contact::touch(2, Point::new(300.0, 250.0)), &t);
    let m = GestureAnchor::midpoint(a, b);
    assert_eq!(m.id(), None);
    assert_eq!(m.screen(), Point::new(200.0, 150.0));
    assert_eq!(m.view(), Point::new(0.5, 0.5));
}

#[test]
fn find_in_matches_by_id_only() {
    let a = GestureAnchor::capture(Contact::touch(7, Point::new(0.0, 0.0)), &transform());
    let reported = [Contact::touch(2, Point::new(1.0, 1.0)), Contact::touch(7, Point::new(9.0, 9.0))];
    assert_eq!(a.find_in(&reported), Some(Contact::touch(7, Point::new(9.0, 9.0))));
    assert_eq!(a.find_in(&reported[..1]), None);
}

#[test]
fn mouse_anchor_tracks_mouse_contact() {
    let a = GestureAnchor::capture(Contact::mouse(Point::new(0.0, 0.0)), &transform());
    assert!(a.tracks(&Contact::mouse(Point::new(5.0, 5.0))));
    assert!(!a.tracks(&Contact::touch(0, Point::new(5.0, 5.0))));
}
