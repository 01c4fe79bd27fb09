use super::sink::fade_out_volume;
use super::thread::LoadSlot;

#[test]
fn load_slot_only_accepts_latest_request() {
    let mut slot = LoadSlot::default();
    slot.request(1);
    slot.request(2);

    assert!(!slot.accept(1));
    assert_eq!(slot.loaded(), None);
    assert!(slot.accept(2));
    assert_eq!(slot.loaded(), Some(2));

    // a duplicate delivery is not accepted twice
    assert!(!slot.accept(2));
    assert_eq!(slot.loaded(), Some(2));
}

#[test]
fn load_slot_clear_drops_pending_download() {
    let mut slot = LoadSlot::default();
    slot.request(5);
    slot.clear();
    assert!(!slot.accept(5));
    assert_eq!(slot.loaded(), None);
}

#[test]
fn fade_out_volume_is_linear_and_clamped() {
    assert_eq!(fade_out_volume(0, 4), 1.0);
    assert_eq!(fade_out_volume(2, 4), 0.5);
    assert_eq!(fade_out_volume(4, 4), 0.0);
    assert_eq!(fade_out_volume(9, 4), 0.0);
    assert_eq!(fade_out_volume(1, 0), 0.0);
}
