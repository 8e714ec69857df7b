#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

#[test]
fn frames_are_addressed_by_depth() {
    let outer = Env::empty().push_values(smallvec![Value::Long(1), Value::Long(2)]);
    let inner = outer.push_values(smallvec![Value::Long(3)]);

    assert_eq!(inner.value(0, 0), Some(&Value::Long(3)));
    assert_eq!(inner.value(1, 1), Some(&Value::Long(2)));
    assert_eq!(inner.value(2, 0), None);
    assert_eq!(inner.depth(), 2);
    // Pushing never changes the parent chain.
    assert_eq!(outer.depth(), 1);
}

#[test]
fn group_frames_hold_lazy_slots() {
    let env = Env::empty().push_group(OpId::new(7), 2, Vec::new().into());
    let frame = env.frame(0).unwrap();
    let group = frame.group().unwrap();

    assert_eq!(group.op(), OpId::new(7));
    assert_eq!(group.len(), 2);
    assert!(env.value(0, 0).is_none());
    assert_eq!(group.slot(0).unwrap().state(), SlotState::Pending);
}

#[test]
fn slot_cells_are_written_once() {
    let cell = SlotCell::new();
    assert_eq!(cell.claim(), Claim::Evaluate { owner: true });
    assert_eq!(cell.claim(), Claim::Cycle);

    assert_eq!(cell.fill(Value::Long(1)), Value::Long(1));
    assert_eq!(cell.fill(Value::Long(2)), Value::Long(1));
    assert_eq!(cell.claim(), Claim::Ready(Value::Long(1)));
}

#[test]
fn released_slots_can_be_retried() {
    let cell = SlotCell::new();
    assert_eq!(cell.claim(), Claim::Evaluate { owner: true });
    cell.release();
    assert_eq!(cell.state(), SlotState::Pending);
    assert_eq!(cell.claim(), Claim::Evaluate { owner: true });
}

#[test]
fn other_threads_evaluate_independently() {
    let cell = std::sync::Arc::new(SlotCell::new());
    assert_eq!(cell.claim(), Claim::Evaluate { owner: true });

    let remote = std::sync::Arc::clone(&cell);
    let claim = std::thread::spawn(move || remote.claim()).join().unwrap();
    assert_eq!(claim, Claim::Evaluate { owner: false });
}
