//! Capture -> persisted log -> playback pipeline.

use std::sync::Arc;
use std::time::Duration;

use glam::DVec3;

use crate::action::{Action, ActorId, BlockPos, ItemPayload, Transform};
use crate::capture::SessionRegistry;
use crate::playback::{PlaybackActor, PlaybackState};
use crate::storage::LogStore;
use crate::test_utils::{BLOCK_ITEM_TAG, RecordingHost, TestActor};

/// Record a session, reload it from disk, and drive a playback actor
/// through every record.
#[test]
fn replay_reproduces_recorded_actions_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = LogStore::new(dir.path(), true);
    let registry = SessionRegistry::new(store.clone(), Duration::from_secs(60));

    let actor = Arc::new(TestActor::new(Some(Transform::new(
        DVec3::new(0.0, 64.0, 0.0),
        0.0,
        0.0,
    ))));
    let session = registry
        .start_session(ActorId(1), "scene", actor)
        .unwrap();

    session.record_action_at(
        0,
        Action::Chat {
            message: "action!".to_string(),
        },
    );
    session.record_action_at(2, Action::Swipe);
    session.record_action_at(
        4,
        Action::Equip {
            slot: 0,
            item: Some(ItemPayload::from_bytes(vec![BLOCK_ITEM_TAG, 2])),
        },
    );
    session.record_action_at(
        6,
        Action::PlaceBlock {
            item: ItemPayload::from_bytes(vec![BLOCK_ITEM_TAG, 2]),
            position: BlockPos::new(3, 64, 3),
        },
    );
    session.record_action_at(8, Action::ShootArrow { charge: 20 });
    registry.stop_session(ActorId(1)).unwrap();

    let (log, _) = store.load("scene").unwrap();

    let mut playback = PlaybackActor::new("Double", 42);
    let mut host = RecordingHost::default();
    playback.enqueue_all(log.into_records());
    assert_eq!(playback.state(), PlaybackState::Animating);

    // One record per tick; five records drain in five ticks.
    for _ in 0..5 {
        playback.tick(&mut host);
    }

    assert_eq!(
        host.chats,
        vec![("Double".to_string(), "action!".to_string())]
    );
    assert_eq!(host.swings, 1);
    assert_eq!(host.equips, vec![(0, Some(vec![BLOCK_ITEM_TAG, 2]))]);
    assert_eq!(
        host.placed,
        vec![(vec![BLOCK_ITEM_TAG, 2], BlockPos::new(3, 64, 3))]
    );
    assert_eq!(host.arrows.len(), 1);
    assert_eq!(host.arrows[0].3, 2.0);
    assert_eq!(playback.state(), PlaybackState::Idle);
}

/// Recorded pose samples move the playback actor along the captured path.
#[test]
fn replayed_poses_drive_motion() {
    let dir = tempfile::tempdir().unwrap();
    let store = LogStore::new(dir.path(), false);
    let registry = SessionRegistry::new(store.clone(), Duration::from_millis(2));

    let actor = Arc::new(TestActor::new(Some(Transform::new(
        DVec3::new(0.0, 64.0, 0.0),
        0.0,
        0.0,
    ))));
    let session = registry
        .start_session(ActorId(2), "walk", actor.clone())
        .unwrap();

    while session.current_tick() < 2 {
        std::thread::sleep(Duration::from_millis(2));
    }
    let destination = Transform::new(DVec3::new(6.0, 64.0, -2.0), 45.0, 5.0);
    actor.set_transform(destination);
    while session.current_tick() < 6 {
        std::thread::sleep(Duration::from_millis(2));
    }
    registry.stop_session(ActorId(2)).unwrap();

    let (log, _) = store.load("walk").unwrap();
    assert!(log.len() >= 6);

    let mut playback = PlaybackActor::new("Double", 7);
    let mut host = RecordingHost::default();
    playback.enqueue_all(log.into_records());

    // Drain the queue, then let the last interpolation window finish.
    while playback.queue_len() > 0 {
        playback.tick(&mut host);
    }
    for _ in 0..playback.pose_window() {
        playback.tick(&mut host);
    }

    assert_eq!(playback.position(), destination.position);
    assert_eq!(playback.yaw(), destination.yaw);
    assert_eq!(playback.pitch(), destination.pitch);
    // Pose records never reach the discrete dispatch switch.
    assert_eq!(host.swings, 0);
    assert!(host.chats.is_empty());
}

/// A corrupt item payload in a loaded log skips its side effect but the
/// rest of the replay continues.
#[test]
fn corrupt_record_recovery_continues_replay() {
    let mut playback = PlaybackActor::new("Double", 3);
    let mut host = RecordingHost {
        reject_items: true,
        ..Default::default()
    };

    playback.enqueue_all([
        crate::action::ActionRecord {
            tick: 0,
            action: Action::Drop {
                item: ItemPayload::from_bytes(vec![9]),
            },
        },
        crate::action::ActionRecord {
            tick: 1,
            action: Action::Chat {
                message: "still here".to_string(),
            },
        },
    ]);

    playback.tick(&mut host);
    playback.tick(&mut host);

    assert!(host.spawned_items.is_empty());
    assert_eq!(host.chats.len(), 1);
}
