/// End-to-end lifecycle tests
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use habit_streak_engine::*;

/// Wednesday 2024-03-13 09:00 UTC
fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap()
}

struct Fixture {
    engine: HabitLifecycle<Arc<MemoryStore>, FixedClock>,
    store: Arc<MemoryStore>,
    clock: FixedClock,
    owner: OwnerId,
}

fn fixture(config: EngineConfig) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let clock = FixedClock::new(start());
    let engine = HabitLifecycle::new(store.clone(), clock.clone(), config)
        .expect("Failed to create lifecycle");
    Fixture {
        engine,
        store,
        clock,
        owner: OwnerId::new(),
    }
}

async fn seed(fixture: &Fixture, name: &str, pattern: &str) -> Habit {
    let habit = Habit::new(
        fixture.owner.clone(),
        name.to_string(),
        pattern.to_string(),
        fixture.clock.now(),
    )
    .expect("Failed to build habit");
    fixture
        .store
        .insert_habit(&habit)
        .await
        .expect("Failed to insert habit");
    habit
}

#[tokio::test]
async fn test_activate_checkin_miss_and_reactivate() {
    let f = fixture(EngineConfig::default());
    let habit = seed(&f, "Journal", "daily").await;

    // Activate: window is today
    let active = f.engine.activate(&f.owner, &habit.id).await.unwrap();
    assert!(active.status);
    assert!(active.is_consistent());
    assert_eq!(active.start_date, Some(Utc.with_ymd_and_hms(2024, 3, 13, 0, 0, 0).unwrap()));

    // Three daily check-ins, one per day
    let mut current = active;
    for _ in 0..3 {
        let before = current.clone();
        current = f.engine.checkin(&f.owner, &habit.id).await.unwrap();
        assert!(current.last_level > before.last_level);
        assert_eq!(current.streak, before.streak + 1);
        f.clock.advance(Duration::days(1));
    }
    assert_eq!(current.streak, 3);
    assert_eq!(current.last_level, 3);

    // Skip two days: the window lapses and the sweep breaks the streak
    f.clock.advance(Duration::days(2));
    let report = f.engine.sweep_missed(&f.owner).await.unwrap();
    assert_eq!(report.broken, vec![habit.id.clone()]);

    let broken = f.store.get(&habit.id).await.unwrap();
    assert_eq!(broken.state(), HabitState::Inactive);
    assert_eq!(broken.streak, 0);
    assert_eq!(broken.last_level, 0);
    assert_eq!(broken.last_streak, 3);
    assert_eq!(broken.streak_breaks, 1);
    assert_eq!(broken.bucket(f.clock.now()), HabitBucket::Broken);

    // Reactivate and start over
    let revived = f.engine.activate(&f.owner, &habit.id).await.unwrap();
    assert!(revived.status);
    assert_eq!(revived.streak, 0);
    assert_eq!(revived.last_streak, 3);
    assert_eq!(revived.bucket(f.clock.now()), HabitBucket::Today);
}

#[tokio::test]
async fn test_sweep_scenario_from_lapsed_window() {
    let f = fixture(EngineConfig::default());
    let habit = seed(&f, "Run", "every 2 days").await;

    // Put the habit in an active state whose window ended yesterday
    let patch = HabitPatch {
        status: Some(true),
        start_date: Some(Some(start() - Duration::days(2))),
        end_date: Some(Some(start() - Duration::days(1))),
        streak: Some(5),
        last_streak: Some(3),
        last_level: Some(5),
        ..HabitPatch::default()
    };
    f.store.update_habit(&habit.id, 0, patch).await.unwrap();

    f.engine.sweep_missed(&f.owner).await.unwrap();

    let swept = f.store.get(&habit.id).await.unwrap();
    assert_eq!(swept.last_streak, 5);
    assert_eq!(swept.streak, 0);
    assert!(!swept.status);
    assert_eq!(swept.streak_breaks, 1);

    // Running it again is a no-op
    let again = f.engine.sweep_missed(&f.owner).await.unwrap();
    assert!(again.broken.is_empty());
    assert_eq!(f.store.get(&habit.id).await.unwrap(), swept);
}

#[tokio::test]
async fn test_operations_are_owner_scoped() {
    let f = fixture(EngineConfig::default());
    let habit = seed(&f, "Floss", "daily").await;
    let stranger = OwnerId::new();

    assert!(matches!(
        f.engine.checkin(&stranger, &habit.id).await,
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        f.engine.activate(&stranger, &habit.id).await,
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        f.engine.checkin(&f.owner, &HabitId::new()).await,
        Err(EngineError::NotFound { .. })
    ));

    // Sweeping another owner never touches this habit
    f.engine.activate(&f.owner, &habit.id).await.unwrap();
    f.clock.advance(Duration::days(3));
    let report = f.engine.sweep_missed(&stranger).await.unwrap();
    assert!(report.broken.is_empty());
    assert!(f.store.get(&habit.id).await.unwrap().status);
}

#[tokio::test]
async fn test_invalid_stored_pattern_is_rejected() {
    let f = fixture(EngineConfig::default());
    let mut habit = seed(&f, "Swim", "daily").await;

    // A record edited outside the engine can carry a bad pattern
    habit.id = HabitId::new();
    habit.repeat_pattern = "whenever I feel like it".to_string();
    f.store.insert_habit(&habit).await.unwrap();

    let result = f.engine.activate(&f.owner, &habit.id).await;
    match result {
        Err(EngineError::InvalidPattern { pattern, .. }) => {
            assert_eq!(pattern, "whenever I feel like it")
        }
        other => panic!("expected InvalidPattern, got {:?}", other.map(|h| h.id)),
    }
    assert_eq!(f.store.get(&habit.id).await.unwrap().version, 0);
}

#[tokio::test]
async fn test_utc_offset_moves_day_boundaries() {
    let config = EngineConfig {
        utc_offset_minutes: -5 * 60,
        ..EngineConfig::default()
    };
    let f = fixture(config);
    let habit = seed(&f, "Stretch", "daily").await;

    // 2024-03-13 03:00 UTC is still March 12th at UTC-5
    f.clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 3, 0, 0).unwrap());
    let active = f.engine.activate(&f.owner, &habit.id).await.unwrap();

    assert_eq!(active.start_date, Some(Utc.with_ymd_and_hms(2024, 3, 12, 5, 0, 0).unwrap()));
    assert_eq!(active.end_date, Some(Utc.with_ymd_and_hms(2024, 3, 13, 5, 0, 0).unwrap()));
}

#[tokio::test]
async fn test_overview_never_shows_lapsed_habit_as_current() {
    let f = fixture(EngineConfig::default());
    let daily = seed(&f, "Water plants", "daily").await;
    let weekly = seed(&f, "Call family", "weekly on sun").await;
    let idle = seed(&f, "Learn piano", "3 times per week").await;

    f.engine.activate(&f.owner, &daily.id).await.unwrap();
    f.engine.activate(&f.owner, &weekly.id).await.unwrap();

    // Thursday: the daily window from Wednesday is gone, Sunday is ahead
    f.clock.advance(Duration::days(1));
    let overview = f.engine.overview(&f.owner).await.unwrap();

    assert!(overview.today.is_empty());
    assert_eq!(overview.tomorrow.len(), 1);
    assert_eq!(overview.tomorrow[0].id, weekly.id);
    assert_eq!(overview.broken.len(), 1);
    assert_eq!(overview.broken[0].id, daily.id);
    assert_eq!(overview.idle.len(), 1);
    assert_eq!(overview.idle[0].id, idle.id);
}

#[test]
fn test_engine_usable_from_sync_code() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(start());
    let habit = Habit::new(OwnerId::new(), "Walk".to_string(), "weekdays".to_string(), start())
        .unwrap();

    tokio_test::block_on(store.insert_habit(&habit)).unwrap();
    let engine = HabitLifecycle::new(store, clock, EngineConfig::default()).unwrap();

    let updated = tokio_test::block_on(engine.checkin(&habit.owner_id, &habit.id)).unwrap();
    // Wednesday check-in -> Thursday window
    assert_eq!(updated.start_date, Some(Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap()));
    assert_eq!(updated.streak, 1);
}
