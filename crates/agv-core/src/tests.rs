//! Unit tests for agv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, TaskId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(TaskId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display_is_one_based_and_padded() {
        assert_eq!(AgentId(0).to_string(), "AGV-001");
        assert_eq!(TaskId(9).to_string(), "TASK-010");
        assert_eq!(TaskId(1233).to_string(), "TASK-1234");
    }
}

#[cfg(test)]
mod coord {
    use crate::Coord;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Coord::new(1, 1);
        let b = Coord::new(10, 4);
        assert_eq!(a.manhattan(b), 12);
        assert_eq!(b.manhattan(a), 12);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn adjacency_excludes_diagonals() {
        let c = Coord::new(5, 5);
        assert!(c.is_adjacent(Coord::new(5, 4)));
        assert!(c.is_adjacent(Coord::new(6, 5)));
        assert!(!c.is_adjacent(Coord::new(6, 6)));
        assert!(!c.is_adjacent(c));
    }

    #[test]
    fn ordering_is_row_major() {
        // Lower row wins even with a larger column.
        assert!(Coord::new(9, 0) < Coord::new(0, 1));
        assert!(Coord::new(2, 3) < Coord::new(3, 3));
        let mut v = vec![Coord::new(1, 2), Coord::new(0, 2), Coord::new(5, 0)];
        v.sort();
        assert_eq!(v, vec![Coord::new(5, 0), Coord::new(0, 2), Coord::new(1, 2)]);
    }
}

#[cfg(test)]
mod time {
    use std::time::Duration;

    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(7)), 0);
    }

    #[test]
    fn interval_multiples_skip_zero() {
        assert!(!Tick(0).is_multiple_of(60));
        assert!(Tick(60).is_multiple_of(60));
        assert!(Tick(120).is_multiple_of(60));
        assert!(!Tick(61).is_multiple_of(60));
        assert!(!Tick(60).is_multiple_of(0));
    }

    #[test]
    fn clock_elapsed_and_display() {
        let mut clock = SimClock::new(1);
        for _ in 0..3_725 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_secs(), 3_725);
        assert_eq!(clock.elapsed_hms(), (1, 2, 5));
        assert_eq!(clock.to_string(), "T3725 (01:02:05)");
    }

    #[test]
    fn speed_scales_wall_interval_only() {
        let mut clock = SimClock::new(1);
        assert_eq!(clock.wall_interval(), Duration::from_millis(1_000));
        clock.set_speed(4.0).unwrap();
        assert_eq!(clock.wall_interval(), Duration::from_millis(250));
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 1);
    }

    #[test]
    fn invalid_speed_rejected_and_state_kept() {
        let mut clock = SimClock::new(1);
        clock.set_speed(2.0).unwrap();
        assert!(clock.set_speed(0.0).is_err());
        assert!(clock.set_speed(f64::NAN).is_err());
        assert!(clock.set_speed(1_000.0).is_err());
        assert_eq!(clock.speed(), 2.0);
    }

    #[test]
    fn ticks_for_hours_rounds_up() {
        let clock = SimClock::new(7);
        assert_eq!(clock.ticks_for_hours(1), 515); // 3600 / 7 = 514.28…
        assert_eq!(SimClock::new(1).ticks_for_hours(24), 86_400);
        assert_eq!(SimClock::new(1).ticks_for_hours(u64::MAX), u64::MAX);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn agent_rng_is_deterministic() {
        let mut a = AgentRng::new(42, AgentId(3));
        let mut b = AgentRng::new(42, AgentId(3));
        let xs: Vec<f64> = (0..8).map(|_| a.gen_range(85.0..=100.0)).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.gen_range(85.0..=100.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn agents_get_distinct_streams() {
        let mut a = AgentRng::new(42, AgentId(0));
        let mut b = AgentRng::new(42, AgentId(1));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn choose_pair_is_distinct() {
        let mut rng = SimRng::new(7);
        let items = [1, 2, 3];
        for _ in 0..200 {
            let (a, b) = rng.choose_pair(&items).unwrap();
            assert_ne!(a, b);
        }
        assert!(rng.choose_pair(&[1]).is_none());
        assert!(rng.choose::<u8>(&[]).is_none());
    }

    #[test]
    fn gen_bool_clamps() {
        let mut rng = SimRng::new(1);
        assert!(rng.gen_bool(2.0));
        assert!(!rng.gen_bool(-1.0));
    }
}

#[cfg(test)]
mod event {
    use crate::{EventLog, Severity, Tick};

    #[test]
    fn take_new_advances_cursor() {
        let mut log = EventLog::new();
        log.info(Tick(1), "started");
        log.warn(Tick(2), "low battery");
        let first = log.take_new();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].severity, Severity::Warning);
        assert!(log.take_new().is_empty());

        log.error(Tick(3), "breakdown");
        let second = log.take_new();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].message, "breakdown");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn count_by_severity() {
        let mut log = EventLog::new();
        log.success(Tick(1), "a");
        log.success(Tick(1), "b");
        log.error(Tick(1), "c");
        assert_eq!(log.count(Severity::Success), 2);
        assert_eq!(log.count(Severity::Info), 0);
        log.clear();
        assert!(log.is_empty());
        assert!(log.peek_new().is_empty());
    }
}

#[cfg(test)]
mod error {
    use crate::{check_range, CoreError};

    #[test]
    fn check_range_reports_bounds() {
        assert!(check_range("agent_count", 5u32, 1..=64).is_ok());
        let err = check_range("agent_count", 0u32, 1..=64).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange { what: "agent_count", .. }));
        assert_eq!(err.to_string(), "agent_count must be in 1..=64, got 0");
    }
}
