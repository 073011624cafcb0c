//! Unit tests for agv-fleet.

#[cfg(test)]
mod helpers {
    use agv_core::{AgentId, Coord};

    use crate::Agent;

    pub fn c(x: u32, y: u32) -> Coord {
        Coord::new(x, y)
    }

    pub fn agent(battery: f64) -> Agent {
        Agent::new(AgentId(0), c(1, 1), battery)
    }
}

// ── Agent state machine ───────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use super::helpers::{agent, c};
    use agv_core::TaskId;

    use crate::{AgentState, AgentStatus, Errand, FleetError, MaintenanceCause};

    #[test]
    fn battery_clamped_on_construction() {
        assert_eq!(agent(140.0).battery(), 100.0);
        assert_eq!(agent(-3.0).battery(), 0.0);
    }

    #[test]
    fn assign_then_drive_then_complete() {
        let mut a = agent(90.0);
        a.assign(TaskId(4), vec![c(2, 1), c(3, 1)], false).unwrap();
        assert_eq!(a.status(), AgentStatus::Active);
        assert_eq!(a.current_task(), Some(TaskId(4)));
        assert_eq!(a.destination(), Some(c(3, 1)));

        assert_eq!(a.step(), Some(c(2, 1)));
        assert_eq!(a.route_progress(), 50.0);
        assert!(a.complete_errand().is_err(), "route not exhausted yet");
        assert_eq!(a.step(), Some(c(3, 1)));
        assert_eq!(a.step(), None);
        assert_eq!(a.position, c(3, 1));

        assert_eq!(a.complete_errand().unwrap(), TaskId(4));
        assert_eq!(a.state(), AgentState::Idle);
    }

    #[test]
    fn busy_agent_rejects_second_task() {
        let mut a = agent(90.0);
        a.assign(TaskId(0), vec![c(2, 1)], false).unwrap();
        let err = a.assign(TaskId(1), vec![c(1, 2)], false).unwrap_err();
        assert!(matches!(err, FleetError::InvalidTransition { from: AgentStatus::Active, .. }));
        assert_eq!(a.current_task(), Some(TaskId(0)));
    }

    #[test]
    fn loading_flag() {
        let mut a = agent(90.0);
        a.assign(TaskId(0), vec![c(2, 1)], false).unwrap();
        assert!(!a.is_loaded());
        a.load();
        assert!(a.is_loaded());
        assert_eq!(a.state(), AgentState::Active(Errand::Task { task: TaskId(0), loaded: true }));
    }

    #[test]
    fn charging_trip_interrupts_task() {
        let mut a = agent(14.0);
        a.assign(TaskId(2), vec![c(2, 1), c(3, 1)], false).unwrap();
        let interrupted = a.begin_charging_trip(vec![c(1, 2)]).unwrap();
        assert_eq!(interrupted, Some(TaskId(2)));
        assert!(a.is_charging_trip());
        assert_eq!(a.current_task(), None);
        assert!(a.begin_charging_trip(vec![]).is_err(), "already heading to a charger");

        assert!(a.start_charging().is_err(), "not parked yet");
        a.step();
        a.start_charging().unwrap();
        assert_eq!(a.status(), AgentStatus::Charging);
        assert!(a.step().is_none(), "charging agents do not move");
        a.finish_charging().unwrap();
        assert_eq!(a.status(), AgentStatus::Idle);
    }

    #[test]
    fn break_down_from_every_operational_state() {
        let mut idle = agent(50.0);
        assert_eq!(idle.break_down(MaintenanceCause::Breakdown), None);

        let mut busy = agent(50.0);
        busy.assign(TaskId(7), vec![c(2, 1)], true).unwrap();
        assert_eq!(busy.break_down(MaintenanceCause::BatteryDepleted), Some(TaskId(7)));
        assert!(busy.path().is_empty());
        assert_eq!(busy.state(), AgentState::Maintenance(MaintenanceCause::BatteryDepleted));

        let mut charging = agent(50.0);
        charging.start_charging().unwrap();
        charging.break_down(MaintenanceCause::Breakdown);
        assert!(!charging.is_operational());

        // Maintenance is terminal.
        assert_eq!(busy.break_down(MaintenanceCause::Breakdown), None);
        assert_eq!(busy.state(), AgentState::Maintenance(MaintenanceCause::BatteryDepleted));
        assert!(busy.assign(TaskId(8), vec![], false).is_err());
        assert!(busy.begin_charging_trip(vec![]).is_err());
    }

    #[test]
    fn reroute_keeps_errand_and_progress_base() {
        let mut a = agent(90.0);
        a.assign(TaskId(1), vec![c(2, 1), c(3, 1), c(4, 1), c(5, 1)], false).unwrap();
        a.step();
        a.reroute(vec![c(2, 2), c(3, 2), c(4, 2), c(5, 2), c(5, 1)]).unwrap();
        assert_eq!(a.current_task(), Some(TaskId(1)));
        assert!((a.route_progress() - 100.0 / 6.0).abs() < 1e-9);
        assert!(agent(90.0).reroute(vec![]).is_err(), "idle agents have no route");
    }

    #[test]
    fn battery_bounds() {
        let mut a = agent(0.3);
        assert_eq!(a.drain(0.2), 0.3 - 0.2);
        assert_eq!(a.drain(0.2), 0.0);
        let mut b = agent(99.8);
        assert_eq!(b.charge(0.5), 100.0);
    }

    #[test]
    fn battery_spike_floors() {
        let mut a = agent(60.0);
        assert_eq!(a.battery_spike(20.0, 5.0), 40.0);
        let mut b = agent(12.0);
        assert_eq!(b.battery_spike(20.0, 5.0), 5.0);
        let mut low = agent(3.0);
        assert_eq!(low.battery_spike(20.0, 5.0), 3.0, "never raises the level");
    }

    #[test]
    fn availability_threshold_is_strict() {
        assert!(!agent(20.0).is_available(20.0));
        assert!(agent(20.5).is_available(20.0));
    }

    #[test]
    fn abandon_hands_back_task() {
        let mut a = agent(60.0);
        assert!(a.abandon_errand().is_err(), "idle has nothing to abandon");
        a.assign(TaskId(2), vec![c(2, 1), c(3, 1)], true).unwrap();
        assert_eq!(a.abandon_errand().unwrap(), Some(TaskId(2)));
        assert_eq!(a.state(), AgentState::Idle);
        assert!(a.path().is_empty());

        a.begin_charging_trip(vec![c(1, 2)]).unwrap();
        assert_eq!(a.abandon_errand().unwrap(), None);
    }
}

// ── Task state machine ────────────────────────────────────────────────────────

#[cfg(test)]
mod task {
    use super::helpers::c;
    use agv_core::{AgentId, TaskId, Tick};

    use crate::{FleetError, Priority, Task, TaskState, TaskStatus};

    fn task() -> Task {
        Task::new(TaskId(0), c(5, 5), c(9, 9), Priority::Medium, Tick(10))
    }

    #[test]
    fn happy_path() {
        let mut t = task();
        t.start_by(AgentId(1), Tick(15)).unwrap();
        assert_eq!(t.assigned_agent(), Some(AgentId(1)));
        assert_eq!(t.wait_ticks(), Some(5));
        t.set_progress(42.0).unwrap();
        assert_eq!(t.progress(), 42.0);
        t.set_progress(100.0).unwrap();
        assert!(t.progress() < 100.0);
        t.complete(Tick(30)).unwrap();
        assert_eq!(t.state(), &TaskState::Completed { agent: AgentId(1), at: Tick(30) });
        assert_eq!(t.progress(), 100.0);
        assert!(t.is_terminal());
    }

    #[test]
    fn interrupt_returns_to_pending() {
        let mut t = task();
        t.start_by(AgentId(0), Tick(11)).unwrap();
        t.interrupt().unwrap();
        assert!(t.is_pending());
        assert_eq!(t.assigned_agent(), None);
        assert_eq!(t.started_at(), None);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn invalid_transitions_rejected() {
        let mut t = task();
        assert!(matches!(
            t.complete(Tick(1)),
            Err(FleetError::TaskTransition { from: TaskStatus::Pending, .. })
        ));
        assert!(t.interrupt().is_err());
        assert!(t.set_progress(10.0).is_err());

        t.start_by(AgentId(0), Tick(11)).unwrap();
        assert!(t.start_by(AgentId(1), Tick(12)).is_err(), "already in progress");
        assert!(t.cancel().is_err());

        t.fail("agent broke down").unwrap();
        assert_eq!(t.status(), TaskStatus::Failed);
        assert!(t.fail("again").is_err());
        assert!(t.start_by(AgentId(1), Tick(13)).is_err());
    }

    #[test]
    fn cancel_only_pending() {
        let mut t = task();
        t.cancel().unwrap();
        assert_eq!(t.status(), TaskStatus::Cancelled);
        assert!(t.is_terminal());
    }

    #[test]
    fn priority_rank_and_points() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::Low.points(), 1.0);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn builders() {
        let t = task().with_deadline(Tick(99)).as_emergency();
        assert_eq!(t.deadline, Some(Tick(99)));
        assert!(t.emergency);
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use super::helpers::c;
    use agv_core::{AgentId, TaskId};

    use crate::{AgentStatus, FleetBuilder, FleetError};

    #[test]
    fn builder_draws_batteries_in_range() {
        let fleet = FleetBuilder::new(20, 7).positions(vec![c(1, 1)]).build().unwrap();
        assert_eq!(fleet.len(), 20);
        for a in fleet.iter() {
            assert!((85.0..=100.0).contains(&a.battery()));
            assert_eq!(a.battery().fract(), 0.0, "whole percent");
        }
    }

    #[test]
    fn builder_is_deterministic_and_prefix_stable() {
        let small = FleetBuilder::new(3, 9).positions(vec![c(1, 1)]).build().unwrap();
        let large = FleetBuilder::new(6, 9).positions(vec![c(1, 1)]).build().unwrap();
        for id in small.ids() {
            assert_eq!(small[id].battery(), large[id].battery());
        }
    }

    #[test]
    fn builder_validation() {
        assert!(matches!(FleetBuilder::new(2, 0).build(), Err(FleetError::NoPositions(2))));
        assert!(FleetBuilder::new(0, 0).build().unwrap().is_empty());
        assert!(matches!(
            FleetBuilder::new(1, 0).positions(vec![c(0, 0)]).battery_range(90..=80).build(),
            Err(FleetError::InvalidBatteryRange { .. })
        ));
    }

    #[test]
    fn queries() {
        let mut fleet = FleetBuilder::new(3, 1)
            .positions(vec![c(1, 1), c(2, 2), c(3, 3)])
            .battery_range(50..=50)
            .build()
            .unwrap();
        fleet[AgentId(1)].assign(TaskId(0), vec![c(2, 3)], false).unwrap();

        assert_eq!(fleet.available(20.0), vec![AgentId(0), AgentId(2)]);
        assert_eq!(fleet.with_status(AgentStatus::Active), vec![AgentId(1)]);
        assert_eq!(fleet.count(AgentStatus::Idle), 2);
        assert!(fleet.occupied(c(2, 2)));
        assert!(!fleet.occupied(c(9, 9)));
        assert!(fleet.agent_mut(AgentId(5)).is_err());
        assert_eq!(fleet.operational_count(), 3);
    }
}

// ── Task board ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod board {
    use super::helpers::c;
    use agv_core::{AgentId, SimRng, TaskId, Tick};

    use crate::{FleetError, Priority, TaskBoard, TaskCounts};

    #[test]
    fn ids_are_sequential() {
        let mut b = TaskBoard::new();
        assert_eq!(b.add(c(0, 0), c(1, 1), Priority::Low, Tick(0)), TaskId(0));
        assert_eq!(b.add(c(0, 0), c(1, 1), Priority::Low, Tick(0)), TaskId(1));
        assert_eq!(b[TaskId(1)].id, TaskId(1));
    }

    #[test]
    fn counts_and_terminal() {
        let mut b = TaskBoard::new();
        assert!(b.all_terminal());
        for _ in 0..4 {
            b.add(c(0, 0), c(1, 1), Priority::High, Tick(0));
        }
        b[TaskId(0)].start_by(AgentId(0), Tick(2)).unwrap();
        b[TaskId(1)].start_by(AgentId(1), Tick(4)).unwrap();
        b[TaskId(1)].complete(Tick(9)).unwrap();
        b[TaskId(2)].cancel().unwrap();

        assert_eq!(
            b.counts(),
            TaskCounts { pending: 1, in_progress: 1, completed: 1, failed: 0, cancelled: 1 }
        );
        assert_eq!(b.pending(), vec![TaskId(3)]);
        assert!(!b.all_terminal());
        assert_eq!(b.average_wait_ticks(), Some(3.0));
    }

    #[test]
    fn generate_uses_distinct_workstations() {
        let stations = [c(5, 5), c(14, 5), c(10, 10)];
        let mut rng = SimRng::new(3);
        let mut b = TaskBoard::new();
        let ids = b.generate(50, &stations, Tick(0), &mut rng).unwrap();
        assert_eq!(ids.len(), 50);
        for t in b.iter() {
            assert_ne!(t.start, t.end);
            assert!(stations.contains(&t.start) && stations.contains(&t.end));
            assert!(t.is_pending());
        }
        assert!(Priority::ALL.iter().all(|p| b.iter().any(|t| t.priority == *p)));
    }

    #[test]
    fn generate_is_deterministic() {
        let stations = [c(1, 1), c(2, 2), c(3, 3), c(4, 4)];
        let run = |seed| {
            let mut b = TaskBoard::new();
            b.generate(10, &stations, Tick(0), &mut SimRng::new(seed)).unwrap();
            b.iter().map(|t| (t.start, t.end, t.priority)).collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn generate_needs_two_workstations() {
        let mut b = TaskBoard::new();
        let err = b.generate(3, &[c(1, 1)], Tick(0), &mut SimRng::new(0)).unwrap_err();
        assert!(matches!(err, FleetError::NotEnoughWorkstations(1)));
        assert!(b.generate(0, &[], Tick(0), &mut SimRng::new(0)).unwrap().is_empty());
    }

    #[test]
    fn random_deadlines_within_horizon() {
        let stations = [c(1, 1), c(2, 2)];
        let mut rng = SimRng::new(5);
        let mut b = TaskBoard::new();
        let ids = b.generate(40, &stations, Tick(100), &mut rng).unwrap();
        b.assign_random_deadlines(&ids, 1.0, 50, &mut rng);
        assert!(b.iter().all(|t| t.deadline.is_some_and(|d| (Tick(100)..=Tick(150)).contains(&d))));
    }
}
