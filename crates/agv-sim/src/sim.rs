//! The `Sim` struct: run control, the tick loop and perturbations.

use std::thread;

use agv_core::{AgentId, Coord, EventLog, SimClock, SimRng, TaskId, Tick};
use agv_fleet::{
    AgentState, AgentStatus, Errand, Fleet, FleetBuilder, FleetError, MaintenanceCause, Priority, Task, TaskBoard,
};
use agv_fleet::agent::BATTERY_MAX;
use agv_grid::{Algorithm, CellType, GridMap, PathFinder, StationIndex};
use agv_schedule::{plan_route, Policy, Round, Scheduler, Weights};

use crate::config::{InterruptPolicy, Scenario, SimConfig};
use crate::perturb::{EventTarget, PerturbationKind, INJECTED_SPIKE, RANDOM_SPIKE, SPIKE_FLOOR};
use crate::snapshot::{EndReason, RunState, RunSummary, Snapshot, TickReport};
use crate::{SimError, SimObserver, SimResult};

// ── World ─────────────────────────────────────────────────────────────────────

/// Everything a (re)initialisation replaces.  Built in full before any of
/// it is installed, so a failed reconfiguration leaves the run untouched.
struct World {
    grid:      GridMap,
    fleet:     Fleet,
    tasks:     TaskBoard,
    stations:  StationIndex,
    rng:       SimRng,
    scheduler: Scheduler,
    clock:     SimClock,
}

impl World {
    fn build(
        config:    &SimConfig,
        base:      &GridMap,
        positions: &[Coord],
        custom:    Option<&TaskBoard>,
    ) -> SimResult<World> {
        let (lo, hi) = config.initial_battery;
        let fleet = FleetBuilder::new(config.agent_count, config.seed)
            .positions(positions.to_vec())
            .battery_range(lo..=hi)
            .build()?;

        let mut clock = SimClock::new(config.tick_duration_secs);
        clock.set_speed(config.speed)?;

        let mut rng = SimRng::new(config.seed);
        let tasks = match custom {
            Some(board) => board.clone(),
            None => {
                let mut board = TaskBoard::new();
                let workstations = base.cells_of_type(CellType::Workstation);
                let ids = board.generate(config.task_count, &workstations, Tick::ZERO, &mut rng)?;
                if config.deadline_share > 0.0 {
                    let horizon = clock.ticks_for_hours(config.deadline_horizon_hours);
                    board.assign_random_deadlines(&ids, config.deadline_share, horizon, &mut rng);
                }
                board
            }
        };

        let scheduler = Scheduler::new(config.policy)
            .with_weights(config.weights)
            .with_min_battery(config.min_assign_battery)
            .with_tick_duration(config.tick_duration_secs);

        Ok(World {
            grid: base.clone(),
            fleet,
            tasks,
            stations: StationIndex::build(base),
            rng,
            scheduler,
            clock,
        })
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation runner.
///
/// One tick ([`step`](Sim::step)):
///
/// 1. **Agents**, in id order: drain or charge the battery, drive one cell
///    (re-planning around new obstacles), finish errands on arrival, send
///    low-battery AGVs to the nearest reachable charger.
/// 2. **Scheduler**: pair pending tasks with available AGVs; tasks with no
///    pickup-to-drop-off route fail.
/// 3. **Perturbation**: every `event_interval_ticks`, with probability
///    `failure_rate`%, hit a random Active AGV.
/// 4. **End check**: all tasks terminal, whole fleet down, stalled, or the
///    tick cap.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  Configuration commands are
/// refused while the run is [`RunState::Running`].
pub struct Sim<F: PathFinder = Algorithm> {
    config:       SimConfig,
    clock:        SimClock,
    grid:         GridMap,
    /// The map as built; reinitialisation restores it.
    base_grid:    GridMap,
    fleet:        Fleet,
    tasks:        TaskBoard,
    events:       EventLog,
    scheduler:    Scheduler,
    finder:       F,
    stations:     StationIndex,
    workstations: Vec<Coord>,
    positions:    Vec<Coord>,
    custom_tasks: Option<TaskBoard>,
    rng:          SimRng,
    state:        RunState,
    end_reason:   Option<EndReason>,
}

impl<F: PathFinder> Sim<F> {
    pub(crate) fn assemble(
        config:       SimConfig,
        grid:         GridMap,
        finder:       F,
        positions:    Vec<Coord>,
        custom_tasks: Option<TaskBoard>,
    ) -> SimResult<Self> {
        let World { grid: live, fleet, tasks, stations, rng, scheduler, clock } =
            World::build(&config, &grid, &positions, custom_tasks.as_ref())?;
        let workstations = grid.cells_of_type(CellType::Workstation);
        let mut sim = Sim {
            config,
            clock,
            grid: live,
            base_grid: grid,
            fleet,
            tasks,
            events: EventLog::new(),
            scheduler,
            finder,
            stations,
            workstations,
            positions,
            custom_tasks,
            rng,
            state: RunState::Ready,
            end_reason: None,
        };
        sim.announce();
        Ok(sim)
    }

    fn install(&mut self, world: World) {
        self.grid = world.grid;
        self.fleet = world.fleet;
        self.tasks = world.tasks;
        self.stations = world.stations;
        self.rng = world.rng;
        self.scheduler = world.scheduler;
        self.clock = world.clock;
        self.events.clear();
        self.state = RunState::Ready;
        self.end_reason = None;
        self.announce();
    }

    fn announce(&mut self) {
        log::info!(
            "simulation ready: {} AGVs, {} tasks, {} policy, {} chargers",
            self.fleet.len(),
            self.tasks.len(),
            self.config.policy,
            self.stations.len(),
        );
        let msg = format!(
            "initialized: {} AGVs, {} tasks, {} scheduling",
            self.fleet.len(),
            self.tasks.len(),
            self.config.policy
        );
        self.events.info(Tick::ZERO, msg);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// The live map, including obstacles dropped during the run.
    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Current state plus the events logged since the last snapshot.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::capture(
            self.clock.current_tick,
            self.clock.elapsed_secs(),
            self.state,
            &self.fleet,
            &self.tasks,
            self.events.take_new(),
        )
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::compute(
            self.clock.current_tick.0,
            self.clock.elapsed_secs(),
            self.end_reason,
            &self.fleet,
            &self.tasks,
            &self.events,
        )
    }

    // ── Run control ───────────────────────────────────────────────────────

    /// Ready or Paused → Running.  A no-op while running.
    pub fn start(&mut self) -> SimResult<()> {
        match self.state {
            RunState::Ready => {
                self.state = RunState::Running;
                self.events.success(self.now(), "simulation started");
            }
            RunState::Paused => self.resume(),
            RunState::Running => {}
            RunState::Stopped => return Err(SimError::Finished),
        }
        Ok(())
    }

    /// Running → Paused; otherwise nothing happens.
    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            self.events.warn(self.now(), "simulation paused");
        }
    }

    /// Paused → Running; otherwise nothing happens.
    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.events.success(self.now(), "simulation resumed");
        }
    }

    /// End the run and return its summary.  Stopping twice returns the
    /// same summary.
    pub fn stop(&mut self) -> RunSummary {
        if self.state != RunState::Stopped {
            self.finish(EndReason::Stopped);
        }
        self.summary()
    }

    /// Change the playback multiplier.  Allowed at any time; it only
    /// affects [`run_paced`](Sim::run_paced).
    pub fn set_speed(&mut self, speed: f64) -> SimResult<()> {
        let old = self.clock.speed();
        self.clock.set_speed(speed)?;
        self.config.speed = speed;
        self.events.info(self.now(), format!("speed changed from {old}x to {speed}x"));
        Ok(())
    }

    fn ensure_not_running(&self, command: &'static str) -> SimResult<()> {
        if self.state == RunState::Running {
            return Err(SimError::InProgress { command });
        }
        Ok(())
    }

    /// Replace the configuration and reinitialise fleet, tasks, map and
    /// clock.  The run goes back to Ready.  On error nothing changes.
    ///
    /// The search is fixed at build time; change it with `set_algorithm`.
    pub fn reconfigure(&mut self, config: SimConfig) -> SimResult<()> {
        self.ensure_not_running("reconfiguring")?;
        config.validate()?;
        if config.algorithm != self.config.algorithm {
            return Err(SimError::Config("change the search with set_algorithm".into()));
        }
        let world = World::build(&config, &self.base_grid, &self.positions, None)?;
        self.config = config;
        self.custom_tasks = None;
        self.install(world);
        self.events.success(Tick::ZERO, "configuration applied");
        Ok(())
    }

    /// Apply agent count, task count, policy and failure rate, then
    /// reinitialise.  Tasks are regenerated even if custom ones were
    /// supplied at build time.
    pub fn apply_scenario(&mut self, scenario: impl Into<Scenario>) -> SimResult<()> {
        self.ensure_not_running("applying a scenario")?;
        let mut next = self.config.clone();
        next.apply(&scenario.into());
        self.reconfigure(next)
    }

    /// Reinitialise with the current configuration.
    pub fn reset(&mut self) -> SimResult<()> {
        self.ensure_not_running("resetting")?;
        let world = World::build(&self.config, &self.base_grid, &self.positions, self.custom_tasks.as_ref())?;
        self.install(world);
        Ok(())
    }

    pub fn set_policy(&mut self, policy: Policy) -> SimResult<()> {
        self.ensure_not_running("changing the policy")?;
        self.config.policy = policy;
        self.scheduler.policy = policy;
        self.events.info(self.now(), format!("scheduling policy set to {policy}"));
        Ok(())
    }

    pub fn set_weights(&mut self, weights: Weights) -> SimResult<()> {
        self.ensure_not_running("changing the weights")?;
        weights.validate()?;
        self.config.weights = weights;
        self.scheduler.weights = weights;
        Ok(())
    }

    /// Fire a perturbation now.  A random target must be Active; a named
    /// one may be in any state.  Battery spikes are harsher than random ones.
    pub fn inject_event(&mut self, kind: PerturbationKind, target: EventTarget) -> SimResult<()> {
        if self.state == RunState::Stopped {
            return Err(SimError::Finished);
        }
        let agent = match target {
            EventTarget::Random => {
                let active = self.fleet.with_status(AgentStatus::Active);
                *self.rng.choose(&active).ok_or(SimError::NoActiveAgent)?
            }
            EventTarget::Agent(id) => {
                self.fleet.get(id).ok_or(FleetError::UnknownAgent(id))?;
                id
            }
        };
        log::debug!("injecting {kind} on {agent}");
        self.apply_perturbation(kind, agent, INJECTED_SPIKE, self.now())?;
        Ok(())
    }

    // ── Driving the loop ──────────────────────────────────────────────────

    /// Ready → Running; refuse to drive a paused or finished run.
    fn begin(&mut self) -> SimResult<()> {
        match self.state {
            RunState::Ready => self.start(),
            RunState::Running => Ok(()),
            RunState::Paused => Err(SimError::NotRunning(RunState::Paused)),
            RunState::Stopped => Err(SimError::Finished),
        }
    }

    /// Run until the run ends.
    ///
    /// Without `max_ticks` this relies on the end checks; a fleet that keeps
    /// interrupting the same task could run indefinitely.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.begin()?;
        while self.state == RunState::Running {
            self.observed_step(observer)?;
        }
        Ok(self.conclude(observer))
    }

    /// Run at most `n` ticks.  Returns how many ran.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        self.begin()?;
        let mut ran = 0;
        while ran < n && self.state == RunState::Running {
            self.observed_step(observer)?;
            ran += 1;
        }
        if self.state == RunState::Stopped {
            self.conclude(observer);
        }
        Ok(ran)
    }

    /// Like [`run`](Sim::run) but sleeping [`SimClock::wall_interval`]
    /// between ticks.
    pub fn run_paced<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        self.begin()?;
        while self.state == RunState::Running {
            self.observed_step(observer)?;
            if self.state == RunState::Running {
                thread::sleep(self.clock.wall_interval());
            }
        }
        Ok(self.conclude(observer))
    }

    fn observed_step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(self.now() + 1);
        let report = self.step()?;
        observer.on_tick_end(report.tick, &report);
        let every = self.config.snapshot_interval;
        if every > 0 && (report.tick.is_multiple_of(every) || self.state == RunState::Stopped) {
            let snapshot = self.snapshot();
            observer.on_snapshot(&snapshot);
        }
        Ok(())
    }

    fn conclude<O: SimObserver>(&mut self, observer: &mut O) -> RunSummary {
        let summary = self.summary();
        observer.on_sim_end(&summary);
        log::info!("run ended ({}): {summary}", self.end_reason.unwrap_or(EndReason::Stopped));
        summary
    }

    // ── One tick ──────────────────────────────────────────────────────────

    /// Advance one tick.  The run must be Running.
    pub fn step(&mut self) -> SimResult<TickReport> {
        if self.state != RunState::Running {
            return Err(SimError::NotRunning(self.state));
        }
        let now = self.clock.advance();
        let mut report = TickReport { tick: now, ..TickReport::default() };

        for i in 0..self.fleet.len() {
            self.update_agent(AgentId(i as u32), now, &mut report)?;
        }

        let round =
            self.scheduler.assign(&mut self.tasks, &mut self.fleet, &self.grid, &self.finder, now)?;
        self.record_round(round, now, &mut report)?;

        if now.is_multiple_of(self.config.event_interval_ticks)
            && self.rng.gen_bool(self.config.failure_rate / 100.0)
        {
            report.perturbation = self.random_perturbation(now, &mut report)?;
        }

        report.tally(&self.fleet, &self.tasks);
        if let Some(reason) = self.end_condition(now, &report) {
            self.finish(reason);
        }
        Ok(report)
    }

    fn update_agent(&mut self, id: AgentId, now: Tick, report: &mut TickReport) -> SimResult<()> {
        let agent = &mut self.fleet[id];
        match agent.state() {
            AgentState::Maintenance(_) => return Ok(()),
            AgentState::Charging => {
                if agent.charge(self.config.charge_rate) >= BATTERY_MAX {
                    agent.finish_charging()?;
                    self.events.success(now, format!("{id} fully charged"));
                }
                return Ok(());
            }
            AgentState::Idle => {
                if agent.battery() <= self.config.min_assign_battery {
                    self.send_to_charger(id, now)?;
                }
                return Ok(());
            }
            AgentState::Active(_) => {}
        }

        let before = agent.battery();
        let after = agent.drain(self.config.battery_drain);
        agent.active_ticks += 1;
        let warning = self.config.battery_warning;
        if before >= warning && after < warning {
            self.events.warn(now, format!("{id} battery low ({after:.1}%)"));
        }
        if after <= 0.0 {
            let task = self.fleet[id].break_down(MaintenanceCause::BatteryDepleted);
            self.events.error(now, format!("{id} stopped: battery depleted"));
            if let Some(task) = task {
                report.failed += self.release_task(task, now, "battery depleted")?;
            }
            return Ok(());
        }

        self.drive(id, now, report)?;

        let agent = &self.fleet[id];
        if agent.current_task().is_some() && agent.battery() < self.config.low_battery {
            self.send_to_charger(id, now)?;
        } else if agent.status() == AgentStatus::Idle && agent.battery() <= self.config.min_assign_battery {
            // Just delivered or cut off, too low for the scheduler.
            self.send_to_charger(id, now)?;
        }
        Ok(())
    }

    /// Move an Active agent one cell and handle arrival.
    fn drive(&mut self, id: AgentId, now: Tick, report: &mut TickReport) -> SimResult<()> {
        if let Some(next) = self.fleet[id].next_cell() {
            if self.grid.is_blocked(next) && !self.replan(id, now)? {
                return Ok(());
            }
            if self.fleet[id].step().is_some() {
                report.moved += 1;
            }
            let agent = &mut self.fleet[id];
            if let Some(task) = agent.current_task() {
                if !agent.is_loaded() && agent.position == self.tasks[task].start {
                    agent.load();
                    log::debug!("{id} picked up {task} at {}", agent.position);
                }
                let progress = agent.route_progress();
                self.tasks.task_mut(task)?.set_progress(progress)?;
            }
        }
        if self.fleet[id].path().is_empty() {
            self.arrive(id, now, report)?;
        }
        Ok(())
    }

    fn arrive(&mut self, id: AgentId, now: Tick, report: &mut TickReport) -> SimResult<()> {
        let agent = &mut self.fleet[id];
        match agent.state() {
            AgentState::Active(Errand::Task { .. }) => {
                let task = agent.complete_errand()?;
                self.tasks.task_mut(task)?.complete(now)?;
                report.completed += 1;
                self.events.success(now, format!("{id} completed {task}"));
            }
            AgentState::Active(Errand::ChargingTrip) => {
                agent.start_charging()?;
                let at = agent.position;
                self.events.info(now, format!("{id} charging at {at}"));
            }
            _ => {}
        }
        Ok(())
    }

    fn record_round(&mut self, round: Round, now: Tick, report: &mut TickReport) -> SimResult<()> {
        for task in round.infeasible {
            let t = self.tasks.task_mut(task)?;
            t.fail("no route from pickup to drop-off")?;
            let (start, end) = (t.start, t.end);
            report.failed += 1;
            self.events.error(now, format!("{task} failed: no route from {start} to {end}"));
        }
        for (task, agent) in &round.unreachable {
            log::debug!("{agent} cannot reach the pickup of {task}");
        }
        for a in &round.assignments {
            self.events.info(now, format!("{} assigned to {}", a.task, a.agent));
        }
        report.assigned = round.assignments.len();
        Ok(())
    }

    fn end_condition(&self, now: Tick, report: &TickReport) -> Option<EndReason> {
        if self.tasks.all_terminal() {
            return Some(EndReason::AllTasksDone);
        }
        if self.fleet.operational_count() == 0 {
            return Some(EndReason::FleetDown);
        }
        // Idle and broken AGVs only change through the scheduler or a
        // perturbation, and random perturbations need an Active target.
        if report.active == 0
            && report.charging == 0
            && report.assigned == 0
            && report.perturbation.is_none()
        {
            return Some(EndReason::Stalled);
        }
        match self.config.max_ticks {
            Some(max) if now.0 >= max => Some(EndReason::TickLimit),
            _ => None,
        }
    }

    fn finish(&mut self, reason: EndReason) {
        let now = self.now();
        self.state = RunState::Stopped;
        self.end_reason = Some(reason);
        match reason {
            EndReason::AllTasksDone => self.events.success(now, "all tasks finished"),
            EndReason::FleetDown => self.events.error(now, "every AGV is out of service"),
            EndReason::Stalled => self.events.warn(now, "no AGV can make progress"),
            EndReason::TickLimit => self.events.info(now, "tick limit reached"),
            EndReason::Stopped => self.events.error(now, "simulation stopped"),
        }
    }

    // ── Routing helpers ───────────────────────────────────────────────────

    /// Path from `from` to `to` without the starting cell.
    fn route(&self, from: Coord, to: Coord) -> SimResult<Option<Vec<Coord>>> {
        let path = self.finder.find_path(&self.grid, from, to)?.into_path();
        Ok(path.map(|p| p.into_iter().skip(1).collect()))
    }

    /// The closest charger, by Manhattan distance, that has a path.
    fn route_to_charger(&self, from: Coord) -> SimResult<Option<(Coord, Vec<Coord>)>> {
        for station in self.stations.by_distance(from) {
            if let Some(route) = self.route(from, station)? {
                return Ok(Some((station, route)));
            }
        }
        Ok(None)
    }

    fn send_to_charger(&mut self, id: AgentId, now: Tick) -> SimResult<()> {
        let from = self.fleet[id].position;
        let Some((station, route)) = self.route_to_charger(from)? else {
            log::debug!("{id} needs charge but no charger is reachable from {from}");
            return Ok(());
        };
        let battery = self.fleet[id].battery();
        if let Some(task) = self.fleet[id].begin_charging_trip(route)? {
            self.tasks.task_mut(task)?.interrupt()?;
            self.events.warn(now, format!("{id} low on battery, {task} returned to queue"));
        }
        self.events.warn(now, format!("{id} heading to charger at {station} ({battery:.1}%)"));
        if self.fleet[id].path().is_empty() {
            self.fleet[id].start_charging()?;
            self.events.info(now, format!("{id} charging at {station}"));
        }
        Ok(())
    }

    /// Recompute the rest of an Active agent's route on the current map.
    ///
    /// Returns `false` when no route exists; the agent then goes Idle and
    /// its task back to the queue.
    fn replan(&mut self, id: AgentId, now: Tick) -> SimResult<bool> {
        let agent = &self.fleet[id];
        let from = agent.position;
        let route = match agent.state() {
            AgentState::Active(Errand::Task { task, loaded }) => {
                let (start, end) = (self.tasks[task].start, self.tasks[task].end);
                if loaded {
                    self.route(from, end)?
                } else {
                    match self.finder.find_path(&self.grid, start, end)?.into_path() {
                        Some(delivery) => plan_route(&self.grid, &self.finder, from, start, &delivery)?,
                        None => None,
                    }
                }
            }
            AgentState::Active(Errand::ChargingTrip) => self.route_to_charger(from)?.map(|(_, r)| r),
            _ => return Ok(false),
        };

        match route {
            Some(route) => {
                log::debug!("{id} re-planned: {} cells", route.len());
                self.fleet[id].reroute(route)?;
                self.events.info(now, format!("{id} re-routed around an obstacle"));
                Ok(true)
            }
            None => {
                match self.fleet[id].abandon_errand()? {
                    Some(task) => {
                        self.tasks.task_mut(task)?.interrupt()?;
                        self.events.warn(now, format!("{id} cut off, {task} returned to queue"));
                    }
                    None => self.events.warn(now, format!("{id} cut off from its charger")),
                }
                Ok(false)
            }
        }
    }

    /// Apply the interrupt policy to a task whose AGV dropped out.
    /// Returns the number of tasks failed (0 or 1).
    fn release_task(&mut self, task: TaskId, now: Tick, cause: &str) -> SimResult<usize> {
        let t = self.tasks.task_mut(task)?;
        match self.config.interrupt_policy {
            InterruptPolicy::RevertToPending => {
                t.interrupt()?;
                self.events.warn(now, format!("{task} returned to queue ({cause})"));
                Ok(0)
            }
            InterruptPolicy::Fail => {
                t.fail(cause)?;
                self.events.error(now, format!("{task} failed ({cause})"));
                Ok(1)
            }
        }
    }

    // ── Perturbations ─────────────────────────────────────────────────────

    fn random_perturbation(
        &mut self,
        now: Tick,
        report: &mut TickReport,
    ) -> SimResult<Option<PerturbationKind>> {
        let kinds = PerturbationKind::ALL;
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        let active = self.fleet.with_status(AgentStatus::Active);
        let Some(&target) = self.rng.choose(&active) else {
            return Ok(None);
        };
        report.failed += self.apply_perturbation(kind, target, RANDOM_SPIKE, now)?;
        Ok(Some(kind))
    }

    /// Returns the number of tasks failed as a consequence.
    fn apply_perturbation(
        &mut self,
        kind: PerturbationKind,
        target: AgentId,
        spike: f64,
        now: Tick,
    ) -> SimResult<usize> {
        match kind {
            PerturbationKind::Obstacle => self.drop_obstacle(target, now).map(|_| 0),
            PerturbationKind::BatterySpike => {
                let level = self.fleet.agent_mut(target)?.battery_spike(spike, SPIKE_FLOOR);
                self.events.warn(now, format!("{target} battery dropped sharply ({level:.1}%)"));
                Ok(0)
            }
            PerturbationKind::Breakdown => {
                let agent = self.fleet.agent_mut(target)?;
                if !agent.is_operational() {
                    self.events.info(now, format!("{target} is already in maintenance"));
                    return Ok(0);
                }
                let task = agent.break_down(MaintenanceCause::Breakdown);
                self.events.error(now, format!("{target} broke down"));
                match task {
                    Some(task) => self.release_task(task, now, "breakdown"),
                    None => Ok(0),
                }
            }
            PerturbationKind::EmergencyTask => {
                self.emergency_task(now);
                Ok(0)
            }
        }
    }

    /// Block a free cell on `target`'s remaining route and re-plan every
    /// AGV whose route crosses it.
    fn drop_obstacle(&mut self, target: AgentId, now: Tick) -> SimResult<()> {
        let agent = self.fleet.get(target).ok_or(FleetError::UnknownAgent(target))?;
        let last = agent.destination();
        let candidates: Vec<Coord> = agent
            .path()
            .iter()
            .copied()
            .filter(|&c| Some(c) != last)
            .filter(|&c| matches!(self.grid.get(c), Some(CellType::Empty | CellType::PathMarker)))
            .filter(|&c| !self.fleet.occupied(c))
            .filter(|&c| !self.tasks.iter().any(|t| !t.is_terminal() && (t.start == c || t.end == c)))
            .collect();
        let Some(&cell) = self.rng.choose(&candidates) else {
            self.events.info(now, format!("no room for an obstacle on {target}'s route"));
            return Ok(());
        };

        self.grid.set_cell(cell.x, cell.y, CellType::Obstacle)?;
        self.events.warn(now, format!("obstacle appeared at {cell} on {target}'s route"));

        let crossing: Vec<AgentId> =
            self.fleet.iter().filter(|a| a.path().contains(&cell)).map(|a| a.id).collect();
        for id in crossing {
            self.replan(id, now)?;
        }
        Ok(())
    }

    fn emergency_task(&mut self, now: Tick) {
        let Some((start, end)) = self.rng.choose_pair(&self.workstations) else {
            self.events.warn(now, "no workstation pair for an emergency task");
            return;
        };
        let id = self.tasks.insert(|id| Task::new(id, start, end, Priority::High, now).as_emergency());
        self.events.error(now, format!("emergency task {id} created ({start} -> {end})"));
    }
}

impl Sim<Algorithm> {
    /// Swap the built-in search.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> SimResult<()> {
        self.ensure_not_running("changing the algorithm")?;
        self.finder = algorithm;
        self.config.algorithm = algorithm;
        self.events.info(self.now(), format!("path algorithm set to {algorithm}"));
        Ok(())
    }
}
