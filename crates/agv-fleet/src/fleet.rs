//! The `Fleet`: every AGV in the run, indexed by `AgentId`.

use std::ops::{Index, IndexMut, RangeInclusive};

use agv_core::{AgentId, AgentRng, Coord};

use crate::agent::{Agent, AgentStatus};
use crate::error::{FleetError, FleetResult};

/// All agents, `agents[id.index()]` holding agent `id`.
#[derive(Clone, Debug, Default)]
pub struct Fleet {
    agents: Vec<Agent>,
}

impl Fleet {
    /// Wrap pre-built agents.  Agent `i` must carry `AgentId(i)`.
    pub fn new(agents: Vec<Agent>) -> Self {
        debug_assert!(agents.iter().enumerate().all(|(i, a)| a.id.index() == i));
        Self { agents }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Like [`get_mut`](Self::get_mut) but an unknown id is an error.
    pub fn agent_mut(&mut self, id: AgentId) -> FleetResult<&mut Agent> {
        self.agents.get_mut(id.index()).ok_or(FleetError::UnknownAgent(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    /// Idle agents with battery above `min_battery`, in id order.
    pub fn available(&self, min_battery: f64) -> Vec<AgentId> {
        self.agents.iter().filter(|a| a.is_available(min_battery)).map(|a| a.id).collect()
    }

    pub fn with_status(&self, status: AgentStatus) -> Vec<AgentId> {
        self.agents.iter().filter(|a| a.status() == status).map(|a| a.id).collect()
    }

    pub fn count(&self, status: AgentStatus) -> usize {
        self.agents.iter().filter(|a| a.status() == status).count()
    }

    /// Agents not in maintenance.
    pub fn operational_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_operational()).count()
    }

    /// `true` if any agent stands on `c`.
    pub fn occupied(&self, c: Coord) -> bool {
        self.agents.iter().any(|a| a.position == c)
    }

    pub fn total_active_ticks(&self) -> u64 {
        self.agents.iter().map(|a| a.active_ticks).sum()
    }
}

impl Index<AgentId> for Fleet {
    type Output = Agent;
    fn index(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }
}

impl IndexMut<AgentId> for Fleet {
    fn index_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id.index()]
    }
}

// ── FleetBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for a [`Fleet`].
///
/// ```rust
/// use agv_core::Coord;
/// use agv_fleet::FleetBuilder;
///
/// let fleet = FleetBuilder::new(3, /*seed=*/ 42)
///     .positions(vec![Coord::new(1, 1), Coord::new(5, 1)])
///     .build()
///     .unwrap();
///
/// assert_eq!(fleet.len(), 3);
/// // Positions are reused round-robin.
/// assert_eq!(fleet.iter().nth(2).unwrap().position, Coord::new(1, 1));
/// ```
pub struct FleetBuilder {
    count:     usize,
    seed:      u64,
    positions: Vec<Coord>,
    battery:   RangeInclusive<u32>,
}

impl FleetBuilder {
    pub fn new(count: usize, seed: u64) -> Self {
        Self { count, seed, positions: Vec::new(), battery: 85..=100 }
    }

    /// Spawn cells, used round-robin in agent order.
    pub fn positions(mut self, positions: Vec<Coord>) -> Self {
        self.positions = positions;
        self
    }

    /// Whole-percent range the initial battery is drawn from.  Default 85–100.
    pub fn battery_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.battery = range;
        self
    }

    /// Each agent's battery comes from its own `AgentRng`, so growing the
    /// fleet never changes the charge of existing agents.
    pub fn build(self) -> FleetResult<Fleet> {
        let (lo, hi) = (*self.battery.start(), *self.battery.end());
        if lo > hi || hi > 100 {
            return Err(FleetError::InvalidBatteryRange { lo, hi });
        }
        if self.count > 0 && self.positions.is_empty() {
            return Err(FleetError::NoPositions(self.count));
        }

        let agents = (0..self.count)
            .map(|i| {
                let id = AgentId(i as u32);
                let battery = AgentRng::new(self.seed, id).gen_range(lo..=hi) as f64;
                let position = self.positions[i % self.positions.len()];
                Agent::new(id, position, battery)
            })
            .collect();
        Ok(Fleet::new(agents))
    }
}
