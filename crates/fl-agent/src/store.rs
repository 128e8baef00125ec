//! Core agent storage: `AgentStore` (doubling array) and `AgentView`
//! (borrowed snapshot for one frame step).
//!
//! # Why a hand-managed capacity?
//!
//! `Vec` already grows geometrically, but its growth factor is an
//! implementation detail.  The flock needs a documented policy it can reason
//! about: the store starts at a fixed small capacity and doubles exactly when
//! an append finds it full.  `AgentStore` therefore tracks its own logical
//! `capacity` and reserves precisely that much with `reserve_exact`.
//!
//! # Borrowing instead of raw pointers
//!
//! The dispatch step reads the whole array as one contiguous block and the
//! transform job writes disjoint slots in parallel.  Both get a *borrow* of
//! the store for the duration of the step:
//!
//! ```ignore
//! // fl-sim frame step (simplified):
//! let headings = coordinator.run_step(flock.store.view(), &params)?;    // &AgentStore
//! job.apply(flock.store.view_mut(), &mut flock.handles, headings, ds)?; // &mut AgentStore
//! flock.store.append(record);                                           // views are gone
//! ```
//!
//! Because `append` takes `&mut self`, the borrow checker rejects any attempt
//! to grow (and therefore reallocate) the store while a view is still alive.
//! Logical indices `0..count` survive a reallocation; addresses do not.

use fl_core::AgentId;

use crate::{AgentRecord, StoreError, StoreResult};

/// Slot capacity of a store created with [`AgentStore::new`].
pub const DEFAULT_CAPACITY: usize = 8;

// ── AgentView ─────────────────────────────────────────────────────────────────

/// Read-only view of every live record, valid until the store is next
/// mutated.
///
/// `AgentView` is `Copy`; passing it by value costs a pointer and a length.
#[derive(Copy, Clone, Debug)]
pub struct AgentView<'a> {
    records: &'a [AgentRecord],
}

impl<'a> AgentView<'a> {
    /// Number of live records in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records as a slice, indexed by `AgentId::index()`.
    #[inline]
    pub fn records(&self) -> &'a [AgentRecord] {
        self.records
    }

    /// The records reinterpreted as raw bytes for a verbatim device upload.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.records)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, AgentRecord> {
        self.records.iter()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Contiguous, append-only storage for all agent records.
///
/// The `AgentId` returned by [`append`](Self::append) is the record's index
/// and stays valid forever; there is no removal.
#[derive(Debug)]
pub struct AgentStore {
    records:  Vec<AgentRecord>,
    /// Logical slot capacity.  Always `>= records.len()`.
    capacity: usize,
    /// Number of doubling reallocations performed so far.
    resizes:  usize,
}

impl AgentStore {
    /// Empty store with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty store with room for `capacity` records before the first resize.
    ///
    /// A zero capacity would never double, so it is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            resizes: 0,
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Append `record` and return its id.
    ///
    /// When the store is full the capacity doubles first and every live
    /// record is moved to the new allocation.  Allocation failure aborts.
    pub fn append(&mut self, record: AgentRecord) -> AgentId {
        if self.records.len() == self.capacity {
            self.grow();
        }
        debug_assert!(self.records.len() < u32::MAX as usize, "AgentId space exhausted");
        let id = AgentId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    /// Overwrite the record for `agent`.
    pub fn set(&mut self, agent: AgentId, record: AgentRecord) -> StoreResult<()> {
        let count = self.records.len();
        let slot = self
            .records
            .get_mut(agent.index())
            .ok_or(StoreError::IndexOutOfRange { agent, count })?;
        *slot = record;
        Ok(())
    }

    /// Mutable slice over every live record, for index-disjoint parallel
    /// writes.  Holding it blocks `append`.
    #[inline]
    pub fn view_mut(&mut self) -> &mut [AgentRecord] {
        &mut self.records
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity * 2;
        self.records.reserve_exact(new_capacity - self.records.len());
        self.capacity = new_capacity;
        self.resizes += 1;
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// Copy of the record for `agent`.
    pub fn get(&self, agent: AgentId) -> StoreResult<AgentRecord> {
        self.records
            .get(agent.index())
            .copied()
            .ok_or(StoreError::IndexOutOfRange { agent, count: self.records.len() })
    }

    /// Borrowed snapshot of all live records for this frame step.
    #[inline]
    pub fn view(&self) -> AgentView<'_> {
        AgentView { records: &self.records }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentRecord> {
        self.records.iter()
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.records.len() as u32).map(AgentId)
    }

    // ── Metadata ──────────────────────────────────────────────────────────

    /// Number of live agents.
    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slots available before the next doubling.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the store has doubled since construction.
    #[inline]
    pub fn resize_count(&self) -> usize {
        self.resizes
    }
}

impl Default for AgentStore {
    fn default() -> Self {
        Self::new()
    }
}
