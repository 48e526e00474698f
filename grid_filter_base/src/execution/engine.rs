//! # Filter Engine
//!
//! Owns the active conditions, the initial (baseline) conditions and the
//! pending input. Every change rebuilds one combined predicate and installs it
//! into the row source with a single call.

use crate::config::EngineConfig;
use crate::execution::comparisons::FilterComparator;
use crate::execution::editing::FilterInput;
use crate::execution::filter_evaluation::{FilterEvaluator, RowPredicate};
use crate::registry::FieldRegistry;
use crate::types::condition::{
    ActiveCondition, BadgeId, ConditionFlags, ConditionId, FilterCondition,
};
use crate::types::error::FilterError;
use crate::types::field::FilterField;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// ROW SOURCES
// ============================================================================

/// Data source the combined predicate is installed into
pub trait RowSource<R> {
    /// Replace the current filter
    fn set_filter(&mut self, predicate: RowPredicate<R>);

    /// Accept every row again
    fn remove_filter(&mut self);
}

/// In-memory rows filtered on demand
pub struct ListDataView<R> {
    rows: Vec<R>,
    filter: Option<RowPredicate<R>>,
}

impl<R> ListDataView<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows, filter: None }
    }

    /// All rows, ignoring the filter
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Replace the dataset, keeping the installed filter
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn filtered_rows(&self) -> Vec<&R> {
        match &self.filter {
            Some(predicate) => self.rows.iter().filter(|row| predicate(row)).collect(),
            None => self.rows.iter().collect(),
        }
    }

    pub fn filtered_count(&self) -> usize {
        match &self.filter {
            Some(predicate) => self.rows.iter().filter(|row| predicate(row)).count(),
            None => self.rows.len(),
        }
    }
}

impl<R> RowSource<R> for ListDataView<R> {
    fn set_filter(&mut self, predicate: RowPredicate<R>) {
        self.filter = Some(predicate);
    }

    fn remove_filter(&mut self) {
        self.filter = None;
    }
}

// ============================================================================
// ENGINE
// ============================================================================

struct PendingInput<R> {
    input: FilterInput<R>,
    /// Position and original of the condition being edited
    editing: Option<(usize, ActiveCondition<R>)>,
}

pub struct FilterEngine<R, S = ListDataView<R>> {
    pub(crate) config: EngineConfig,
    pub(crate) registry: FieldRegistry<R>,
    pub(crate) active: Vec<ActiveCondition<R>>,
    pub(crate) baseline: Vec<ActiveCondition<R>>,
    pub(crate) deleted_baseline: Vec<ActiveCondition<R>>,
    pending: Option<PendingInput<R>>,
    source: S,
    predicate: Option<RowPredicate<R>>,
    next_id: u64,
    next_badge: u64,
}

impl<R: 'static> FilterEngine<R, ListDataView<R>> {
    /// Engine over in-memory rows, configured from the environment
    pub fn new(rows: Vec<R>) -> Self {
        Self::with_source(ListDataView::new(rows), EngineConfig::default())
    }

    pub fn with_config(rows: Vec<R>, config: EngineConfig) -> Self {
        Self::with_source(ListDataView::new(rows), config)
    }
}

impl<R: 'static, S: RowSource<R>> FilterEngine<R, S> {
    pub fn with_source(source: S, config: EngineConfig) -> Self {
        Self {
            config,
            registry: FieldRegistry::new(),
            active: Vec::new(),
            baseline: Vec::new(),
            deleted_baseline: Vec::new(),
            pending: None,
            source,
            predicate: None,
            next_id: 1,
            next_badge: 1,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------------

    /// Register a field; a known description unions comparator sets
    pub fn register_field(
        &mut self,
        field: Arc<FilterField<R>>,
    ) -> Result<Arc<FilterField<R>>, FilterError> {
        self.registry.register(field)
    }

    pub fn fields(&self) -> &[Arc<FilterField<R>>] {
        self.registry.fields()
    }

    pub fn field(&self, description: &str) -> Option<&Arc<FilterField<R>>> {
        self.registry.get(description)
    }

    pub fn registry(&self) -> &FieldRegistry<R> {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------------

    /// Add a user condition; it can be deleted but not edited
    pub fn add_condition(
        &mut self,
        field: &str,
        comparator: FilterComparator,
        raw_input: impl Into<String>,
    ) -> Result<ConditionId, FilterError> {
        self.add_condition_with(field, comparator, raw_input, ConditionFlags::default())
    }

    pub fn add_condition_with(
        &mut self,
        field: &str,
        comparator: FilterComparator,
        raw_input: impl Into<String>,
        flags: ConditionFlags,
    ) -> Result<ConditionId, FilterError> {
        let field = Arc::clone(self.registry.require(field)?);
        let condition = FilterCondition::new(field, comparator, raw_input)?;
        let id = self.push_condition(condition, flags);
        self.recombine();
        Ok(id)
    }

    /// Remove a condition regardless of its flags
    pub fn remove_condition(&mut self, id: ConditionId) -> Result<ActiveCondition<R>, FilterError> {
        let position = self.position(id)?;
        let removed = self.active.remove(position);
        log::debug!("Removed condition {} ({})", id, removed.condition());
        self.recombine();
        Ok(removed)
    }

    /// Delete a chip. Deleted initial conditions are remembered so the
    /// deletion survives persistence.
    pub fn delete_condition(&mut self, id: ConditionId) -> Result<(), FilterError> {
        let position = self.position(id)?;
        if !self.active[position].is_deletable() {
            return Err(FilterError::ConditionNotDeletable(id));
        }

        let removed = self.active.remove(position);
        if removed.badge_id().is_initial() {
            self.deleted_baseline
                .push(removed.with_badge_id(BadgeId::DeletedInitial));
        }

        log::debug!("Deleted condition {} ({})", id, removed.condition());
        self.recombine();
        Ok(())
    }

    /// Drop every condition and restore the initial ones
    pub fn reset(&mut self) {
        self.pending = None;
        self.active.clear();
        self.deleted_baseline.clear();

        if self.config.reset_restores_baseline {
            self.active.extend(self.baseline.iter().cloned());
        }

        log::info!(
            "Filter reset, {} initial condition(s) restored",
            self.active.len()
        );
        self.recombine();
    }

    /// Add an initial condition on a registered field
    pub fn add_initial_condition(
        &mut self,
        field: &str,
        comparator: FilterComparator,
        raw_input: impl Into<String>,
        flags: ConditionFlags,
    ) -> Result<ConditionId, FilterError> {
        let field = Arc::clone(self.registry.require(field)?);
        self.add_initial_condition_with_field(field, comparator, raw_input, flags)
    }

    /// Add an initial condition, restored on every reset.
    ///
    /// Editable initial conditions register their field with the chosen
    /// comparator. Without an explicit badge id the lowest unused number is
    /// assigned; an explicit badge id already in the baseline is rejected.
    pub fn add_initial_condition_with_field(
        &mut self,
        field: Arc<FilterField<R>>,
        comparator: FilterComparator,
        raw_input: impl Into<String>,
        mut flags: ConditionFlags,
    ) -> Result<ConditionId, FilterError> {
        if flags.badge_id.is_initial() && self.badge_in_use(&flags.badge_id) {
            return Err(FilterError::DuplicateBadge(flags.badge_id.to_string()));
        }

        let field = if flags.editable {
            self.registry.register(Arc::clone(&field))?;
            self.registry.add_comparator(field.description(), comparator)?
        } else if field.has_comparator(comparator) {
            field
        } else {
            Arc::new(field.with_added_comparator(comparator)?)
        };

        let condition = FilterCondition::new(field, comparator, raw_input)?;

        if !flags.badge_id.is_initial() {
            flags.badge_id = self.next_free_badge();
        }

        let id = self.push_condition(condition, flags);
        if let Some(active) = self.active.last() {
            log::debug!(
                "Initial condition {} ({}) with badge {}",
                id,
                active.condition(),
                active.badge_id()
            );
            self.baseline.push(active.clone());
        }

        self.recombine();
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Input and editing
    // ------------------------------------------------------------------------

    /// Open an empty input for a new condition
    pub fn open_input(&mut self) -> Result<&mut FilterInput<R>, FilterError> {
        if self.pending.is_some() {
            return Err(FilterError::InputAlreadyOpen);
        }

        self.pending = Some(PendingInput {
            input: FilterInput::new(),
            editing: None,
        });
        self.pending_input_mut()
    }

    pub fn input(&self) -> Option<&FilterInput<R>> {
        self.pending.as_ref().map(|p| &p.input)
    }

    pub fn input_mut(&mut self) -> Option<&mut FilterInput<R>> {
        self.pending.as_mut().map(|p| &mut p.input)
    }

    pub fn is_editing(&self) -> bool {
        self.pending.as_ref().map_or(false, |p| p.editing.is_some())
    }

    /// Select a registered field in the open input
    pub fn select_field(&mut self, description: &str) -> Result<(), FilterError> {
        let field = Arc::clone(self.registry.require(description)?);
        self.pending_input_mut()?.select_field(field)
    }

    /// Load a condition into the input and take it out of the filter until
    /// the edit is accepted or cancelled
    pub fn edit_condition(&mut self, id: ConditionId) -> Result<&mut FilterInput<R>, FilterError> {
        if self.pending.is_some() {
            return Err(FilterError::InputAlreadyOpen);
        }

        let position = self.position(id)?;
        if !self.active[position].is_editable() {
            return Err(FilterError::ConditionNotEditable(id));
        }

        let original = self.active.remove(position);
        self.pending = Some(PendingInput {
            input: FilterInput::for_condition(&original),
            editing: Some((position, original)),
        });

        self.recombine();
        self.pending_input_mut()
    }

    /// Turn the open input into an active condition. An edited condition keeps
    /// its id, badge id and flags.
    pub fn accept_input(&mut self) -> Result<ConditionId, FilterError> {
        let pending = self.pending.take().ok_or(FilterError::NoPendingInput)?;

        let condition = match pending.input.to_condition() {
            Ok(condition) => condition,
            Err(err) => {
                self.pending = Some(pending);
                return Err(err);
            }
        };

        let id = match pending.editing {
            Some((_, original)) => {
                let id = original.id();
                self.active
                    .push(ActiveCondition::new(id, condition, original.flags().clone()));
                id
            }
            None => self.push_condition(condition, ConditionFlags::default()),
        };

        self.recombine();
        Ok(id)
    }

    /// Close the input. A condition being edited is put back unchanged.
    pub fn cancel_input(&mut self) -> Result<(), FilterError> {
        let pending = self.pending.take().ok_or(FilterError::NoPendingInput)?;

        if let Some((position, original)) = pending.editing {
            let position = position.min(self.active.len());
            self.active.insert(position, original);
            self.recombine();
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Evaluate the current conditions against one row
    pub fn evaluate(&self, row: &R) -> bool {
        FilterEvaluator::evaluate_conditions(&self.active, row)
    }

    /// The installed predicate, or one accepting everything
    pub fn predicate(&self) -> RowPredicate<R> {
        match &self.predicate {
            Some(predicate) => Arc::clone(predicate),
            None => FilterEvaluator::accept_all(),
        }
    }

    pub fn has_filter(&self) -> bool {
        self.predicate.is_some()
    }

    /// Active conditions in insertion order
    pub fn conditions(&self) -> &[ActiveCondition<R>] {
        &self.active
    }

    pub fn condition(&self, id: ConditionId) -> Option<&ActiveCondition<R>> {
        self.active.iter().find(|c| c.id() == id)
    }

    pub fn baseline(&self) -> &[ActiveCondition<R>] {
        &self.baseline
    }

    /// Initial conditions deleted since the last reset
    pub fn deleted_baseline(&self) -> &[ActiveCondition<R>] {
        &self.deleted_baseline
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    pub(crate) fn push_condition(
        &mut self,
        condition: FilterCondition<R>,
        flags: ConditionFlags,
    ) -> ConditionId {
        let id = ConditionId(self.next_id);
        self.next_id += 1;
        self.active.push(ActiveCondition::new(id, condition, flags));
        id
    }

    /// Rebuild the combined predicate and install it
    pub(crate) fn recombine(&mut self) {
        match FilterEvaluator::combine(&self.active) {
            Some(predicate) => {
                self.predicate = Some(Arc::clone(&predicate));
                self.source.set_filter(predicate);
            }
            None => {
                self.predicate = None;
                self.source.remove_filter();
            }
        }

        log::debug!("Installed filter over {} condition(s)", self.active.len());
    }

    fn badge_in_use(&self, badge_id: &BadgeId) -> bool {
        self.baseline.iter().any(|b| b.badge_id() == badge_id)
    }

    fn next_free_badge(&mut self) -> BadgeId {
        loop {
            let candidate = BadgeId::Initial(self.next_badge.to_string());
            self.next_badge += 1;
            if !self.badge_in_use(&candidate) {
                return candidate;
            }
        }
    }

    fn position(&self, id: ConditionId) -> Result<usize, FilterError> {
        self.active
            .iter()
            .position(|c| c.id() == id)
            .ok_or(FilterError::UnknownCondition(id))
    }

    fn pending_input_mut(&mut self) -> Result<&mut FilterInput<R>, FilterError> {
        self.pending
            .as_mut()
            .map(|p| &mut p.input)
            .ok_or(FilterError::NoPendingInput)
    }
}

impl<R, S> fmt::Debug for FilterEngine<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("config", &self.config)
            .field("fields", &self.registry.descriptions())
            .field("active", &self.active)
            .field("baseline", &self.baseline)
            .field("deleted_baseline", &self.deleted_baseline)
            .field("editing", &self.pending.as_ref().map(|p| &p.input))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
