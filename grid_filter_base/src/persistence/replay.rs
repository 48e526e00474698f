//! Saving and replaying engine state as condition records

use crate::execution::comparisons::FilterComparator;
use crate::execution::engine::{FilterEngine, RowSource};
use crate::persistence::error::CodecError;
use crate::persistence::query::{decode_query, encode_query};
use crate::persistence::record::ConditionRecord;
use crate::types::condition::{BadgeId, ConditionFlags, CustomizationDegree, FilterCondition};
use crate::types::error::FilterError;
use crate::types::field::FilterField;
use std::sync::Arc;

/// What a replay did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub applied: usize,
    pub removed: usize,
    pub skipped: usize,
}

impl<R: 'static, S: RowSource<R>> FilterEngine<R, S> {
    /// Active conditions followed by markers for deleted initial conditions
    pub fn to_records(&self) -> Vec<ConditionRecord> {
        let component_id = self.config.component_id();

        self.active
            .iter()
            .chain(self.deleted_baseline.iter())
            .map(|active| ConditionRecord::from_active(component_id, active))
            .collect()
    }

    pub fn to_query_string(&self) -> String {
        encode_query(&self.to_records())
    }

    pub fn restore_from_query(&mut self, query: &str) -> Result<RestoreSummary, CodecError> {
        let records = decode_query(query)?;
        Ok(self.restore_from_records(&records))
    }

    /// Replay persisted records on top of the current conditions.
    ///
    /// Only records of this engine's component are used, duplicates dropped.
    /// Active conditions whose badge id is replayed are replaced. Records that
    /// no longer resolve to a field and comparator are skipped.
    pub fn restore_from_records(&mut self, records: &[ConditionRecord]) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        let component_id = self.config.identifier.clone();

        let mut relevant: Vec<&ConditionRecord> = Vec::new();
        for record in records {
            let ours = component_id
                .as_deref()
                .map_or(true, |id| id == record.component_id);
            if !ours {
                summary.skipped += 1;
                continue;
            }
            if relevant.iter().any(|seen| seen.same_condition(record)) {
                log::debug!("Dropping duplicate record for field '{}'", record.field);
                continue;
            }
            relevant.push(record);
        }

        let replayed_badges: Vec<&BadgeId> = relevant
            .iter()
            .map(|r| &r.badge_id)
            .filter(|b| b.is_initial())
            .collect();
        let before = self.active.len();
        self.active
            .retain(|active| !replayed_badges.contains(&active.badge_id()));
        summary.removed += before - self.active.len();

        for record in relevant {
            if record.badge_id == BadgeId::DeletedInitial {
                summary.removed += self.remove_deleted_initial(record);
                continue;
            }

            match self.condition_from_record(record) {
                Ok(condition) => {
                    let customization = self
                        .baseline
                        .iter()
                        .find(|b| b.badge_id() == &record.badge_id && record.badge_id.is_initial())
                        .map(|b| b.customization())
                        .unwrap_or(CustomizationDegree::Everything);

                    let flags = ConditionFlags::new(record.deletable, record.editable, customization)
                        .with_badge_id(record.badge_id.clone());
                    self.push_condition(condition, flags);
                    summary.applied += 1;
                }
                Err(err) => {
                    log::debug!("Skipping record for field '{}': {}", record.field, err);
                    summary.skipped += 1;
                }
            }
        }

        log::info!(
            "Restored filter: {} applied, {} removed, {} skipped",
            summary.applied,
            summary.removed,
            summary.skipped
        );
        self.recombine();
        summary
    }

    /// Remove the active initial conditions a deletion marker refers to
    fn remove_deleted_initial(&mut self, record: &ConditionRecord) -> usize {
        let (removed, kept): (Vec<_>, Vec<_>) = self.active.drain(..).partition(|active| {
            active.badge_id() != &BadgeId::NoBadge
                && active
                    .condition()
                    .same_as(&record.field, &record.condition, &record.input)
        });
        self.active = kept;

        for active in &removed {
            if active.badge_id().is_initial() {
                self.deleted_baseline
                    .push(active.with_badge_id(BadgeId::DeletedInitial));
            }
        }
        removed.len()
    }

    /// Resolve through the registry, falling back to the field of the initial
    /// condition with the same badge id
    fn condition_from_record(
        &self,
        record: &ConditionRecord,
    ) -> Result<FilterCondition<R>, FilterError> {
        let (field, comparator) = match self.registry.resolve(&record.field, &record.condition) {
            Ok(resolved) => resolved,
            Err(err) => self.resolve_from_baseline(record).ok_or(err)?,
        };

        FilterCondition::new(field, comparator, record.input.clone())
    }

    fn resolve_from_baseline(
        &self,
        record: &ConditionRecord,
    ) -> Option<(Arc<FilterField<R>>, FilterComparator)> {
        let initial = self.baseline.iter().find(|b| {
            b.badge_id() == &record.badge_id
                && record.badge_id.is_initial()
                && b.field_description() == record.field
        })?;

        let field = initial.condition().field();
        let comparator = field.comparator_by_description(&record.condition)?;
        Some((Arc::clone(field), comparator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::execution::engine::tests::{engine, people, Person};
    use crate::execution::engine::ListDataView;
    use crate::types::field::SimpleFilterField;

    fn names(engine: &FilterEngine<Person, ListDataView<Person>>) -> Vec<&'static str> {
        engine
            .source()
            .filtered_rows()
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    fn with_baseline() -> FilterEngine<Person> {
        let mut engine = engine();
        engine
            .add_initial_condition(
                "Department",
                FilterComparator::Equal,
                "HR",
                ConditionFlags::new(true, true, CustomizationDegree::InputValue),
            )
            .unwrap();
        engine
            .add_initial_condition(
                "Married",
                FilterComparator::Equal,
                "true",
                ConditionFlags::new(true, false, CustomizationDegree::Nothing),
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_round_trip_reproduces_filter() {
        let mut original = with_baseline();
        let married = original.conditions()[1].id();
        original.delete_condition(married).unwrap();
        original
            .add_condition("Salary", FilterComparator::GreaterThan, "5500")
            .unwrap();

        let query = original.to_query_string();

        let mut restored = with_baseline();
        let summary = restored.restore_from_query(&query).unwrap();

        assert_eq!(summary.applied, 2);
        assert_eq!(names(&restored), names(&original));
        assert_eq!(names(&restored), vec!["Sarah", "Max"]);
        assert!(people()
            .iter()
            .all(|p| restored.evaluate(p) == original.evaluate(p)));

        let badges: Vec<String> = restored
            .conditions()
            .iter()
            .map(|c| c.badge_id().to_string())
            .collect();
        assert_eq!(badges, vec!["1", "noBadgeId"]);
        assert_eq!(
            restored.conditions()[0].customization(),
            CustomizationDegree::InputValue
        );
        assert_eq!(restored.deleted_baseline().len(), 1);
    }

    #[test]
    fn test_records_of_other_components_are_ignored() {
        let mut source = engine();
        source
            .add_condition("Name", FilterComparator::Equal, "Tom")
            .unwrap();
        let mut records = source.to_records();
        records[0].component_id = "other".to_string();

        let mut target = engine();
        let summary = target.restore_from_records(&records);

        assert_eq!(summary.skipped, 1);
        assert!(target.conditions().is_empty());
    }

    #[test]
    fn test_duplicates_and_unknown_fields_are_skipped() {
        let mut source = engine();
        source
            .add_condition("Name", FilterComparator::Equal, "Tom")
            .unwrap();
        let mut records = source.to_records();
        records.push(records[0].clone());

        let mut unknown = records[0].clone();
        unknown.field = "Nickname".to_string();
        records.push(unknown);

        let mut target = engine();
        let summary = target.restore_from_records(&records);

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(names(&target), vec!["Tom"]);
    }

    #[test]
    fn test_replayed_badge_replaces_initial_condition() {
        let mut source = with_baseline();
        let department = source.conditions()[0].id();
        source.edit_condition(department).unwrap().set_value("IT");
        source.accept_input().unwrap();

        let records = source.to_records();
        let mut target = with_baseline();
        target.restore_from_records(&records);

        assert_eq!(target.conditions().len(), 2);
        assert_eq!(names(&target), vec!["Tom"]);
    }

    #[test]
    fn test_restore_without_identifier_accepts_all_components() {
        let mut engine: FilterEngine<Person> =
            FilterEngine::with_config(people(), EngineConfig::new());
        engine
            .register_field(SimpleFilterField::number("Salary", |p: &Person| p.salary))
            .unwrap();

        let summary = engine
            .restore_from_query(
                "id=anything&field=Salary&condition=is+less+than&input=5000&badgeId=noBadgeId\
                 &deletable=true&editable=false",
            )
            .unwrap();

        assert_eq!(summary.applied, 1);
        assert_eq!(names(&engine), vec!["Tom"]);
    }

    #[test]
    fn test_round_trip_without_identifier() {
        let unnamed = || {
            let mut engine: FilterEngine<Person> =
                FilterEngine::with_config(people(), EngineConfig::new());
            engine
                .register_field(SimpleFilterField::number("Salary", |p: &Person| p.salary))
                .unwrap();
            engine
        };

        let mut original = unnamed();
        original
            .add_condition("Salary", FilterComparator::GreaterThan, "5000")
            .unwrap();
        let query = original.to_query_string();

        let mut restored = unnamed();
        let summary = restored.restore_from_query(&query).unwrap();

        assert_eq!(summary.applied, 1);
        assert_eq!(names(&restored), vec!["Sarah", "Max"]);
        assert_eq!(restored.to_query_string(), query);
    }

    #[test]
    fn test_invalid_query_is_rejected() {
        let mut engine = engine();
        assert!(engine.restore_from_query("id=people&field=Salary").is_err());
        assert!(engine.conditions().is_empty());
    }
}
