pub mod common;
pub mod condition;
pub mod error;
pub mod field;
pub mod record;

pub use common::{FieldValue, SemanticType};
pub use condition::{
    ActiveCondition, BadgeId, ConditionFlags, ConditionId, CustomizationDegree, FilterCondition,
    DELETED_INITIAL_BADGE_ID, NO_BADGE_ID,
};
pub use error::FilterError;
pub use field::{Accessor, FilterField, FilterFieldBuilder, SimpleFilterField};
pub use record::{json_accessor, json_to_field_value, JsonRecord};
