use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Lifecycle state of a task. Any state may be set by an authorized edit;
/// there is no enforced transition graph.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskState {
    #[default]
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "worked")]
    Worked,
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
    #[sea_orm(string_value = "finished")]
    Finished,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::TaskState;

    #[test]
    fn task_state_round_trips_through_strings() {
        for state in [
            TaskState::Created,
            TaskState::Assigned,
            TaskState::Worked,
            TaskState::Reviewed,
            TaskState::Finished,
        ] {
            let text = state.to_string();
            assert_eq!(TaskState::from_str(&text).unwrap(), state);
        }
    }

    #[test]
    fn default_state_is_created() {
        assert_eq!(TaskState::default(), TaskState::Created);
    }
}
