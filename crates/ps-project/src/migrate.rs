//! Scenario version migration.
//!
//! Version 1 files predate the `solver` and `initial_output` keys; both
//! default on load, so upgrading only bumps the version number.

use crate::schema::Scenario;
use crate::{ProjectError, ProjectResult};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut scenario: Scenario) -> ProjectResult<Scenario> {
    match scenario.version {
        0 => Err(ProjectError::Migration {
            what: "version 0 is not a valid scenario version".to_string(),
        }),
        1 => {
            scenario.version = 2;
            Ok(scenario)
        }
        LATEST_VERSION => Ok(scenario),
        // Newer versions are reported by validation.
        _ => Ok(scenario),
    }
}
