//! Discovery of observation files and staleness decisions.
//!
//! Raw observations live under `obs_out/<YYYY>/<YYYYMMDDHH>/<ctrl|ens>/`,
//! binned products under `obs_bin/<level>/...`. Everything here is read-only;
//! the workflows decide what to do with the results.
mod layout;
mod names;
mod staleness;

pub use layout::{
    list_cycles, obs_type_pattern, scan_raw_observations, Branch, Cycle, CycleInputs,
    RawInventory,
};
pub use names::{level_file_key, merge_inputs, product_obs_types, raw_file_key, ObsKey};
pub use staleness::{decide, decide_from_times, decide_prefix, Decision};

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
