// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
use std::path::PathBuf;

use anyhow::Result;
use medchain_replay::config::{ConfigService, ReplayConfig, REPLAY_CONFIG_KEY};
use medchain_replay::config_fs::FsConfigStore;
use medchain_replay::replay::{compare_golden, load_config, run_scenario, torture, Golden};

fn testdata(name: &str) -> PathBuf {
    // Anchor testdata path to CARGO_MANIFEST_DIR (crate root at compile time).
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("medchain-replay-{name}-{}", std::process::id()))
}

#[test]
fn sample_scenario_reports_expected_rejections() -> Result<()> {
    let trace = run_scenario(&testdata("access_and_query.json"), false)?;
    assert_eq!(trace.len(), 12);
    let rejected: Vec<(usize, &str)> = trace
        .rejections
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_deref().map(|k| (i, k)))
        .collect();
    assert_eq!(
        rejected,
        [
            (3, "DuplicateID"),
            (9, "ContractMismatch"),
            (11, "UpstreamLookupFailure"),
        ]
    );
    // Rejected steps leave the root where the previous step left it.
    assert_eq!(trace.hashes_hex[2], trace.hashes_hex[3]);
    assert_ne!(trace.hashes_hex[3], trace.hashes_hex[4]);
    Ok(())
}

#[test]
fn halting_run_stops_at_first_rejection() {
    let err = run_scenario(&testdata("access_and_query.json"), true).unwrap_err();
    assert!(format!("{err:#}").contains("step 3"));
}

#[test]
fn recorded_golden_verifies_and_detects_tampering() -> Result<()> {
    let trace = run_scenario(&testdata("access_and_query.json"), false)?;
    let golden_text = serde_json::to_string_pretty(&trace.to_golden())?;
    let golden: Golden = serde_json::from_str(&golden_text)?;
    compare_golden(&run_scenario(&testdata("access_and_query.json"), false)?, &golden)?;

    let mut tampered = golden;
    tampered.hashes_hex[5] = "00".repeat(32);
    assert!(compare_golden(&trace, &tampered).is_err());
    Ok(())
}

#[test]
fn torture_runs_agree() -> Result<()> {
    let trace = torture(&testdata("access_and_query.json"), 5, false)?;
    assert_eq!(trace.rejected(), 3);
    Ok(())
}

#[test]
fn missing_scenario_file_is_an_error() {
    assert!(run_scenario(&testdata("does_not_exist.json"), false).is_err());
}

#[test]
fn config_round_trips_through_filesystem_store() -> Result<()> {
    let dir = scratch_dir("fs-config");
    let service = ConfigService::new(FsConfigStore::at(&dir)?);
    let cfg = ReplayConfig {
        log_filter: "warn".into(),
        runs: 7,
        halt_on_rejection: true,
    };
    service.save(REPLAY_CONFIG_KEY, &cfg)?;
    assert!(dir.join("replay.json").exists());
    assert_eq!(load_config(Some(&dir))?, cfg);
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
