// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Replay commands: run, record, torture.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use medchain_contracts::default_registry;
use medchain_core::{
    ContractError, Disposition, Executor, Hash, Instruction, InstructionVerifier,
    ReadOnlyStateTrie, VerificationOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigService, ReplayConfig};
use crate::config_fs::FsConfigStore;
use crate::scenario::Scenario;

/// Hash domain recorded in golden files.
pub const HASH_DOMAIN: &str = "MEDCHAIN_STATE_ROOT_V1";
/// Hash algorithm recorded in golden files.
pub const HASH_ALG: &str = "BLAKE3";

#[derive(Parser)]
#[command(name = "medchain-replay")]
#[command(about = "Replay medchain scenarios and check state roots for determinism")]
/// Command-line arguments.
pub struct Cli {
    /// Directory holding `replay.json` (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Harness subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario and optionally check against a golden file
    Run {
        /// Path to scenario JSON
        scenario: PathBuf,
        /// Optional path to golden roots JSON
        #[arg(long)]
        golden: Option<PathBuf>,
    },
    /// Run a scenario and write its golden roots JSON
    Record {
        /// Path to scenario JSON
        scenario: PathBuf,
        /// Path to output golden JSON
        #[arg(long)]
        out: PathBuf,
    },
    /// Run a scenario repeatedly to detect non-determinism
    Torture {
        /// Path to scenario JSON
        scenario: PathBuf,
        /// Number of runs (defaults to the configured value)
        #[arg(long)]
        runs: Option<u32>,
    },
}

/// Recorded per-step outcome of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Golden {
    /// Domain of the recorded roots.
    pub hash_domain: String,
    /// Hash algorithm of the recorded roots.
    pub hash_alg: String,
    /// State root after each step, lowercase hex.
    pub hashes_hex: Vec<String>,
    /// Rejection kind of each step, `None` when it applied.
    pub rejections: Vec<Option<String>>,
}

/// Per-step outcome of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    /// State root after each step, lowercase hex.
    pub hashes_hex: Vec<String>,
    /// Rejection kind of each step, `None` when it applied.
    pub rejections: Vec<Option<String>>,
}

impl Trace {
    /// Golden record of this trace.
    pub fn to_golden(&self) -> Golden {
        Golden {
            hash_domain: HASH_DOMAIN.to_owned(),
            hash_alg: HASH_ALG.to_owned(),
            hashes_hex: self.hashes_hex.clone(),
            rejections: self.rejections.clone(),
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.hashes_hex.len()
    }

    /// Returns `true` for a scenario with no steps.
    pub fn is_empty(&self) -> bool {
        self.hashes_hex.is_empty()
    }

    /// Number of rejected steps.
    pub fn rejected(&self) -> usize {
        self.rejections.iter().filter(|r| r.is_some()).count()
    }
}

/// Verifier that authorizes every instruction.
///
/// Scenarios carry no signatures, so there is nothing to check; the harness
/// only cares that replicas agree on the resulting roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingVerifier;

impl InstructionVerifier for TrustingVerifier {
    fn verify(
        &self,
        _snapshot: &dyn ReadOnlyStateTrie,
        inst: &Instruction,
        _ctx_hash: &Hash,
        options: VerificationOptions,
    ) -> Result<(), ContractError> {
        debug!(
            instance = %inst.instance_id,
            ignore_counters = options.ignore_counters,
            "trusting instruction"
        );
        Ok(())
    }
}

/// Executes `scenario` from its genesis state.
///
/// With `halt_on_rejection` the first rejected step aborts the replay;
/// otherwise rejections are recorded and later steps still run.
pub fn replay(scenario: &Scenario, halt_on_rejection: bool) -> Result<Trace> {
    let mut trie = scenario.genesis_trie().context("building genesis state")?;
    let block = scenario.instructions().context("resolving instructions")?;
    let exec = Executor::new(default_registry().context("registering contracts")?, TrustingVerifier);

    let mut trace = Trace::default();
    if halt_on_rejection {
        for (step, inst) in block.iter().enumerate() {
            exec.execute(&mut trie, inst, Vec::new())
                .with_context(|| format!("step {step} ({}) rejected", inst.action.label()))?;
            trace.hashes_hex.push(hex::encode(trie.state_root()));
            trace.rejections.push(None);
        }
    } else {
        let report = exec.execute_block(&mut trie, &block);
        trace.hashes_hex = report.roots.iter().map(hex::encode).collect();
        trace.rejections = report
            .dispositions
            .iter()
            .map(|d| match d {
                Disposition::Applied(_) => None,
                Disposition::Rejected(kind) => Some(kind.as_str().to_owned()),
            })
            .collect();
    }
    Ok(trace)
}

/// Loads and replays the scenario at `path`.
pub fn run_scenario(path: &Path, halt_on_rejection: bool) -> Result<Trace> {
    let scenario = Scenario::from_path(path)
        .with_context(|| format!("loading scenario {}", path.display()))?;
    replay(&scenario, halt_on_rejection)
}

/// Checks `actual` against a golden record.
pub fn compare_golden(actual: &Trace, expected: &Golden) -> Result<()> {
    if expected.hash_domain != HASH_DOMAIN || expected.hash_alg != HASH_ALG {
        bail!(
            "golden uses {}/{}, harness produces {HASH_DOMAIN}/{HASH_ALG}",
            expected.hash_domain,
            expected.hash_alg
        );
    }
    for (step, (got, want)) in actual.hashes_hex.iter().zip(&expected.hashes_hex).enumerate() {
        if got != want {
            bail!("root mismatch at step {step}.\nActual:   {got}\nExpected: {want}");
        }
    }
    for (step, (got, want)) in actual.rejections.iter().zip(&expected.rejections).enumerate() {
        if got != want {
            bail!("rejection mismatch at step {step}: actual {got:?}, expected {want:?}");
        }
    }
    if actual.hashes_hex.len() != expected.hashes_hex.len()
        || actual.rejections.len() != expected.rejections.len()
    {
        bail!(
            "length mismatch. Run has {} steps, golden has {}.",
            actual.len(),
            expected.hashes_hex.len()
        );
    }
    Ok(())
}

/// Describes the first difference between two traces, if any.
pub fn first_divergence(baseline: &Trace, current: &Trace) -> Option<String> {
    let step = baseline
        .hashes_hex
        .iter()
        .zip(&current.hashes_hex)
        .position(|(a, b)| a != b);
    match step {
        Some(step) => Some(format!(
            "step {step}.\nBaseline: {}\nCurrent:  {}",
            baseline.hashes_hex[step], current.hashes_hex[step]
        )),
        None if baseline.len() != current.len() => Some(format!(
            "step count: baseline {}, current {}",
            baseline.len(),
            current.len()
        )),
        None if baseline.rejections != current.rejections => {
            Some("rejection kinds differ with identical roots".to_owned())
        }
        None => None,
    }
}

/// Replays `path` `runs` times and fails on the first divergence.
pub fn torture(path: &Path, runs: u32, halt_on_rejection: bool) -> Result<Trace> {
    let baseline = run_scenario(path, halt_on_rejection).context("run 1 (baseline) failed")?;
    for run in 2..=runs {
        let current =
            run_scenario(path, halt_on_rejection).with_context(|| format!("run {run} failed"))?;
        if let Some(diff) = first_divergence(&baseline, &current) {
            bail!("divergence detected in run {run} at {diff}");
        }
    }
    Ok(baseline)
}

/// Loads harness settings from `config_dir` or the platform config dir.
///
/// An unresolvable platform dir or a missing file yields the defaults; a
/// malformed file is an error.
pub fn load_config(config_dir: Option<&Path>) -> Result<ReplayConfig> {
    let store = match config_dir {
        Some(dir) => FsConfigStore::at(dir)
            .with_context(|| format!("opening config dir {}", dir.display()))?,
        None => match FsConfigStore::new() {
            Ok(store) => store,
            Err(_) => return Ok(ReplayConfig::default()),
        },
    };
    ConfigService::new(store)
        .replay_config()
        .context("loading replay config")
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter {fallback:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn read_golden(path: &Path) -> Result<Golden> {
    let f = File::open(path).with_context(|| format!("opening golden {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).context("parsing golden file")
}

/// Parses the command line and runs the selected subcommand.
#[allow(clippy::print_stdout)]
pub fn entrypoint() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config_dir.as_deref())?;
    init_tracing(&config.log_filter)?;

    match cli.command {
        Commands::Run { scenario, golden } => {
            let trace = run_scenario(&scenario, config.halt_on_rejection)?;
            if let Some(golden_path) = golden {
                compare_golden(&trace, &read_golden(&golden_path)?)?;
                println!("replay: OK. {} steps verified.", trace.len());
            } else {
                println!(
                    "replay: run complete. {} steps executed, {} rejected.",
                    trace.len(),
                    trace.rejected()
                );
            }
        }
        Commands::Record { scenario, out } => {
            let trace = run_scenario(&scenario, config.halt_on_rejection)?;
            let f = File::create(&out)
                .with_context(|| format!("creating output file {}", out.display()))?;
            serde_json::to_writer_pretty(f, &trace.to_golden())?;
            println!("replay: recorded {} steps to {}", trace.len(), out.display());
        }
        Commands::Torture { scenario, runs } => {
            let runs = runs.unwrap_or(config.runs);
            info!(runs, scenario = %scenario.display(), "torture starting");
            let trace = torture(&scenario, runs, config.halt_on_rejection)?;
            println!(
                "replay: torture passed. {runs} runs, {} steps each.",
                trace.len()
            );
        }
    }
    Ok(())
}
