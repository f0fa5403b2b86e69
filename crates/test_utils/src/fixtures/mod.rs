//! Test fixtures for reproducible tests

use qgov_api::clock::ManualClock;
use qgov_api::context::CallContext;
use qgov_state::memory::MemoryStore;
use qgov_types::app::{AccountId, FluctuationZone, QuantumEntity, QuantumField, StateLabel, ZoneStatus};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// The principal used by most tests.
pub const DEPLOYER: &str = "deployer";

/// Returns the default test principal.
pub fn deployer() -> AccountId {
    AccountId::new(DEPLOYER)
}

/// Returns a named test principal.
pub fn account(name: &str) -> AccountId {
    AccountId::new(name)
}

/// A call context for the deployer at `height`.
pub fn ctx_at(height: u64) -> CallContext {
    CallContext::new(height, deployer())
}

/// An empty store and a clock starting at `height`.
pub fn store_and_clock(height: u64) -> (MemoryStore, Arc<ManualClock>) {
    (MemoryStore::new(), Arc::new(ManualClock::new(height)))
}

/// The Higgs field used throughout the field-consensus tests.
pub fn higgs_field(registered_at: u64) -> QuantumField {
    QuantumField {
        description: "Standard Higgs field with normal parameters".into(),
        current_value: 246,
        baseline_value: 246,
        stability_index: 95,
        adjustment_count: 0,
        registered_by: deployer(),
        registered_at,
    }
}

/// The beta-sector zone used throughout the regulation tests.
pub fn beta_zone(registered_at: u64) -> FluctuationZone {
    FluctuationZone {
        description: "Quantum vacuum fluctuation zone in sector beta".into(),
        max_amplitude: 1000,
        baseline_energy: 500,
        regulation_level: 75,
        status: ZoneStatus::Active,
        adjustment_count: 0,
        event_count: 0,
        registered_by: deployer(),
        registered_at,
    }
}

/// A photon in `state` used throughout the duality tests.
pub fn photon(state: &str, registered_at: u64) -> QuantumEntity {
    QuantumEntity {
        description: "Standard photon with dual nature".into(),
        current_state: StateLabel::new(state),
        wave_probability: 50,
        stability_factor: 75,
        adjustment_count: 0,
        observation_count: 0,
        transition_count: 0,
        registered_by: deployer(),
        registered_at,
    }
}

/// Test fixture manager backed by a temporary directory that is removed on drop
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    /// Create a new fixtures manager in a fresh temporary directory
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// The root directory of the fixtures
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Get a fixture file path
    pub fn path<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        self.dir.path().join(relative_path)
    }

    /// Write data to a fixture file and return its path
    pub fn write<P: AsRef<Path>, C: AsRef<[u8]>>(
        &self,
        relative_path: P,
        contents: C,
    ) -> io::Result<PathBuf> {
        let path = self.path(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Serialize a JSON value into a fixture file and return its path
    pub fn write_json<P: AsRef<Path>>(
        &self,
        relative_path: P,
        value: &serde_json::Value,
    ) -> io::Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        self.write(relative_path, bytes)
    }

    /// Read a fixture file as a string
    pub fn read_string<P: AsRef<Path>>(&self, relative_path: P) -> io::Result<String> {
        fs::read_to_string(self.path(relative_path))
    }
}
