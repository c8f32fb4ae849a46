//! Split manifests: a serializable record of a generated split set, its
//! configuration, and the leakage audit that was run against it.
//!
//! The manifest is what gets persisted next to model artifacts so a later
//! run can verify it trained on the same windows. The config fingerprint
//! makes two manifests comparable without diffing the full record list.

use serde::{Deserialize, Serialize};

use crate::audit::{audit, LeakageReport};
use crate::splitter::{SplitConfig, SplitSpec};

/// One split plus the audit findings for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRecord {
    pub spec: SplitSpec,
    pub leakage: LeakageReport,
}

/// A full split set with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitManifest {
    pub split_method: String,
    pub n_indices: usize,
    pub config: SplitConfig,
    pub records: Vec<SplitRecord>,
}

impl SplitManifest {
    /// Build a manifest from a generated split set, auditing it in the
    /// process. Splits and reports are zipped positionally; `audit` emits
    /// one report per split in split order.
    pub fn build(n_indices: usize, config: SplitConfig, splits: Vec<SplitSpec>) -> Self {
        let reports = audit(&splits);
        let records = splits
            .into_iter()
            .zip(reports)
            .map(|(spec, leakage)| SplitRecord { spec, leakage })
            .collect();
        Self {
            split_method: "walk_forward".to_string(),
            n_indices,
            config,
            records,
        }
    }

    /// Deterministic hash of the split configuration and index domain.
    ///
    /// Two manifests with the same fingerprint were generated from identical
    /// settings and can share cached downstream artifacts.
    pub fn config_fingerprint(&self) -> String {
        #[derive(Serialize)]
        struct FingerprintInput<'a> {
            split_method: &'a str,
            n_indices: usize,
            config: &'a SplitConfig,
        }
        let input = FingerprintInput {
            split_method: &self.split_method,
            n_indices: self.n_indices,
            config: &self.config,
        };
        let json = serde_json::to_string(&input).expect("manifest fingerprint serialization");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }

    /// Whether any split in the manifest carries a leakage finding.
    pub fn has_leakage(&self) -> bool {
        self.records.iter().any(|r| r.leakage.has_leakage)
    }
}
