//! Report aggregation across accounts and regions.
//!
//! [`Scanner`] ties the snapshot store, region directory and graph builder
//! together and runs every detector for every region of every account. The
//! output preserves input account order and region-enumeration order.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::detect::{run_detector, DetectError, ResourceKind, UnusedResource};
use crate::graph::ResourceGraphBuilder;
use crate::model::{Account, Region};
use crate::store::{RegionDirectory, ResourceStore, StoreError};

/// Unused resources found in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionReport {
    pub region: String,
    /// Only resource types with at least one finding have a key.
    pub unused_resources: BTreeMap<ResourceKind, Vec<UnusedResource>>,
}

impl RegionReport {
    /// Build a report from raw detector output, dropping empty results.
    pub fn from_findings(
        region: impl Into<String>,
        mut findings: BTreeMap<ResourceKind, Vec<UnusedResource>>,
    ) -> Self {
        findings.retain(|_, found| !found.is_empty());
        Self { region: region.into(), unused_resources: findings }
    }

    pub fn finding_count(&self) -> usize {
        self.unused_resources.values().map(Vec::len).sum()
    }
}

/// All region reports of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub account: Account,
    pub regions: Vec<RegionReport>,
}

impl AccountReport {
    pub fn finding_count(&self) -> usize {
        self.regions.iter().map(RegionReport::finding_count).sum()
    }
}

/// Total number of unused-resource records across a full report.
pub fn finding_count(reports: &[AccountReport]) -> usize {
    reports.iter().map(AccountReport::finding_count).sum()
}

/// Total number of regions scanned across a full report.
pub fn region_count(reports: &[AccountReport]) -> usize {
    reports.iter().map(|a| a.regions.len()).sum()
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to enumerate regions for account '{account}': {source}")]
    Regions {
        account: String,
        #[source]
        source: StoreError,
    },

    #[error("Detecting unused {kind} failed for {account}/{region}: {source}")]
    Detector {
        account: String,
        region: String,
        kind: ResourceKind,
        #[source]
        source: DetectError,
    },
}

/// Runs every detector over the regions of a set of accounts.
pub struct Scanner<'a> {
    pub store: &'a dyn ResourceStore,
    pub regions: &'a dyn RegionDirectory,
    pub graph: &'a dyn ResourceGraphBuilder,
}

impl<'a> Scanner<'a> {
    pub fn new(
        store: &'a dyn ResourceStore,
        regions: &'a dyn RegionDirectory,
        graph: &'a dyn ResourceGraphBuilder,
    ) -> Self {
        Self { store, regions, graph }
    }

    /// Run all detectors for one region. Any detector failure aborts the region.
    pub fn scan_region(&self, region: &Region) -> Result<RegionReport, ScanError> {
        let mut findings = BTreeMap::new();
        for kind in ResourceKind::ALL {
            let found = run_detector(kind, self.store, self.graph, region).map_err(|source| {
                ScanError::Detector {
                    account: region.account.name.clone(),
                    region: region.name.clone(),
                    kind,
                    source,
                }
            })?;
            findings.insert(kind, found);
        }
        let report = RegionReport::from_findings(region.name.clone(), findings);
        debug!(region = %region, findings = report.finding_count(), "scanned region");
        Ok(report)
    }

    /// Scan every region the directory lists for `account`.
    pub fn scan_account(&self, account: &Account) -> Result<AccountReport, ScanError> {
        let descriptors = self
            .regions
            .regions(account)
            .map_err(|source| ScanError::Regions { account: account.name.clone(), source })?;

        let mut regions = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let region = Region::new(account.clone(), descriptor);
            regions.push(self.scan_region(&region)?);
        }

        let report = AccountReport { account: account.clone(), regions };
        info!(
            account = %account.name,
            regions = report.regions.len(),
            findings = report.finding_count(),
            "scanned account"
        );
        Ok(report)
    }

    /// Produce the full report, one entry per input account, in input order.
    pub fn run(&self, accounts: &[Account]) -> Result<Vec<AccountReport>, ScanError> {
        accounts.iter().map(|account| self.scan_account(account)).collect()
    }
}

/// Convenience entry point equivalent to `Scanner::new(..).run(accounts)`.
pub fn find_unused_resources(
    store: &dyn ResourceStore,
    regions: &dyn RegionDirectory,
    graph: &dyn ResourceGraphBuilder,
    accounts: &[Account],
) -> Result<Vec<AccountReport>, ScanError> {
    Scanner::new(store, regions, graph).run(accounts)
}
