use serde::{Deserialize, Serialize};

use crate::detect::ResourceKind;
use crate::scan::AccountReport;

/// Allowed status values for scan runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanRunStatus {
    Succeeded,
    Failed,
}

impl ScanRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanRunStatus::Succeeded => "succeeded",
            ScanRunStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "succeeded" => Some(ScanRunStatus::Succeeded),
            "failed" => Some(ScanRunStatus::Failed),
            _ => None,
        }
    }
}

/// Record describing one scan (aggregator run) for bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRunRecord {
    /// Row id; `None` until the record has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub started_at: String,
    pub finished_at: String,
    pub status: ScanRunStatus,
    /// Names of the scanned accounts, in scan order.
    pub accounts: Vec<String>,
    pub regions: i64,
    pub findings: i64,
    /// SHA-256 over the snapshot files the scan read, if computed.
    pub data_digest: Option<String>,
    /// Error message for failed runs.
    pub error: Option<String>,
}

/// One unused resource as persisted for a scan run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingRecord {
    pub account_id: String,
    pub account_name: String,
    pub region: String,
    pub resource_type: ResourceKind,
    pub resource_id: String,
    /// The full unused-resource record as it appeared in the report.
    pub detail: serde_json::Value,
}

/// Flatten a full report into finding rows, in report order.
pub fn findings_from_reports(
    reports: &[AccountReport],
) -> Result<Vec<FindingRecord>, serde_json::Error> {
    let mut out = Vec::new();
    for account in reports {
        for region in &account.regions {
            for (kind, resources) in &region.unused_resources {
                for resource in resources {
                    out.push(FindingRecord {
                        account_id: account.account.id.clone(),
                        account_name: account.account.name.clone(),
                        region: region.region.clone(),
                        resource_type: *kind,
                        resource_id: resource.id().to_string(),
                        detail: serde_json::to_value(resource)?,
                    });
                }
            }
        }
    }
    Ok(out)
}
