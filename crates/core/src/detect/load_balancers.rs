use tracing::debug;

use crate::detect::{DetectResult, UnusedLoadBalancer};
use crate::model::Region;
use crate::snapshot::{
    ClassicLoadBalancer, ClassicLoadBalancersDocument, LoadBalancer, LoadBalancersDocument,
    TargetGroupsDocument, TargetHealthDocument,
};
use crate::store::{fetch_document, fetch_parameter_document, ResourceStore, StoreResult};

/// `Type` reported for first-generation load balancers.
pub const CLASSIC_LOAD_BALANCER_TYPE: &str = "classic";

/// A classic load balancer is unused when its registered-instance list is empty.
///
/// A description without an instance list at all is not reported.
pub fn is_classic_unused(lb: &ClassicLoadBalancer) -> bool {
    lb.instances.as_ref().is_some_and(|instances| instances.is_empty())
}

/// Whether any target group of a v2 load balancer has at least one registered target.
///
/// Stops at the first target group with a target-health entry.
pub fn has_live_targets(
    store: &dyn ResourceStore,
    region: &Region,
    lb: &LoadBalancer,
) -> StoreResult<bool> {
    let Some(groups) =
        fetch_parameter_document::<TargetGroupsDocument>(store, region, &lb.load_balancer_arn)?
    else {
        return Ok(false);
    };

    for group in &groups.target_groups {
        let health = fetch_parameter_document::<TargetHealthDocument>(
            store,
            region,
            &group.target_group_arn,
        )?;
        let targets = health.map(|h| h.target_health_descriptions.len()).unwrap_or(0);
        if targets > 0 {
            debug!(
                load_balancer = %lb.load_balancer_name,
                target_group = %group.target_group_arn,
                targets,
                "load balancer has live targets"
            );
            return Ok(true);
        }
    }
    Ok(false)
}

/// Load balancers with no active targets, classic ones first.
pub fn find_unused_load_balancers(
    store: &dyn ResourceStore,
    region: &Region,
) -> DetectResult<Vec<UnusedLoadBalancer>> {
    let classic: ClassicLoadBalancersDocument = fetch_document(store, region)?;
    let mut unused: Vec<UnusedLoadBalancer> = classic
        .load_balancer_descriptions
        .into_iter()
        .filter(is_classic_unused)
        .map(|lb| UnusedLoadBalancer {
            name: lb.load_balancer_name,
            kind: CLASSIC_LOAD_BALANCER_TYPE.to_string(),
        })
        .collect();

    let v2: LoadBalancersDocument = fetch_document(store, region)?;
    for lb in v2.load_balancers {
        if has_live_targets(store, region, &lb)? {
            continue;
        }
        unused.push(UnusedLoadBalancer { name: lb.load_balancer_name, kind: lb.kind });
    }

    debug!(region = %region, count = unused.len(), "unused load balancers");
    Ok(unused)
}
