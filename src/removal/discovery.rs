//! Pure helpers for endpoint discovery and member resolution
//!
//! Nothing here performs I/O; each function works on snapshots that the
//! orchestrator fetched for the current attempt.

use crate::k8s::PodRecord;
use crate::store::{Member, MembershipList};

/// Ordered store client addresses discovered among sibling pods.
pub type EndpointSet = Vec<String>;

/// What identifies a store container and the port its clients use.
#[derive(Debug, Clone, Copy)]
pub struct EndpointFilter<'a> {
    pub image_prefix: &'a str,
    pub port_name: &'a str,
    pub scheme: &'a str,
}

pub fn sibling_selector(label_key: &str, label_value: &str) -> String {
    format!("{}={}", label_key, label_value)
}

/// Collect `<pod>.<label-value>.<namespace>.svc:<port>` for every store
/// container port named `filter.port_name`, in sibling order.
pub fn discover_endpoints(
    siblings: &[PodRecord],
    label_value: &str,
    filter: EndpointFilter<'_>,
) -> EndpointSet {
    siblings
        .iter()
        .flat_map(move |pod| {
            pod.containers
                .iter()
                .filter(move |c| c.image.starts_with(filter.image_prefix))
                .flat_map(|c| c.ports.iter())
                .filter(move |p| p.name.as_deref() == Some(filter.port_name))
                .map(move |p| {
                    format!(
                        "{}://{}.{}.{}.svc:{}",
                        filter.scheme, pod.name, label_value, pod.namespace, p.container_port
                    )
                })
        })
        .collect()
}

/// The member registered under the pod's name, if the pod ever joined.
pub fn resolve_target<'a>(members: &'a MembershipList, pod_name: &str) -> Option<&'a Member> {
    members.find_by_name(pod_name)
}
