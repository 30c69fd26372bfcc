use k8s_openapi::api::core::v1::{Container, Pod};
use std::collections::BTreeMap;

/// Read-only snapshot of a pod, taken at decision time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub containers: Vec<ContainerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub ports: Vec<PortRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortRecord {
    pub name: Option<String>,
    pub container_port: i32,
}

impl PodRecord {
    pub fn from_k8s_pod(pod: &Pod) -> Self {
        let metadata = &pod.metadata;

        let containers = pod
            .spec
            .as_ref()
            .map(|s| s.containers.iter().map(ContainerRecord::from_k8s_container).collect())
            .unwrap_or_default();

        Self {
            name: metadata.name.clone().unwrap_or_default(),
            namespace: metadata.namespace.clone().unwrap_or_default(),
            labels: metadata.labels.clone().unwrap_or_default(),
            containers,
        }
    }

    /// Value of `key`, treating an empty value the same as a missing one.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl ContainerRecord {
    fn from_k8s_container(container: &Container) -> Self {
        let ports = container
            .ports
            .as_ref()
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| PortRecord {
                        name: p.name.clone(),
                        container_port: p.container_port,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: container.name.clone(),
            image: container.image.clone().unwrap_or_default(),
            ports,
        }
    }
}
