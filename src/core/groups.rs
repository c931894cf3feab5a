/// Project grouping and fleet summary
///
/// Pure views over the container list, recomputed every refresh cycle.

use std::collections::BTreeMap;

use crate::core::docker::ContainerInfo;
use crate::utils::UNKNOWN_PROJECT;

/// Containers sharing one compose project label
#[derive(Debug, Clone)]
pub struct ProjectGroup {
    pub project: String,
    pub containers: Vec<ContainerInfo>,
}

impl ProjectGroup {
    pub fn running_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.status.is_running())
            .count()
    }
}

/// Fleet-wide counts shown in the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub running: usize,
    /// Distinct projects, not counting the "Unknown" bucket
    pub active_projects: usize,
}

/// Partition containers by project label, sorted by label with the
/// "Unknown" bucket last. Containers keep their listing order within
/// each group.
pub fn group_by_project(containers: &[ContainerInfo]) -> Vec<ProjectGroup> {
    let mut groups: BTreeMap<String, Vec<ContainerInfo>> = BTreeMap::new();

    for container in containers {
        groups
            .entry(container.project.clone())
            .or_default()
            .push(container.clone());
    }

    let unknown = groups.remove(UNKNOWN_PROJECT);

    let mut result: Vec<ProjectGroup> = groups
        .into_iter()
        .map(|(project, containers)| ProjectGroup { project, containers })
        .collect();

    if let Some(containers) = unknown {
        result.push(ProjectGroup {
            project: UNKNOWN_PROJECT.to_string(),
            containers,
        });
    }

    result
}

/// Derive fleet-wide counts from the container list.
pub fn summarize(containers: &[ContainerInfo]) -> Summary {
    let running = containers.iter().filter(|c| c.status.is_running()).count();

    let mut projects: Vec<&str> = containers
        .iter()
        .map(|c| c.project.as_str())
        .filter(|p| *p != UNKNOWN_PROJECT)
        .collect();
    projects.sort_unstable();
    projects.dedup();

    Summary {
        total: containers.len(),
        running,
        active_projects: projects.len(),
    }
}
