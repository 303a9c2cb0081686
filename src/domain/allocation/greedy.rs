//! Per-group greedy baseline: most approved affordable project first.

use std::collections::HashMap;

use crate::domain::election::{Election, Group, Selection};
use crate::domain::foundation::ProjectId;

/// Runs the greedy rule independently in every group and unions the picks.
pub fn greedy(election: &Election) -> Selection {
    election.groups().flat_map(greedy_for_group).collect()
}

/// Repeatedly selects the project with the most approvals that still fits the
/// group's remaining budget. Ties go to the smaller project id.
pub fn greedy_for_group(group: &Group) -> Selection {
    let votes: HashMap<ProjectId, usize> = group
        .projects
        .iter()
        .map(|p| (p.id, group.ballots.iter().filter(|b| b.approves(p.id)).count()))
        .collect();

    let mut ranked = group.projects.clone();
    ranked.sort_by(|a, b| votes[&b.id].cmp(&votes[&a.id]).then(a.id.cmp(&b.id)));

    let mut remaining = group.budget;
    let mut chosen = Selection::new();
    for project in ranked {
        if project.cost <= remaining {
            remaining -= project.cost;
            chosen.insert(project.id);
        }
    }
    chosen
}
