//! The global instance: every group merged into one allocation universe.

use std::collections::{BTreeMap, HashMap};

use super::{Ballot, Group, Project, Selection, SpendingBounds};
use crate::domain::foundation::{GroupKey, ProjectId, ValidationError, VoterId};

/// All groups of one participatory budgeting run.
///
/// Project ids are unique across groups; construction rejects collisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Election {
    groups: BTreeMap<GroupKey, Group>,
    owners: HashMap<ProjectId, GroupKey>,
}

impl Election {
    /// Builds an election from its groups.
    ///
    /// # Errors
    /// - `Duplicate` if two groups share a key
    /// - `Duplicate` if a project id appears in more than one group
    pub fn new(groups: impl IntoIterator<Item = Group>) -> Result<Self, ValidationError> {
        let mut by_key = BTreeMap::new();
        let mut owners = HashMap::new();

        for group in groups {
            for project in &group.projects {
                if owners.insert(project.id, group.key.clone()).is_some() {
                    return Err(ValidationError::duplicate("project id", project.id));
                }
            }
            if by_key.contains_key(&group.key) {
                return Err(ValidationError::duplicate("group", &group.key));
            }
            by_key.insert(group.key.clone(), group);
        }

        Ok(Self {
            groups: by_key,
            owners,
        })
    }

    /// Applies spending bounds to the named groups.
    ///
    /// # Errors
    /// `UnknownReference` if a key names no group; nothing is applied then.
    pub fn with_bounds(
        mut self,
        bounds: &BTreeMap<GroupKey, SpendingBounds>,
    ) -> Result<Self, ValidationError> {
        if let Some(unknown) = bounds.keys().find(|key| !self.groups.contains_key(*key)) {
            return Err(ValidationError::unknown_reference("group", unknown));
        }
        for (key, bound) in bounds {
            if let Some(group) = self.groups.get_mut(key) {
                group.bounds = *bound;
            }
        }
        Ok(self)
    }

    /// Groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Group keys in order.
    pub fn group_keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.keys()
    }

    /// Looks a group up by key.
    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Sum of every group's nominal budget.
    pub fn total_budget(&self) -> u64 {
        self.groups.values().map(|g| g.budget).sum()
    }

    /// Every project of every group, in group order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.groups.values().flat_map(|g| g.projects.iter())
    }

    /// Looks a project up by id.
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        let owner = self.owner_of(id)?;
        self.groups.get(owner)?.projects.iter().find(|p| p.id == id)
    }

    /// Key of the group owning the project.
    pub fn owner_of(&self, id: ProjectId) -> Option<&GroupKey> {
        self.owners.get(&id)
    }

    /// Spending bounds per group.
    pub fn bounds(&self) -> BTreeMap<GroupKey, SpendingBounds> {
        self.groups
            .iter()
            .map(|(key, group)| (key.clone(), group.bounds))
            .collect()
    }

    /// Ballots with approvals of voters sharing an id concatenated across groups.
    pub fn merged_ballots(&self) -> Vec<Ballot> {
        let mut merged: BTreeMap<VoterId, Ballot> = BTreeMap::new();
        for ballot in self.groups.values().flat_map(|g| g.ballots.iter()) {
            merged
                .entry(ballot.voter_id)
                .and_modify(|existing| existing.absorb(ballot))
                .or_insert_with(|| ballot.clone());
        }
        merged.into_values().collect()
    }

    /// One group holding every project, the merged ballots and the total budget.
    pub fn merged_group(&self) -> Group {
        Group {
            key: GroupKey::merged(),
            projects: self.projects().copied().collect(),
            ballots: self.merged_ballots(),
            budget: self.total_budget(),
            bounds: SpendingBounds::unconstrained(),
        }
    }

    /// Nominal cost of the selection. Ids outside the election are skipped.
    pub fn cost_of(&self, selection: &Selection) -> u64 {
        selection
            .iter()
            .filter_map(|id| self.project(*id))
            .map(|p| p.cost)
            .sum()
    }

    /// Returns true if the selection's nominal cost fits the total budget.
    pub fn can_afford(&self, selection: &Selection) -> bool {
        self.cost_of(selection) <= self.total_budget()
    }

    /// Nominal cost of the selection per group. Every group is present.
    pub fn costs_per_group(&self, selection: &Selection) -> BTreeMap<GroupKey, u64> {
        self.groups
            .iter()
            .map(|(key, group)| (key.clone(), group.cost_of(selection)))
            .collect()
    }

    /// Ids in the selection that belong to no group.
    pub fn unknown_projects<'a>(&'a self, selection: &'a Selection) -> impl Iterator<Item = ProjectId> + 'a {
        selection
            .iter()
            .copied()
            .filter(move |id| self.owner_of(*id).is_none())
    }
}
