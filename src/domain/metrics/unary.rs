//! Metrics of a single selection.
//!
//! Group-level functions see one group's projects, ballots and bounds.
//! The `*_over_groups` variants average a group-level function over every
//! group of the election.

use super::MetricValue;
use crate::domain::election::{Election, Group, Selection};

/// Mean number of approved projects that were selected. 0 without ballots.
pub fn average_satisfaction(group: &Group, selection: &Selection) -> MetricValue {
    if group.ballots.is_empty() {
        return MetricValue::Ratio(0.0);
    }
    let total: usize = group.ballots.iter().map(|b| b.overlap(selection)).sum();
    MetricValue::Ratio(total as f64 / group.ballots.len() as f64)
}

pub fn cost(group: &Group, selection: &Selection) -> MetricValue {
    MetricValue::Count(group.cost_of(selection))
}

pub fn budget_usage(group: &Group, selection: &Selection) -> MetricValue {
    MetricValue::Ratio(group.cost_of(selection) as f64 / group.budget as f64)
}

pub fn number_of_selected_projects(group: &Group, selection: &Selection) -> MetricValue {
    MetricValue::Count(group.selected_count(selection) as u64)
}

/// Spend divided by the lower bound; 0 when there is none.
pub fn lower_constraint_satisfaction(group: &Group, selection: &Selection) -> MetricValue {
    match group.bounds.lower_bound {
        Some(lower) => ratio(group.cost_of(selection), lower),
        None => MetricValue::Ratio(0.0),
    }
}

/// Spend divided by the upper bound; 1 when there is none.
pub fn upper_constraint_satisfaction(group: &Group, selection: &Selection) -> MetricValue {
    match group.bounds.upper_bound {
        Some(upper) => ratio(group.cost_of(selection), upper),
        None => MetricValue::Ratio(1.0),
    }
}

/// 1 if the lower bound is met or absent, else 0.
pub fn lower_bound_satisfied(group: &Group, selection: &Selection) -> MetricValue {
    let met = group
        .bounds
        .lower_bound
        .map_or(true, |lower| group.cost_of(selection) >= lower);
    indicator(met)
}

/// 1 if the upper bound is met or absent, else 0.
pub fn upper_bound_satisfied(group: &Group, selection: &Selection) -> MetricValue {
    let met = group
        .bounds
        .upper_bound
        .map_or(true, |upper| group.cost_of(selection) <= upper);
    indicator(met)
}

/// 1 when the lower bound is met or absent, otherwise spend / lower bound.
pub fn lower_bound_satisfaction(group: &Group, selection: &Selection) -> MetricValue {
    let spent = group.cost_of(selection);
    match group.bounds.lower_bound {
        Some(lower) if spent < lower => ratio(spent, lower),
        _ => MetricValue::Ratio(1.0),
    }
}

/// 1 when the upper bound is met or absent, otherwise spend / upper bound.
pub fn upper_bound_satisfaction(group: &Group, selection: &Selection) -> MetricValue {
    let spent = group.cost_of(selection);
    match group.bounds.upper_bound {
        Some(upper) if spent > upper => ratio(spent, upper),
        _ => MetricValue::Ratio(1.0),
    }
}

pub fn lower_bound_satisfied_over_groups(election: &Election, selection: &Selection) -> MetricValue {
    mean_over_groups(election, selection, lower_bound_satisfied)
}

pub fn upper_bound_satisfied_over_groups(election: &Election, selection: &Selection) -> MetricValue {
    mean_over_groups(election, selection, upper_bound_satisfied)
}

pub fn lower_bound_satisfaction_over_groups(election: &Election, selection: &Selection) -> MetricValue {
    mean_over_groups(election, selection, lower_bound_satisfaction)
}

pub fn upper_bound_satisfaction_over_groups(election: &Election, selection: &Selection) -> MetricValue {
    mean_over_groups(election, selection, upper_bound_satisfaction)
}

fn mean_over_groups(
    election: &Election,
    selection: &Selection,
    metric: fn(&Group, &Selection) -> MetricValue,
) -> MetricValue {
    let count = election.group_count();
    if count == 0 {
        return MetricValue::Ratio(0.0);
    }
    let sum: f64 = election
        .groups()
        .map(|group| metric(group, selection).as_f64())
        .sum();
    MetricValue::Ratio(sum / count as f64)
}

// zero bounds divide by one
fn ratio(spent: u64, bound: u64) -> MetricValue {
    MetricValue::Ratio(spent as f64 / bound.max(1) as f64)
}

fn indicator(met: bool) -> MetricValue {
    MetricValue::Ratio(if met { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::election::{Ballot, Project, SpendingBounds};
    use crate::domain::foundation::GroupKey;

    fn group(bounds: SpendingBounds) -> Group {
        Group::new(
            GroupKey::new("north").unwrap(),
            vec![Project::new(1, 40), Project::new(2, 30), Project::new(3, 50)],
            vec![
                Ballot::new(1, [1, 2]),
                Ballot::new(2, [2]),
                Ballot::new(3, [3]),
                Ballot::new(4, []),
            ],
            100,
        )
        .unwrap()
        .with_bounds(bounds)
    }

    fn selected() -> Selection {
        Selection::from([1, 2])
    }

    #[test]
    fn average_satisfaction_counts_overlap_per_ballot() {
        let value = average_satisfaction(&group(SpendingBounds::default()), &selected());
        assert_eq!(value, MetricValue::Ratio(0.75));
    }

    #[test]
    fn average_satisfaction_without_ballots_is_zero() {
        let mut g = group(SpendingBounds::default());
        g.ballots.clear();
        assert_eq!(average_satisfaction(&g, &selected()), MetricValue::Ratio(0.0));
    }

    #[test]
    fn cost_usage_and_count_only_see_group_projects() {
        let g = group(SpendingBounds::default());
        let selection = Selection::from([1, 2, 99]);
        assert_eq!(cost(&g, &selection), MetricValue::Count(70));
        assert_eq!(budget_usage(&g, &selection), MetricValue::Ratio(0.7));
        assert_eq!(number_of_selected_projects(&g, &selection), MetricValue::Count(2));
    }

    #[test]
    fn constraint_satisfaction_defaults_without_bounds() {
        let g = group(SpendingBounds::default());
        assert_eq!(lower_constraint_satisfaction(&g, &selected()), MetricValue::Ratio(0.0));
        assert_eq!(upper_constraint_satisfaction(&g, &selected()), MetricValue::Ratio(1.0));
        assert_eq!(lower_bound_satisfied(&g, &selected()), MetricValue::Ratio(1.0));
        assert_eq!(upper_bound_satisfied(&g, &selected()), MetricValue::Ratio(1.0));
    }

    #[test]
    fn lower_bound_metrics_report_shortfall() {
        let g = group(SpendingBounds::lower(140));
        assert_eq!(lower_constraint_satisfaction(&g, &selected()), MetricValue::Ratio(0.5));
        assert_eq!(lower_bound_satisfied(&g, &selected()), MetricValue::Ratio(0.0));
        assert_eq!(lower_bound_satisfaction(&g, &selected()), MetricValue::Ratio(0.5));
    }

    #[test]
    fn met_bounds_are_capped_at_one() {
        let g = group(SpendingBounds::between(35, 100));
        assert_eq!(lower_constraint_satisfaction(&g, &selected()), MetricValue::Ratio(2.0));
        assert_eq!(lower_bound_satisfaction(&g, &selected()), MetricValue::Ratio(1.0));
        assert_eq!(upper_bound_satisfaction(&g, &selected()), MetricValue::Ratio(1.0));
    }

    #[test]
    fn upper_bound_overspend_reports_ratio_above_one() {
        let g = group(SpendingBounds::upper(35));
        assert_eq!(upper_bound_satisfied(&g, &selected()), MetricValue::Ratio(0.0));
        assert_eq!(upper_bound_satisfaction(&g, &selected()), MetricValue::Ratio(2.0));
    }

    #[test]
    fn over_groups_averages_group_results() {
        let met = group(SpendingBounds::lower(70));
        let mut missed = Group::new(GroupKey::citywide(), vec![Project::new(4, 10)], vec![], 100).unwrap();
        missed.bounds = SpendingBounds::lower(50);
        let election = Election::new([met, missed]).unwrap();
        assert_eq!(
            lower_bound_satisfied_over_groups(&election, &selected()),
            MetricValue::Ratio(0.5)
        );
        assert_eq!(
            lower_bound_satisfaction_over_groups(&election, &selected()),
            MetricValue::Ratio(0.5)
        );
        assert_eq!(
            upper_bound_satisfied_over_groups(&election, &selected()),
            MetricValue::Ratio(1.0)
        );
    }

    #[test]
    fn metrics_are_pure() {
        let g = group(SpendingBounds::between(50, 60));
        let s = selected();
        assert_eq!(average_satisfaction(&g, &s), average_satisfaction(&g, &s));
        assert_eq!(upper_bound_satisfaction(&g, &s), upper_bound_satisfaction(&g, &s));
    }
}
