//! Loads an election from a directory of `.pb` files.
//!
//! Each file is one group: files declaring a `subunit` are districts, the
//! single file without one is the citywide pool.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::constraints::{read_constraints, Constraints};
use super::parser::{meta_budget, parse_meta, parse_pb, PbFile};
use crate::domain::election::{Election, Group, SpendingBounds};
use crate::domain::foundation::{GroupKey, ValidationError};
use crate::ports::{ElectionSource, LoadError};

/// A data directory of `.pb` files, optionally with a constraints file.
#[derive(Debug, Clone)]
pub struct PabulibDirectory {
    data_dir: PathBuf,
    constraints_file: Option<PathBuf>,
}

impl PabulibDirectory {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            constraints_file: None,
        }
    }

    /// Applies bounds from `file_name` inside the data directory, when it exists.
    pub fn with_constraints_file(mut self, file_name: impl AsRef<Path>) -> Self {
        self.constraints_file = Some(self.data_dir.join(file_name));
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `.pb` files in the data directory, sorted by name. Not recursive.
    pub fn pb_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let io_err = |source| LoadError::Io {
            path: self.data_dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.data_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "pb") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Bounds at `lower` (and optionally `upper`) fractions of every group's budget.
    ///
    /// Reads only the `META` section of each file.
    pub fn budget_usage_constraints(
        &self,
        lower: f64,
        upper: Option<f64>,
    ) -> Result<Constraints, LoadError> {
        let mut constraints = Constraints::new();
        for path in self.pb_files()? {
            let meta = parse_meta(&path, &read(&path)?)?;
            let budget = meta_budget(&path, &meta)?;
            let key = match meta.get("subunit") {
                Some(name) => GroupKey::new(name.as_str())?,
                None => GroupKey::citywide(),
            };
            if constraints.contains_key(&key) {
                return Err(LoadError::DuplicateSubunit(key.to_string()));
            }
            constraints.insert(key, SpendingBounds::from_budget_usage(budget, Some(lower), upper));
        }
        Ok(constraints)
    }

    fn read_files(&self) -> Result<Vec<PbFile>, LoadError> {
        self.pb_files()?
            .iter()
            .map(|path| {
                debug!(path = %path.display(), "parsing pb file");
                parse_pb(path, &read(path)?)
            })
            .collect()
    }

    fn apply_constraints(&self, election: Election) -> Result<Election, LoadError> {
        let Some(path) = self.constraints_file.as_ref().filter(|p| p.is_file()) else {
            return Ok(election);
        };
        let constraints = read_constraints(path)?;
        info!(path = %path.display(), groups = constraints.len(), "applying constraints");
        election.with_bounds(&constraints).map_err(|e| match e {
            ValidationError::UnknownReference { value, .. } => LoadError::UnknownConstraintGroup(value),
            other => other.into(),
        })
    }
}

impl ElectionSource for PabulibDirectory {
    fn load(&self) -> Result<Election, LoadError> {
        let mut citywide: Option<PbFile> = None;
        let mut districts: BTreeMap<String, PbFile> = BTreeMap::new();

        for file in self.read_files()? {
            match file.subunit().map(str::to_string) {
                Some(name) => {
                    if districts.contains_key(&name) {
                        return Err(LoadError::DuplicateSubunit(name));
                    }
                    districts.insert(name, file);
                }
                None => {
                    if let Some(first) = &citywide {
                        return Err(LoadError::MultipleCitywide {
                            first: first.path.clone(),
                            second: file.path,
                        });
                    }
                    citywide = Some(file);
                }
            }
        }
        let citywide = citywide.ok_or(LoadError::NoCitywide)?;

        let mut groups = Vec::with_capacity(districts.len() + 1);
        for (name, file) in districts {
            let budget = file.budget()?;
            groups.push(Group::new(GroupKey::new(name)?, file.projects, file.ballots, budget)?);
        }
        let budget = citywide.budget()?;
        groups.push(Group::new(
            GroupKey::citywide(),
            citywide.projects,
            citywide.ballots,
            budget,
        )?);

        let election = Election::new(groups)?;
        info!(
            groups = election.group_count(),
            total_budget = election.total_budget(),
            "election loaded"
        );
        self.apply_constraints(election)
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pb(budget: u64, subunit: Option<&str>, projects: &[(u64, u64)], votes: &[(u64, &str)]) -> String {
        let mut out = String::from("META\nkey;value\n");
        out.push_str(&format!("budget;{}\n", budget));
        if let Some(name) = subunit {
            out.push_str(&format!("subunit;{}\n", name));
        }
        out.push_str("PROJECTS\nproject_id;cost\n");
        for (id, cost) in projects {
            out.push_str(&format!("{};{}\n", id, cost));
        }
        out.push_str("VOTES\nvoter_id;vote\n");
        for (voter, vote) in votes {
            out.push_str(&format!("{};{}\n", voter, vote));
        }
        out
    }

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a_city.pb"),
            pb(300, None, &[(1, 200)], &[(1, "1"), (2, "1")]),
        )
        .unwrap();
        fs::write(
            dir.path().join("b_north.pb"),
            pb(100, Some("north"), &[(2, 60), (3, 50)], &[(1, "2,3"), (3, "3")]),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a pb file").unwrap();
        dir
    }

    #[test]
    fn load_builds_one_group_per_file() {
        let dir = data_dir();
        let election = PabulibDirectory::new(dir.path()).load().unwrap();
        assert_eq!(election.group_count(), 2);
        assert_eq!(election.total_budget(), 400);
        assert_eq!(election.group("citywide").unwrap().projects.len(), 1);
        assert_eq!(election.group("north").unwrap().ballots.len(), 2);
        // voter 1 voted in both files
        let merged = election.merged_ballots();
        assert_eq!(merged[0].approvals.len(), 3);
    }

    #[test]
    fn load_requires_citywide_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("north.pb"), pb(100, Some("north"), &[], &[])).unwrap();
        assert!(matches!(
            PabulibDirectory::new(dir.path()).load(),
            Err(LoadError::NoCitywide)
        ));
    }

    #[test]
    fn load_rejects_second_citywide_file() {
        let dir = data_dir();
        fs::write(dir.path().join("c_city.pb"), pb(10, None, &[(9, 5)], &[])).unwrap();
        assert!(matches!(
            PabulibDirectory::new(dir.path()).load(),
            Err(LoadError::MultipleCitywide { .. })
        ));
    }

    #[test]
    fn load_rejects_duplicate_subunit() {
        let dir = data_dir();
        fs::write(dir.path().join("c_north.pb"), pb(10, Some("north"), &[(9, 5)], &[])).unwrap();
        assert!(matches!(
            PabulibDirectory::new(dir.path()).load(),
            Err(LoadError::DuplicateSubunit(name)) if name == "north"
        ));
    }

    #[test]
    fn load_rejects_project_ids_shared_between_files() {
        let dir = data_dir();
        fs::write(dir.path().join("c_south.pb"), pb(10, Some("south"), &[(1, 5)], &[])).unwrap();
        assert!(matches!(
            PabulibDirectory::new(dir.path()).load(),
            Err(LoadError::Invalid(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn load_applies_constraints_file() {
        let dir = data_dir();
        fs::write(
            dir.path().join("constraints.json"),
            r#"{"north": {"lower_bound": 50}}"#,
        )
        .unwrap();
        let election = PabulibDirectory::new(dir.path())
            .with_constraints_file("constraints.json")
            .load()
            .unwrap();
        assert_eq!(
            election.group("north").unwrap().bounds,
            SpendingBounds::lower(50)
        );
        assert!(election.group("citywide").unwrap().bounds.is_unconstrained());
    }

    #[test]
    fn load_without_constraints_file_leaves_groups_unconstrained() {
        let dir = data_dir();
        let election = PabulibDirectory::new(dir.path())
            .with_constraints_file("constraints.json")
            .load()
            .unwrap();
        assert!(election.groups().all(|g| g.bounds.is_unconstrained()));
    }

    #[test]
    fn load_rejects_constraints_for_unknown_group() {
        let dir = data_dir();
        fs::write(dir.path().join("constraints.json"), r#"{"south": 10}"#).unwrap();
        let result = PabulibDirectory::new(dir.path())
            .with_constraints_file("constraints.json")
            .load();
        assert!(matches!(result, Err(LoadError::UnknownConstraintGroup(g)) if g == "south"));
    }

    #[test]
    fn budget_usage_constraints_floor_every_group() {
        let dir = data_dir();
        let constraints = PabulibDirectory::new(dir.path())
            .budget_usage_constraints(0.333, Some(0.9))
            .unwrap();
        assert_eq!(constraints[&GroupKey::citywide()], SpendingBounds::between(99, 270));
        assert_eq!(
            constraints[&GroupKey::new("north").unwrap()],
            SpendingBounds::between(33, 90)
        );
    }
}
