//! Parser for `.pb` files: `META`, `PROJECTS` and `VOTES` sections of
//! semicolon-separated rows.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::election::{Ballot, Project};
use crate::domain::foundation::ProjectId;
use crate::ports::LoadError;

const META: &str = "META";
const PROJECTS: &str = "PROJECTS";
const VOTES: &str = "VOTES";

/// Contents of one `.pb` file.
#[derive(Debug, Clone, PartialEq)]
pub struct PbFile {
    pub path: PathBuf,
    pub meta: BTreeMap<String, String>,
    pub projects: Vec<Project>,
    pub ballots: Vec<Ballot>,
}

impl PbFile {
    /// Nominal budget declared in `META`.
    pub fn budget(&self) -> Result<u64, LoadError> {
        meta_budget(&self.path, &self.meta)
    }

    /// District name; `None` for the citywide file.
    pub fn subunit(&self) -> Option<&str> {
        self.meta.get("subunit").map(String::as_str)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Meta,
    Projects,
    Votes,
}

/// Parses a whole file.
pub fn parse_pb(path: &Path, content: &str) -> Result<PbFile, LoadError> {
    let mut section = Section::Preamble;
    let mut seen = HashSet::new();
    let mut meta = BTreeMap::new();
    let mut project_table = Table::default();
    let mut vote_table = Table::default();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            META => section = Section::Meta,
            PROJECTS => section = Section::Projects,
            VOTES => section = Section::Votes,
            _ => {
                match section {
                    Section::Preamble => {
                        return Err(malformed(path, line_no, "content before META section"))
                    }
                    Section::Meta => {
                        let (key, value) = line
                            .split_once(';')
                            .ok_or_else(|| malformed(path, line_no, "expected key;value"))?;
                        let (key, value) = (unquote(key), unquote(value));
                        if key != "key" {
                            meta.insert(key, value);
                        }
                    }
                    Section::Projects => project_table.push(line_no, split_row(line)),
                    Section::Votes => vote_table.push(line_no, split_row(line)),
                }
                continue;
            }
        }
        seen.insert(line);
    }

    for required in [META, PROJECTS, VOTES] {
        if !seen.contains(required) {
            return Err(LoadError::MissingSection {
                path: path.to_path_buf(),
                section: required,
            });
        }
    }

    meta_budget(path, &meta)?;
    let projects = parse_projects(path, &project_table)?;
    let known: HashSet<ProjectId> = projects.iter().map(|p| p.id).collect();
    let ballots = parse_votes(path, &vote_table, &known)?;

    Ok(PbFile {
        path: path.to_path_buf(),
        meta,
        projects,
        ballots,
    })
}

/// Reads only the `META` section, stopping at `PROJECTS`.
pub fn parse_meta(path: &Path, content: &str) -> Result<BTreeMap<String, String>, LoadError> {
    let mut meta = BTreeMap::new();
    let mut in_meta = false;
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            META => in_meta = true,
            PROJECTS => return Ok(meta),
            _ if in_meta => {
                let (key, value) = line
                    .split_once(';')
                    .ok_or_else(|| malformed(path, index + 1, "expected key;value"))?;
                let (key, value) = (unquote(key), unquote(value));
                if key != "key" {
                    meta.insert(key, value);
                }
            }
            _ => return Err(malformed(path, index + 1, "content before META section")),
        }
    }
    if in_meta {
        Err(LoadError::MissingSection {
            path: path.to_path_buf(),
            section: PROJECTS,
        })
    } else {
        Err(LoadError::MissingSection {
            path: path.to_path_buf(),
            section: META,
        })
    }
}

pub(crate) fn meta_budget(path: &Path, meta: &BTreeMap<String, String>) -> Result<u64, LoadError> {
    let missing = || LoadError::MissingBudget {
        path: path.to_path_buf(),
    };
    let raw = meta.get("budget").ok_or_else(missing)?;
    let budget = parse_amount(raw).ok_or_else(missing)?;
    if budget == 0 {
        return Err(missing());
    }
    Ok(budget)
}

/// Header plus numbered rows of a section.
#[derive(Default)]
struct Table {
    header: Option<Vec<String>>,
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    fn push(&mut self, line_no: usize, cells: Vec<String>) {
        if self.header.is_none() {
            self.header = Some(cells);
        } else {
            self.rows.push((line_no, cells));
        }
    }

    fn column(&self, path: &Path, section: &'static str, names: &[&'static str]) -> Result<usize, LoadError> {
        self.find(names).ok_or(LoadError::MissingColumn {
            path: path.to_path_buf(),
            section,
            column: names[0],
        })
    }

    fn find(&self, names: &[&str]) -> Option<usize> {
        let header = self.header.as_ref()?;
        names
            .iter()
            .find_map(|name| header.iter().position(|h| h == name))
    }
}

fn parse_projects(path: &Path, table: &Table) -> Result<Vec<Project>, LoadError> {
    let id_col = table.column(path, PROJECTS, &["project_id"])?;
    let cost_col = table.column(path, PROJECTS, &["cost"])?;

    table
        .rows
        .iter()
        .map(|(line_no, cells)| {
            let id = cell(path, *line_no, cells, id_col)?;
            let id = id
                .parse::<ProjectId>()
                .map_err(|_| malformed(path, *line_no, format!("invalid project id '{}'", id)))?;
            let cost = cell(path, *line_no, cells, cost_col)?;
            let cost = parse_amount(cost)
                .ok_or_else(|| malformed(path, *line_no, format!("invalid cost '{}'", cost)))?;
            Ok(Project::new(id, cost))
        })
        .collect()
}

fn parse_votes(path: &Path, table: &Table, known: &HashSet<ProjectId>) -> Result<Vec<Ballot>, LoadError> {
    let voter_col = table.column(path, VOTES, &["voter_id"])?;
    let vote_col = table.column(path, VOTES, &["vote"])?;
    let district_col = table.find(&["neighborhood", "district"]);

    table
        .rows
        .iter()
        .map(|(line_no, cells)| {
            let voter = cell(path, *line_no, cells, voter_col)?;
            let voter = voter
                .parse()
                .map_err(|_| malformed(path, *line_no, format!("invalid voter id '{}'", voter)))?;

            // trailing empty cells may be dropped by exporters
            let votes = cells.get(vote_col).map(String::as_str).unwrap_or("");
            let mut approvals = Vec::new();
            for vote in votes.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                let id: ProjectId = vote
                    .parse()
                    .map_err(|_| malformed(path, *line_no, format!("invalid vote '{}'", vote)))?;
                if !known.contains(&id) {
                    return Err(LoadError::UnknownVotedProject {
                        path: path.to_path_buf(),
                        project: id,
                    });
                }
                approvals.push(id);
            }

            let ballot = Ballot::new(voter, approvals);
            Ok(match district_col.and_then(|c| cells.get(c)).filter(|d| !d.is_empty()) {
                Some(district) => ballot.with_district(district.clone()),
                None => ballot,
            })
        })
        .collect()
}

fn cell<'a>(path: &Path, line_no: usize, cells: &'a [String], col: usize) -> Result<&'a str, LoadError> {
    cells
        .get(col)
        .map(String::as_str)
        .ok_or_else(|| malformed(path, line_no, format!("missing column {}", col + 1)))
}

/// Integer amount; a float with no fractional part is accepted too.
fn parse_amount(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
    })
}

/// Splits a row on `;`, honouring double-quoted cells.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ';' if !quoted => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::MalformedLine {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTRICT: &str = "META\n\
key;value\n\
description;\"Bemowo; 2023\"\n\
budget;1000\n\
subunit;Bemowo\n\
PROJECTS\n\
project_id;cost;name\n\
1;600;\"Park; phase 1\"\n\
2;300;Library\n\
VOTES\n\
voter_id;vote;neighborhood\n\
10;1,2;Bemowo\n\
11;2;\n\
12;;Bemowo\n";

    fn path() -> PathBuf {
        PathBuf::from("bemowo.pb")
    }

    #[test]
    fn parse_pb_reads_every_section() {
        let file = parse_pb(&path(), DISTRICT).unwrap();
        assert_eq!(file.budget().unwrap(), 1000);
        assert_eq!(file.subunit(), Some("Bemowo"));
        assert_eq!(file.meta["description"], "Bemowo; 2023");
        assert_eq!(file.projects, vec![Project::new(1, 600), Project::new(2, 300)]);
        assert_eq!(file.ballots.len(), 3);
        assert_eq!(file.ballots[0], Ballot::new(10, [1, 2]).with_district("Bemowo"));
        assert_eq!(file.ballots[1].district, None);
        assert!(file.ballots[2].approvals.is_empty());
    }

    #[test]
    fn parse_pb_tolerates_crlf_and_district_column() {
        let content = "META\r\nbudget;50\r\nPROJECTS\r\nproject_id;cost\r\n3;50\r\nVOTES\r\nvoter_id;vote;district\r\n1;3;north\r\n";
        let file = parse_pb(&path(), content).unwrap();
        assert_eq!(file.subunit(), None);
        assert_eq!(file.ballots[0].district.as_deref(), Some("north"));
    }

    #[test]
    fn parse_pb_requires_every_section() {
        let content = "META\nbudget;50\nPROJECTS\nproject_id;cost\n3;50\n";
        let err = parse_pb(&path(), content).unwrap_err();
        assert!(matches!(err, LoadError::MissingSection { section: "VOTES", .. }));
    }

    #[test]
    fn parse_pb_requires_budget() {
        let content = "META\nsubunit;x\nPROJECTS\nproject_id;cost\nVOTES\nvoter_id;vote\n";
        assert!(matches!(
            parse_pb(&path(), content),
            Err(LoadError::MissingBudget { .. })
        ));
    }

    #[test]
    fn parse_pb_rejects_zero_budget() {
        let content = "META\nbudget;0\nPROJECTS\nproject_id;cost\nVOTES\nvoter_id;vote\n";
        assert!(matches!(
            parse_pb(&path(), content),
            Err(LoadError::MissingBudget { .. })
        ));
    }

    #[test]
    fn parse_pb_reports_missing_column() {
        let content = "META\nbudget;50\nPROJECTS\nid;cost\nVOTES\nvoter_id;vote\n";
        let err = parse_pb(&path(), content).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                section: "PROJECTS",
                column: "project_id",
                ..
            }
        ));
    }

    #[test]
    fn parse_pb_reports_line_of_bad_cost() {
        let content = "META\nbudget;50\nPROJECTS\nproject_id;cost\n1;cheap\nVOTES\nvoter_id;vote\n";
        let err = parse_pb(&path(), content).unwrap_err();
        assert!(matches!(err, LoadError::MalformedLine { line: 5, .. }));
    }

    #[test]
    fn parse_pb_rejects_votes_for_unlisted_projects() {
        let content = "META\nbudget;50\nPROJECTS\nproject_id;cost\n1;10\nVOTES\nvoter_id;vote\n1;1,9\n";
        let err = parse_pb(&path(), content).unwrap_err();
        assert!(matches!(err, LoadError::UnknownVotedProject { project: 9, .. }));
    }

    #[test]
    fn parse_meta_stops_at_projects() {
        let meta = parse_meta(&path(), "META\nkey;value\nbudget;70\nPROJECTS\ngarbage\n").unwrap();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["budget"], "70");
    }

    #[test]
    fn split_row_handles_quotes() {
        assert_eq!(
            split_row(r#"1;"a;b";"say ""hi""""#),
            vec!["1", "a;b", r#"say "hi""#]
        );
    }

    #[test]
    fn parse_amount_accepts_integral_floats() {
        assert_eq!(parse_amount("1500"), Some(1500));
        assert_eq!(parse_amount("1500.0"), Some(1500));
        assert_eq!(parse_amount("1500.5"), None);
        assert_eq!(parse_amount("-3"), None);
    }
}
