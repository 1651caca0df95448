//! Historical sprint data loaded from a header-driven CSV file

use crate::error::DataError;
use crate::record::{compare_sprint_ids, SprintRecord};
use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;
use std::path::Path;

const PROJECT_ID: &str = "project_id";
const SPRINT_ID: &str = "sprint_id";
const LABEL: &str = "delivery_risk";

/// Read-only collection of sprint records in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintHistory {
    records: Vec<SprintRecord>,
}

impl SprintHistory {
    pub fn new(records: Vec<SprintRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let history = Self::parse(&text)?;
        log::info!(
            "loaded {} sprint records for {} projects from {}",
            history.len(),
            history.projects().len(),
            path.display()
        );
        Ok(history)
    }

    /// Parse CSV text. Columns are matched by header name; extra columns are
    /// ignored and `delivery_risk` is optional.
    pub fn parse(text: &str) -> Result<Self, DataError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(DataError::Empty)?;
        let header: Vec<String> = split_csv_line(header)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let index: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let column = |name: &str| -> Result<usize, DataError> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };
        let project_col = column(PROJECT_ID)?;
        let sprint_col = column(SPRINT_ID)?;
        let numeric_cols = SprintRecord::NUMERIC_FIELDS
            .iter()
            .map(|name| column(name).map(|idx| (*name, idx)))
            .collect::<Result<Vec<_>, _>>()?;
        let label_col = index.get(LABEL).copied();

        let known: HashSet<&str> = SprintRecord::NUMERIC_FIELDS
            .iter()
            .copied()
            .chain([PROJECT_ID, SPRINT_ID, LABEL])
            .collect();
        for extra in header.iter().filter(|h| !known.contains(h.as_str())) {
            log::debug!("ignoring unrecognized column '{extra}'");
        }

        let mut records = Vec::new();
        for (line, raw) in lines {
            let cells = split_csv_line(raw);
            if cells.len() != header.len() {
                return Err(DataError::RowWidth {
                    line,
                    expected: header.len(),
                    found: cells.len(),
                });
            }

            let mut record = SprintRecord::zeroed(
                cells[project_col].trim(),
                cells[sprint_col].trim(),
            );
            for (name, idx) in &numeric_cols {
                let value = parse_number(&cells[*idx], line, name)?;
                if let Some(slot) = record.get_mut(name) {
                    *slot = value;
                }
            }
            if let Some(idx) = label_col {
                record.delivery_risk = parse_label(&cells[idx], line)?;
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[SprintRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&SprintRecord> {
        self.records.first()
    }

    /// Distinct project ids in first-seen order
    pub fn projects(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.project_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Sprints of one project ordered by sprint id
    pub fn project_sprints(&self, project_id: &str) -> Vec<&SprintRecord> {
        let mut sprints: Vec<&SprintRecord> = self
            .records
            .iter()
            .filter(|r| r.project_id == project_id)
            .collect();
        sprints.sort_by(|a, b| compare_sprint_ids(&a.sprint_id, &b.sprint_id));
        sprints
    }

    pub fn find(&self, project_id: &str, sprint_id: &str) -> Option<&SprintRecord> {
        self.records
            .iter()
            .find(|r| r.project_id == project_id && r.sprint_id == sprint_id)
    }

    /// The latest sprint of the same project strictly before `sprint_id`
    pub fn previous_sprint(&self, project_id: &str, sprint_id: &str) -> Option<&SprintRecord> {
        self.project_sprints(project_id)
            .into_iter()
            .filter(|r| compare_sprint_ids(&r.sprint_id, sprint_id).is_lt())
            .last()
    }

    pub fn latest_sprint(&self, project_id: &str) -> Option<&SprintRecord> {
        self.project_sprints(project_id).into_iter().last()
    }

    pub fn high_risk_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.is_labelled_high_risk())
            .count()
    }

    /// Share of labelled sprints that were high risk, or `None` without labels
    pub fn observed_risk_rate(&self) -> Option<f64> {
        let labelled: Vec<u8> = self.records.iter().filter_map(|r| r.delivery_risk).collect();
        if labelled.is_empty() {
            return None;
        }
        let positives = labelled.iter().filter(|l| **l == 1).count();
        Some(positives as f64 / labelled.len() as f64)
    }
}

fn parse_number(cell: &str, line: usize, column: &str) -> Result<f64, DataError> {
    let trimmed = cell.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::InvalidNumber {
            line,
            column: column.to_string(),
            value: trimmed.to_string(),
        })
}

fn parse_label(cell: &str, line: usize) -> Result<Option<u8>, DataError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(Some(0)),
        Ok(v) if v == 1.0 => Ok(Some(1)),
        _ => Err(DataError::InvalidLabel {
            line,
            value: trimmed.to_string(),
        }),
    }
}

/// Split one CSV line, honouring double-quoted cells with `""` escapes
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    cells.push(current);
    cells
}
