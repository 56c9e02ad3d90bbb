use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::Utc;
use fieldbook_sheet::SheetRecord;
use fieldbook_types::{new_id, Constituency, Mandal, Member, Panchayat, UnitType};
use indexmap::IndexMap;

use crate::directory::Directory;
use crate::error::{Result, StoreError};

/// Tally of one bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub added: usize,
    pub skipped: usize,
}

/// Read a tabular file as loose string records, one map per data row,
/// keyed by the first-row headers.
///
/// CSV goes through the csv crate with trimming; xlsx/xls read the first
/// sheet only, which matches how directory exports are laid out. Missing
/// cells come back as empty strings, and fully blank rows are dropped.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<IndexMap<String, String>>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "csv" => csv_records(path),
        "xlsx" | "xlsm" | "xls" => sheet_records(path),
        other => Err(StoreError::UnsupportedExtension(other.to_string())),
    }
}

fn csv_records(path: &Path) -> Result<Vec<IndexMap<String, String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn sheet_records(path: &Path) -> Result<Vec<IndexMap<String, String>>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| StoreError::Decode(e.to_string()))?;
    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Vec::new());
    };
    let raw: Vec<String> = header_row.iter().map(data_to_string).collect();
    let headers = SheetRecord::unique_columns(&raw);

    let mut rows = Vec::new();
    for row in rows_iter {
        if row.iter().all(|d| matches!(d, Data::Empty)) {
            continue;
        }
        let keyed = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                (
                    h.clone(),
                    row.get(i).map(data_to_string).unwrap_or_default(),
                )
            })
            .collect();
        rows.push(keyed);
    }
    Ok(rows)
}

fn data_to_string(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::Int(i) => i.to_string(),
        // whole floats print as integers, like phone numbers typed into Excel
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR: {e:?}"),
    }
}

/// First non-empty trimmed value among the aliases a column goes by.
fn field<'a>(row: &'a IndexMap<String, String>, keys: &[&str]) -> &'a str {
    for key in keys {
        if let Some(value) = row.get(*key) {
            let value = value.trim();
            if !value.is_empty() {
                return value;
            }
        }
    }
    ""
}

/// Map one loose record onto a member, resolving the owning unit against
/// the directory: panchayat wins over mandal over constituency; a bare
/// unit name column is treated as a constituency. Rows with no name or no
/// resolvable unit are skipped.
#[must_use]
pub fn normalize_member_row(dir: &Directory, row: &IndexMap<String, String>) -> Option<Member> {
    let name = field(row, &["Name", "name"]);
    if name.is_empty() {
        return None;
    }

    let panchayat = field(row, &["Panchayat", "panchayat", "panchayatName"]);
    let mandal = field(row, &["Mandal", "mandal", "mandalName"]);
    let constituency = field(row, &["Constituency", "constituency", "constituencyName"]);
    let unit_name = field(row, &["unitName", "Unit Name"]);

    let (unit_type, resolved_name) = if !panchayat.is_empty() {
        (UnitType::Panchayat, panchayat)
    } else if !mandal.is_empty() {
        (UnitType::Mandal, mandal)
    } else if !constituency.is_empty() {
        (UnitType::Constituency, constituency)
    } else if !unit_name.is_empty() {
        (UnitType::Constituency, unit_name)
    } else {
        return None;
    };

    let unit_id = match unit_type {
        UnitType::Constituency => dir.constituency_by_name(resolved_name).map(|c| c.id.clone()),
        UnitType::Mandal => dir.mandal_by_name(resolved_name).map(|m| m.id.clone()),
        UnitType::Panchayat => dir.panchayat_by_name(resolved_name).map(|p| p.id.clone()),
    }?;

    let phone = field(row, &["Phone", "phone"]).to_string();
    Some(Member {
        id: new_id(),
        name: name.to_string(),
        role: "IT Wing".to_string(),
        unit_type: Some(unit_type),
        unit_id,
        whatsapp: phone.clone(),
        phone,
        village: field(row, &["Village", "village"]).to_string(),
        party_position: field(row, &["Party Position", "partyPosition"]).to_string(),
        present_city: field(row, &["Present City", "presentCity"]).to_string(),
        present_area: field(row, &["Present Area", "presentArea"]).to_string(),
        country: field(row, &["Country", "country"]).to_string(),
        working: field(row, &["Working", "working"]).to_string(),
        qualification: field(row, &["Qualification", "qualification"]).to_string(),
        caste: field(row, &["Cast", "caste"]).to_string(),
        join_date: Utc::now().format("%Y-%m-%d").to_string(),
        tags: vec!["IT".to_string()],
        ..Default::default()
    })
}

/// Constituency row: name required, district optional. Re-importing a
/// known name keeps its id so references stay valid.
#[must_use]
pub fn normalize_constituency_row(
    dir: &Directory,
    row: &IndexMap<String, String>,
) -> Option<Constituency> {
    let name = field(row, &["name", "Name"]);
    if name.is_empty() {
        return None;
    }
    let id = dir
        .constituency_by_name(name)
        .map_or_else(new_id, |c| c.id.clone());
    Some(Constituency {
        id,
        name: name.to_string(),
        district: field(row, &["district", "District"]).to_string(),
    })
}

/// Mandal row: name plus a resolvable constituency name.
#[must_use]
pub fn normalize_mandal_row(dir: &Directory, row: &IndexMap<String, String>) -> Option<Mandal> {
    let name = field(row, &["name", "Name"]);
    let constituency = field(row, &["constituencyName", "Constituency"]);
    if name.is_empty() || constituency.is_empty() {
        return None;
    }
    let constituency_id = dir.constituency_by_name(constituency)?.id.clone();
    let id = dir.mandal_by_name(name).map_or_else(new_id, |m| m.id.clone());
    Some(Mandal {
        id,
        name: name.to_string(),
        constituency_id,
    })
}

/// Panchayat row: name plus a resolvable mandal name.
#[must_use]
pub fn normalize_panchayat_row(
    dir: &Directory,
    row: &IndexMap<String, String>,
) -> Option<Panchayat> {
    let name = field(row, &["name", "Name"]);
    let mandal = field(row, &["mandalName", "Mandal"]);
    if name.is_empty() || mandal.is_empty() {
        return None;
    }
    let mandal_id = dir.mandal_by_name(mandal)?.id.clone();
    let id = dir
        .panchayat_by_name(name)
        .map_or_else(new_id, |p| p.id.clone());
    Some(Panchayat {
        id,
        name: name.to_string(),
        mandal_id,
    })
}

pub fn import_constituencies<P: AsRef<Path>>(dir: &mut Directory, path: P) -> Result<ImportOutcome> {
    let rows = read_records(path)?;
    let mut outcome = ImportOutcome::default();
    for row in &rows {
        match normalize_constituency_row(dir, row) {
            Some(record) => {
                dir.constituencies.upsert(record);
                outcome.added += 1;
            }
            None => outcome.skipped += 1,
        }
    }
    Ok(outcome)
}

pub fn import_mandals<P: AsRef<Path>>(dir: &mut Directory, path: P) -> Result<ImportOutcome> {
    let rows = read_records(path)?;
    let mut outcome = ImportOutcome::default();
    for row in &rows {
        match normalize_mandal_row(dir, row) {
            Some(record) => {
                dir.mandals.upsert(record);
                outcome.added += 1;
            }
            None => outcome.skipped += 1,
        }
    }
    Ok(outcome)
}

pub fn import_panchayats<P: AsRef<Path>>(dir: &mut Directory, path: P) -> Result<ImportOutcome> {
    let rows = read_records(path)?;
    let mut outcome = ImportOutcome::default();
    for row in &rows {
        match normalize_panchayat_row(dir, row) {
            Some(record) => {
                dir.panchayats.upsert(record);
                outcome.added += 1;
            }
            None => outcome.skipped += 1,
        }
    }
    Ok(outcome)
}

pub fn import_members<P: AsRef<Path>>(dir: &mut Directory, path: P) -> Result<ImportOutcome> {
    let rows = read_records(path)?;
    let mut outcome = ImportOutcome::default();
    for row in &rows {
        match normalize_member_row(dir, row) {
            Some(member) => {
                dir.members.upsert(member);
                outcome.added += 1;
            }
            None => {
                tracing::debug!("skipping member row without name or resolvable unit");
                outcome.skipped += 1;
            }
        }
    }
    Ok(outcome)
}
