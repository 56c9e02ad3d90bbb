use fieldbook_types::{Member, UnitType};
use rust_xlsxwriter::Workbook;

use crate::directory::Directory;
use crate::error::{Result, StoreError};

/// Column order of the member roster export, shared by both formats.
pub const MEMBER_EXPORT_HEADERS: [&str; 19] = [
    "Name",
    "Role",
    "Unit Type",
    "Unit Name",
    "District",
    "Phone",
    "WhatsApp",
    "Email",
    "Voter ID",
    "Village",
    "Party Position",
    "Present City",
    "Present Area",
    "Country",
    "Working",
    "Qualification",
    "Caste",
    "Join Date",
    "Tags",
];

/// Resolve a member's owning unit to display names.
///
/// The unit name is looked up by id in the directory; the district comes
/// from the constituency at the top of the member's chain (panchayat ->
/// mandal -> constituency). An unresolvable or missing unit renders as
/// `"-"` with an empty district rather than failing the export.
#[must_use]
pub fn resolve_unit_names(dir: &Directory, member: &Member) -> (String, String) {
    let constituency_of = |id: &str| dir.constituencies.get(id);
    match member.unit_type {
        Some(UnitType::Constituency) => {
            let c = constituency_of(&member.unit_id);
            (
                c.map_or_else(|| "-".to_string(), |c| c.name.clone()),
                c.map_or_else(String::new, |c| c.district.clone()),
            )
        }
        Some(UnitType::Mandal) => {
            let mandal = dir.mandals.get(&member.unit_id);
            let district = mandal
                .and_then(|m| constituency_of(&m.constituency_id))
                .map_or_else(String::new, |c| c.district.clone());
            (
                mandal.map_or_else(|| "-".to_string(), |m| m.name.clone()),
                district,
            )
        }
        Some(UnitType::Panchayat) => {
            let panchayat = dir.panchayats.get(&member.unit_id);
            let district = panchayat
                .and_then(|p| dir.mandals.get(&p.mandal_id))
                .and_then(|m| constituency_of(&m.constituency_id))
                .map_or_else(String::new, |c| c.district.clone());
            (
                panchayat.map_or_else(|| "-".to_string(), |p| p.name.clone()),
                district,
            )
        }
        None => ("-".to_string(), String::new()),
    }
}

fn member_row(dir: &Directory, member: &Member) -> Vec<String> {
    let (unit_name, district) = resolve_unit_names(dir, member);
    vec![
        member.name.clone(),
        member.role.clone(),
        member
            .unit_type
            .map_or_else(String::new, |u| u.as_str().to_string()),
        unit_name,
        district,
        member.phone.clone(),
        member.whatsapp.clone(),
        member.email.clone(),
        member.voter_id.clone(),
        member.village.clone(),
        member.party_position.clone(),
        member.present_city.clone(),
        member.present_area.clone(),
        member.country.clone(),
        member.working.clone(),
        member.qualification.clone(),
        member.caste.clone(),
        member.join_date.clone(),
        member.tags.join("|"),
    ]
}

/// Serialize the member roster as CSV, one row per member in directory
/// order, units joined to names.
pub fn export_members_csv(dir: &Directory) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(MEMBER_EXPORT_HEADERS)?;
    for member in dir.members.list() {
        writer.write_record(member_row(dir, member))?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Encode(e.to_string()))
}

/// Serialize the member roster as a single-sheet xlsx workbook named
/// `Members`, same columns as the CSV export.
pub fn export_members_xlsx(dir: &Directory) -> Result<Vec<u8>> {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet
        .set_name("Members")
        .map_err(|e| StoreError::Encode(e.to_string()))?;

    for (col, header) in MEMBER_EXPORT_HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
    }

    for (i, member) in dir.members.list().iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in member_row(dir, member).into_iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .write_string(row, col as u16, &value)
                    .map_err(|e| StoreError::Encode(e.to_string()))?;
            }
        }
    }

    book.save_to_buffer()
        .map_err(|e| StoreError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::read_records;
    use fieldbook_types::{Constituency, Mandal, Panchayat};
    use tempfile::tempdir;

    fn roster_directory() -> Directory {
        let mut dir = Directory::new();
        dir.constituencies.upsert(Constituency {
            id: "c1".to_string(),
            name: "Pileru".to_string(),
            district: "Annamayya".to_string(),
        });
        dir.mandals.upsert(Mandal {
            id: "m1".to_string(),
            name: "Kalikiri".to_string(),
            constituency_id: "c1".to_string(),
        });
        dir.panchayats.upsert(Panchayat {
            id: "p1".to_string(),
            name: "Gollapalli".to_string(),
            mandal_id: "m1".to_string(),
        });

        let mut ravi = Member::new("Ravi");
        ravi.unit_type = Some(UnitType::Panchayat);
        ravi.unit_id = "p1".to_string();
        ravi.phone = "9876543210".to_string();
        ravi.tags = vec!["IT".to_string(), "Youth".to_string()];
        dir.members.upsert(ravi);

        let mut lakshmi = Member::new("Lakshmi, B");
        lakshmi.unit_type = Some(UnitType::Mandal);
        lakshmi.unit_id = "m1".to_string();
        dir.members.upsert(lakshmi);

        let mut orphan = Member::new("Orphan");
        orphan.unit_type = Some(UnitType::Constituency);
        orphan.unit_id = "gone".to_string();
        dir.members.upsert(orphan);

        dir
    }

    #[test]
    fn test_unit_names_resolve_up_the_chain() {
        let dir = roster_directory();
        let panchayat_member = dir.member_by_name("Ravi").unwrap();
        assert_eq!(
            resolve_unit_names(&dir, panchayat_member),
            ("Gollapalli".to_string(), "Annamayya".to_string())
        );

        let mandal_member = dir.member_by_name("Lakshmi, B").unwrap();
        assert_eq!(
            resolve_unit_names(&dir, mandal_member),
            ("Kalikiri".to_string(), "Annamayya".to_string())
        );

        let orphan = dir.member_by_name("Orphan").unwrap();
        assert_eq!(resolve_unit_names(&dir, orphan), ("-".to_string(), String::new()));
    }

    #[test]
    fn test_csv_export_joins_and_escapes() {
        let dir = roster_directory();
        let bytes = export_members_csv(&dir).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, MEMBER_EXPORT_HEADERS);

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "Ravi");
        assert_eq!(&rows[0][3], "Gollapalli");
        assert_eq!(&rows[0][4], "Annamayya");
        assert_eq!(&rows[0][18], "IT|Youth");
        // comma in the name survives quoting
        assert_eq!(&rows[1][0], "Lakshmi, B");
        assert_eq!(&rows[2][3], "-");
        assert_eq!(&rows[2][4], "");
    }

    #[test]
    fn test_xlsx_export_round_trips_through_import_reader() {
        let dir = roster_directory();
        let bytes = export_members_xlsx(&dir).unwrap();

        let handle = tempdir().unwrap();
        let path = handle.path().join("members.xlsx");
        std::fs::write(&path, bytes).unwrap();

        let rows = read_records(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Name"], "Ravi");
        assert_eq!(rows[0]["Unit Type"], "panchayat");
        assert_eq!(rows[0]["Unit Name"], "Gollapalli");
        assert_eq!(rows[0]["District"], "Annamayya");
        assert_eq!(rows[0]["Phone"], "9876543210");
        assert_eq!(rows[2]["Unit Name"], "-");
    }

    #[test]
    fn test_empty_roster_exports_headers_only() {
        let dir = Directory::new();
        let bytes = export_members_csv(&dir).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Name,Role,Unit Type"));
    }
}
