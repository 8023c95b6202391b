// Tests for reading and validating input files

use drivetime_core::error::{LoadError, ValidationError};
use drivetime_core::loader::load_dataset;
use std::fs;
use tempfile::TempDir;

fn write_inputs(dir: &TempDir, companies: &str, projects: &str) {
    fs::write(dir.path().join("Companies.csv"), companies).unwrap();
    fs::write(dir.path().join("Projects.csv"), projects).unwrap();
}

#[test]
fn test_load_csv_directory() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        &dir,
        "Company Location,Latitude,Longitude,Company Name\n\
         Acme HQ,40.1,-74.1,Acme\n\
         Acme Yard, 40.15 , -74.12 ,Acme\n\
         Globex Depot,40.2,-74.2,Globex\n",
        "Project Name,Latitude,Longitude\n\
         North Bridge,40.0,-74.0\n",
    );

    let dataset = load_dataset(dir.path()).unwrap();

    assert_eq!(dataset.companies.len(), 3);
    assert_eq!(dataset.companies[1].location, "Acme Yard");
    assert_eq!(dataset.companies[1].latitude, 40.15);
    assert_eq!(dataset.companies[2].group, "Globex");
    assert_eq!(dataset.projects.len(), 1);
    assert_eq!(dataset.projects[0].name, "North Bridge");
    assert!(dataset.projects[0].visible);
}

#[test]
fn test_extra_columns_and_order_do_not_matter() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        &dir,
        "Company Name,Notes,Longitude,Latitude,Company Location\n\
         Acme,main office,-74.1,40.1,Acme HQ\n",
        "Longitude,Project Name,Latitude\n-74.0,North Bridge,40.0\n",
    );

    let dataset = load_dataset(dir.path()).unwrap();
    assert_eq!(dataset.companies[0].location, "Acme HQ");
    assert_eq!(dataset.companies[0].longitude, -74.1);
    assert_eq!(dataset.projects[0].latitude, 40.0);
}

#[test]
fn test_missing_company_column_is_named() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        &dir,
        "Company Location,Longitude,Company Name\nAcme HQ,-74.1,Acme\n",
        "Project Name,Latitude,Longitude\nNorth Bridge,40.0,-74.0\n",
    );

    let err = load_dataset(dir.path()).unwrap_err();
    match &err {
        LoadError::Validation(ValidationError { sheet, column }) => {
            assert_eq!(sheet, "Companies");
            assert_eq!(column, "Latitude");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "'Companies' sheet must include 'Latitude' column."
    );
}

#[test]
fn test_missing_project_column_is_named() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        &dir,
        "Company Location,Latitude,Longitude,Company Name\nAcme HQ,40.1,-74.1,Acme\n",
        "Name,Latitude,Longitude\nNorth Bridge,40.0,-74.0\n",
    );

    let err = load_dataset(dir.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'Projects' sheet must include 'Project Name' column."
    );
}

#[test]
fn test_missing_table() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Companies.csv"),
        "Company Location,Latitude,Longitude,Company Name\n",
    )
    .unwrap();

    let err = load_dataset(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::MissingSheet(ref s) if s == "Projects"));
}

#[test]
fn test_non_numeric_coordinate() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        &dir,
        "Company Location,Latitude,Longitude,Company Name\n\
         Acme HQ,40.1,-74.1,Acme\n\
         Globex Depot,north,-74.2,Globex\n",
        "Project Name,Latitude,Longitude\n",
    );

    let err = load_dataset(dir.path()).unwrap_err();
    match err {
        LoadError::InvalidCell {
            sheet,
            row,
            column,
            value,
        } => {
            assert_eq!(sheet, "Companies");
            assert_eq!(row, 3);
            assert_eq!(column, "Latitude");
            assert_eq!(value, "north");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_corrupt_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sites.xlsx");
    fs::write(&path, b"this is not a zip archive").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, LoadError::Workbook(_)));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sites.txt");
    fs::write(&path, "hello").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, LoadError::Unsupported(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_dataset(&dir.path().join("absent.xlsx")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

// ============================================================================
// Workbook Tests
// ============================================================================

enum Cell {
    Text(&'static str),
    Number(f64),
}

fn write_workbook(
    path: &std::path::Path,
    sheets: &[(&str, &[&str], Vec<Vec<Cell>>)],
) -> Result<(), rust_xlsxwriter::XlsxError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for (name, headers, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let (row, col) = (row as u32 + 1, col as u16);
                match cell {
                    Cell::Text(text) => worksheet.write_string(row, col, *text)?,
                    Cell::Number(value) => worksheet.write_number(row, col, *value)?,
                };
            }
        }
    }
    workbook.save(path)
}

const COMPANY_HEADERS: &[&str] = &["Company Location", "Latitude", "Longitude", "Company Name"];
const PROJECT_HEADERS: &[&str] = &["Project Name", "Latitude", "Longitude"];
const HEADERS_WITHOUT_LATITUDE: &[&str] = &["Company Location", "Longitude", "Company Name"];

fn company_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![
            Cell::Number(101.0),
            Cell::Number(40.1),
            Cell::Number(-74.0),
            Cell::Text("Acme"),
        ],
        vec![
            Cell::Text("Globex Depot"),
            Cell::Number(40.2),
            Cell::Number(-74.2),
            Cell::Text("Globex"),
        ],
    ]
}

#[test]
fn test_load_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sites.xlsx");
    write_workbook(
        &path,
        &[
            ("Companies", COMPANY_HEADERS, company_rows()),
            (
                "Projects",
                PROJECT_HEADERS,
                vec![vec![
                    Cell::Text("North Bridge"),
                    Cell::Number(40.0),
                    Cell::Number(-74.0),
                ]],
            ),
        ],
    )
    .unwrap();

    let dataset = load_dataset(&path).unwrap();

    assert_eq!(dataset.companies.len(), 2);
    // Numeric identifiers come through as their plain text form
    assert_eq!(dataset.companies[0].location, "101");
    assert_eq!(dataset.companies[0].latitude, 40.1);
    assert_eq!(dataset.companies[0].longitude, -74.0);
    assert_eq!(dataset.companies[1].group, "Globex");
    assert_eq!(dataset.projects.len(), 1);
    assert_eq!(dataset.projects[0].name, "North Bridge");
    assert_eq!(dataset.projects[0].longitude, -74.0);
}

#[test]
fn test_workbook_without_projects_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sites.xlsx");
    write_workbook(&path, &[("Companies", COMPANY_HEADERS, company_rows())]).unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, LoadError::MissingSheet(ref s) if s == "Projects"));
}

#[test]
fn test_workbook_companies_without_latitude() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sites.xlsx");
    write_workbook(
        &path,
        &[
            (
                "Companies",
                HEADERS_WITHOUT_LATITUDE,
                vec![vec![
                    Cell::Text("Acme HQ"),
                    Cell::Number(-74.1),
                    Cell::Text("Acme"),
                ]],
            ),
            ("Projects", PROJECT_HEADERS, Vec::new()),
        ],
    )
    .unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Validation(ValidationError { ref sheet, ref column })
            if sheet == "Companies" && column == "Latitude"
    ));
}
