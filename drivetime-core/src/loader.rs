// Input loading for the "Companies" and "Projects" tables

use crate::error::{LoadError, ValidationError};
use crate::model::{CompanyRecord, Dataset, ProjectSite};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::{debug, info};

pub const COMPANIES_SHEET: &str = "Companies";
pub const PROJECTS_SHEET: &str = "Projects";

pub const COMPANY_LOCATION: &str = "Company Location";
pub const COMPANY_NAME: &str = "Company Name";
pub const PROJECT_NAME: &str = "Project Name";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

/// Required columns, in the order they are checked.
pub const COMPANY_COLUMNS: [&str; 4] = [COMPANY_LOCATION, LATITUDE, LONGITUDE, COMPANY_NAME];
pub const PROJECT_COLUMNS: [&str; 3] = [PROJECT_NAME, LATITUDE, LONGITUDE];

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A sheet reduced to trimmed text cells. Row 0 is the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(sheet: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            sheet: sheet.to_string(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Result<usize, ValidationError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ValidationError {
                sheet: self.sheet.clone(),
                column: name.to_string(),
            })
    }

    pub fn require(&self, columns: &[&str]) -> Result<(), ValidationError> {
        for column in columns {
            self.column(column)?;
        }
        Ok(())
    }

    /// Non-blank data rows with their 1-based spreadsheet row number.
    fn records(&self) -> impl Iterator<Item = (usize, &Vec<String>)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| !cell.is_empty()))
            .map(|(idx, row)| (idx + 2, row))
    }

    fn text(&self, row: &[String], column: usize) -> String {
        row.get(column).cloned().unwrap_or_default()
    }

    fn number(&self, row_number: usize, row: &[String], column: usize) -> Result<f64, LoadError> {
        let raw = self.text(row, column);
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| LoadError::InvalidCell {
                sheet: self.sheet.clone(),
                row: row_number,
                column: self.headers[column].clone(),
                value: raw,
            })
    }
}

/// Loads both tables from a workbook file or a directory of CSV files.
///
/// Either the whole dataset is returned or nothing is.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    info!("Loading input from {}", path.display());

    let (companies, projects) = if path.is_dir() {
        (
            read_csv_table(path, COMPANIES_SHEET)?,
            read_csv_table(path, PROJECTS_SHEET)?,
        )
    } else {
        if !path.exists() {
            return Err(LoadError::Io {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            return Err(LoadError::Unsupported(path.display().to_string()));
        }
        read_workbook_tables(path)?
    };

    parse_tables(&companies, &projects)
}

/// Validates columns and converts rows into typed records.
pub fn parse_tables(companies: &Table, projects: &Table) -> Result<Dataset, LoadError> {
    companies.require(&COMPANY_COLUMNS)?;
    projects.require(&PROJECT_COLUMNS)?;

    let location_col = companies.column(COMPANY_LOCATION)?;
    let group_col = companies.column(COMPANY_NAME)?;
    let lat_col = companies.column(LATITUDE)?;
    let lon_col = companies.column(LONGITUDE)?;

    let mut company_records = Vec::new();
    for (row_number, row) in companies.records() {
        company_records.push(CompanyRecord {
            location: companies.text(row, location_col),
            group: companies.text(row, group_col),
            latitude: companies.number(row_number, row, lat_col)?,
            longitude: companies.number(row_number, row, lon_col)?,
        });
    }

    let name_col = projects.column(PROJECT_NAME)?;
    let lat_col = projects.column(LATITUDE)?;
    let lon_col = projects.column(LONGITUDE)?;

    let mut project_sites = Vec::new();
    for (row_number, row) in projects.records() {
        project_sites.push(ProjectSite::new(
            projects.text(row, name_col),
            projects.number(row_number, row, lat_col)?,
            projects.number(row_number, row, lon_col)?,
        ));
    }

    info!(
        "Loaded {} companies and {} projects",
        company_records.len(),
        project_sites.len()
    );

    Ok(Dataset {
        companies: company_records,
        projects: project_sites,
    })
}

fn read_workbook_tables(path: &Path) -> Result<(Table, Table), LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();
    debug!("Workbook sheets: {:?}", sheet_names);

    for sheet in [COMPANIES_SHEET, PROJECTS_SHEET] {
        if !sheet_names.iter().any(|name| name == sheet) {
            return Err(LoadError::MissingSheet(sheet.to_string()));
        }
    }

    let mut read = |sheet: &str| -> Result<Table, LoadError> {
        let range = workbook.worksheet_range(sheet)?;
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        Ok(Table::new(sheet, headers, rows.collect()))
    };

    Ok((read(COMPANIES_SHEET)?, read(PROJECTS_SHEET)?))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn read_csv_table(dir: &Path, sheet: &str) -> Result<Table, LoadError> {
    let path = dir.join(format!("{}.csv", sheet));
    if !path.is_file() {
        return Err(LoadError::MissingSheet(sheet.to_string()));
    }

    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(csv_error)?;

    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(sheet, headers, rows))
}
