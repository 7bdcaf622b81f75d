//! Tabular export of the client roster.
//!
//! Both formats share one fixed row projection; the same projection feeds the
//! remote spreadsheet sync. Exporting an empty roster is not an error: both
//! encoders emit header-only output.

use chrono::{DateTime, NaiveDate, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::errors::AppError;
use crate::models::Client;

/// Column headers, in export order.
pub const HEADERS: [&str; 9] = [
    "Nome",
    "Sobrenome",
    "Nome do Responsável",
    "Telefone",
    "WhatsApp",
    "Instagram",
    "TikTok",
    "Observações",
    "Data de Cadastro",
];

/// Fixed column-width hints for the workbook, one per header.
const COLUMN_WIDTHS: [f64; 9] = [15.0, 15.0, 20.0, 15.0, 15.0, 15.0, 15.0, 30.0, 15.0];

const SHEET_NAME: &str = "Clientes";
const EXPORT_BASENAME: &str = "clientes";

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    SpreadsheetBinary,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::SpreadsheetBinary => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::SpreadsheetBinary => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// An encoded export: payload bytes plus the suggested filename.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Encode the roster in the requested format.
pub fn export_rows(clients: &[Client], format: ExportFormat) -> Result<ExportPayload, AppError> {
    let bytes = match format {
        ExportFormat::Csv => encode_csv(clients).into_bytes(),
        ExportFormat::SpreadsheetBinary => encode_workbook(clients).map_err(|err| {
            tracing::error!("Workbook encoding error: {:?}", err);
            AppError::Internal(format!("Workbook encoding error: {}", err))
        })?,
    };

    Ok(ExportPayload {
        bytes,
        filename: filename_for(EXPORT_BASENAME, Utc::now().date_naive(), format.extension()),
        content_type: format.content_type(),
    })
}

/// Project one client onto the export columns. Optional fields render as
/// empty strings.
pub fn client_row(client: &Client) -> Vec<String> {
    vec![
        client.first_name.clone(),
        client.last_name.clone(),
        client.parent_name.clone(),
        client.phone_number.clone(),
        client.whatsapp_number.clone(),
        client.instagram.clone(),
        client.tiktok.clone(),
        client.notes.clone(),
        format_registration_date(&client.created_at),
    ]
}

/// Header row plus one row per client, the shape the spreadsheet API expects.
pub fn sheet_values(clients: &[Client]) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(clients.len() + 1);
    values.push(HEADERS.iter().map(|h| h.to_string()).collect());
    values.extend(clients.iter().map(client_row));
    values
}

fn encode_csv(clients: &[Client]) -> String {
    let mut lines = Vec::with_capacity(clients.len() + 1);
    lines.push(HEADERS.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","));

    for client in clients {
        let row = client_row(client)
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }

    lines.join("\n")
}

/// Quote a field and double its internal quotes when it contains a comma or
/// a quote; pass it through unchanged otherwise.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn encode_workbook(clients: &[Client]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (row, client) in clients.iter().enumerate() {
        for (col, cell) in client_row(client).iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }

    workbook.save_to_buffer()
}

/// Registration dates render as day/month/year; an unparseable timestamp
/// passes through unchanged rather than dropping the row.
fn format_registration_date(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.format("%d/%m/%Y").to_string(),
        Err(_) => created_at.to_string(),
    }
}

fn filename_for(base: &str, date: NaiveDate, ext: &str) -> String {
    format!("{}_{}.{}", base, date.format("%Y-%m-%d"), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(first: &str, notes: &str) -> Client {
        Client {
            id: "c1".to_string(),
            first_name: first.to_string(),
            last_name: "Silva".to_string(),
            parent_name: "Bia".to_string(),
            instagram: "@ana".to_string(),
            tiktok: String::new(),
            phone_number: "11999999999".to_string(),
            whatsapp_number: "11999999999".to_string(),
            notes: notes.to_string(),
            created_at: "2024-03-05T12:30:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_empty_roster_is_header_only() {
        let csv = encode_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Nome,Sobrenome,Nome do Responsável"));

        let payload = export_rows(&[], ExportFormat::SpreadsheetBinary).unwrap();
        // XLSX is a ZIP container
        assert_eq!(&payload.bytes[..2], b"PK");
    }

    #[test]
    fn test_csv_has_one_line_per_record_plus_header() {
        let clients = vec![client("Ana", ""), client("Bia", ""), client("Clara", "")];
        let csv = encode_csv(&clients);
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_csv_escapes_commas_and_quotes() {
        let clients = vec![client("Ana", "He said \"hi\", ok")];
        let csv = encode_csv(&clients);
        assert!(csv.contains("\"He said \"\"hi\"\", ok\""));
    }

    #[test]
    fn test_csv_round_trip_with_standard_parser() {
        let clients = vec![client("Ana", "comma, quote \" and, more")];
        let csv = encode_csv(&clients);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), HEADERS.len());
        assert_eq!(&headers[8], "Data de Cadastro");

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Ana");
        assert_eq!(&record[7], "comma, quote \" and, more");
        assert_eq!(&record[8], "05/03/2024");
    }

    #[test]
    fn test_optional_fields_render_empty() {
        let row = client_row(&client("Ana", ""));
        assert_eq!(row[6], "");
        assert_eq!(row[7], "");
    }

    #[test]
    fn test_registration_date_is_day_month_year() {
        assert_eq!(format_registration_date("2024-12-31T23:59:59-03:00"), "31/12/2024");
        // Unparseable input passes through
        assert_eq!(format_registration_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_filename_uses_export_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(filename_for("clientes", date, "csv"), "clientes_2024-03-05.csv");
        assert_eq!(filename_for("clientes", date, "xlsx"), "clientes_2024-03-05.xlsx");
    }

    #[test]
    fn test_sheet_values_shape() {
        let values = sheet_values(&[client("Ana", "")]);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0][0], "Nome");
        assert_eq!(values[1][0], "Ana");
        assert_eq!(values[1].len(), HEADERS.len());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv;charset=utf-8");
        assert_eq!(
            ExportFormat::SpreadsheetBinary.content_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
