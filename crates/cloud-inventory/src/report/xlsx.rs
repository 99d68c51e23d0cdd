//! Excel workbook rendering, one worksheet per category

use super::ReportError;
use super::layout::SheetLayout;
use cloud_inventory_common::{CellValue, ReportBundle};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashMap;

/// Excel's limit on worksheet name length
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Make a category label acceptable as a worksheet name.
pub fn sanitize_sheet_name(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let name: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();

    if name.is_empty() {
        "Sheet".to_string()
    } else {
        name
    }
}

/// Sheet names for every label, rejecting collisions after sanitizing.
///
/// Excel compares sheet names case-insensitively.
fn sheet_names(bundle: &ReportBundle) -> Result<Vec<String>, ReportError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut names = Vec::with_capacity(bundle.len());

    for label in bundle.labels() {
        let name = sanitize_sheet_name(label);
        if let Some(first) = seen.insert(name.to_lowercase(), label) {
            return Err(ReportError::DuplicateSheet {
                sheet: name,
                first: first.to_string(),
                second: label.to_string(),
            });
        }
        names.push(name);
    }
    Ok(names)
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> Result<(), ReportError> {
    match value {
        CellValue::Text(text) => sheet.write_string(row, col, text)?,
        CellValue::Number(n) => sheet.write_number(row, col, *n)?,
        CellValue::Bool(b) => sheet.write_boolean(row, col, *b)?,
    };
    Ok(())
}

fn write_sheet(
    sheet: &mut Worksheet,
    name: &str,
    layout: &SheetLayout<'_>,
    header: &Format,
) -> Result<(), ReportError> {
    let too_large = || ReportError::SheetTooLarge {
        sheet: name.to_string(),
    };

    for (col, title) in layout.headers.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| too_large())?;
        sheet.write_string_with_format(0, col, *title, header)?;
    }

    for (idx, cells) in layout.cells.iter().enumerate() {
        // Row 0 holds the headers
        let row = u32::try_from(idx + 1).map_err(|_| too_large())?;
        for (col, cell) in cells.iter().enumerate() {
            let Some(value) = cell else { continue };
            let col = u16::try_from(col).map_err(|_| too_large())?;
            write_cell(sheet, row, col, value)?;
        }
    }

    if !layout.headers.is_empty() {
        sheet.set_freeze_panes(1, 0)?;
    }
    Ok(())
}

/// Render the bundle as an xlsx workbook.
pub fn render_xlsx(bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    let names = sheet_names(bundle)?;
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    for ((_, rows), name) in bundle.iter().zip(&names) {
        let layout = SheetLayout::from_rows(rows);
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_sheet(sheet, name, &layout, &header)?;
    }

    // A workbook needs at least one sheet to open in Excel
    if names.is_empty() {
        workbook.add_worksheet();
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_inventory_common::InventoryRow;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("SSM_Parameters"), "SSM_Parameters");
        assert_eq!(sanitize_sheet_name("a[b]:c*d?e/f\\g"), "a_b__c_d_e_f_g");
        assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
        assert_eq!(sanitize_sheet_name(""), "Sheet");
        assert_eq!(sanitize_sheet_name("''"), "Sheet");

        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), MAX_SHEET_NAME_CHARS);
    }

    #[test]
    fn test_case_insensitive_collision() {
        let mut bundle = ReportBundle::new();
        bundle.insert("ECR", Vec::new()).unwrap();
        bundle.insert("ecr", Vec::new()).unwrap();

        match sheet_names(&bundle) {
            Err(ReportError::DuplicateSheet { first, second, .. }) => {
                assert_eq!(first, "ECR");
                assert_eq!(second, "ecr");
            }
            other => panic!("expected duplicate sheet, got {other:?}"),
        }
    }

    #[test]
    fn test_renders_a_zip_container() {
        let mut bundle = ReportBundle::new();
        bundle
            .insert(
                "S3",
                vec![
                    InventoryRow::new()
                        .with("Bucket", "logs")
                        .with("LifecycleRules", 2)
                        .with("BlockPublicAcls", true),
                ],
            )
            .unwrap();
        bundle.insert("SNS", Vec::new()).unwrap();

        let bytes = render_xlsx(&bundle).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_bundle_still_renders() {
        let bytes = render_xlsx(&ReportBundle::new()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
