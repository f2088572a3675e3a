use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use sat_catalogs::models::CellValue;
use sat_catalogs::services::excel::{ExcelProcessor, MemoryWorkbook, NormalizerSettings, RawGrid};
use serde_json::{json, Value};

fn cells(values: &[&str]) -> Vec<CellValue> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                CellValue::Absent
            } else {
                CellValue::Text(v.to_string())
            }
        })
        .collect()
}

fn formas_de_pago() -> RawGrid {
    RawGrid::from_rows(vec![
        cells(&["Catálogo de Formas de Pago"]),
        cells(&[""]),
        cells(&["Versión 4.0", ""]),
        cells(&["FORMAS_DE_PAGO"]),
        cells(&["c_FormaPago", "Descripción", "Bancarizado", "Fecha inicio de vigencia"]),
        vec![
            CellValue::Text("01".to_string()),
            CellValue::Text("Efectivo".to_string()),
            CellValue::Text("No".to_string()),
            CellValue::Text("2022-01-01".to_string()),
        ],
        vec![
            CellValue::Text("02".to_string()),
            CellValue::Text("Cheque nominativo".to_string()),
            CellValue::Text("Sí".to_string()),
            CellValue::Text("   ".to_string()),
        ],
    ])
}

fn notas() -> RawGrid {
    RawGrid::from_rows(vec![
        cells(&["Notas del catálogo"]),
        cells(&["Los catálogos se actualizan periódicamente."]),
    ])
}

fn impuestos(title_rows: usize) -> RawGrid {
    let mut rows: Vec<Vec<CellValue>> = (0..title_rows).map(|_| cells(&[""])).collect();
    rows.push(cells(&["Impuestos"]));
    rows.push(cells(&["Impuesto", "", "Tasa", "Factor", "Traslado", "Retención", "Rango"]));
    rows.push(cells(&["", "", "", "", "", "", "Mínimo", "Máximo", "Código Postal"]));
    rows.push(vec![
        CellValue::Text("002".to_string()),
        CellValue::Text("IVA".to_string()),
        CellValue::Float(0.16),
        CellValue::Text("Tasa".to_string()),
        CellValue::Text("Sí".to_string()),
        CellValue::Text("Sí".to_string()),
        CellValue::Int(0),
        CellValue::Float(0.16),
        CellValue::Int(1000),
    ]);
    RawGrid::from_rows(rows)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn simple_sheet_becomes_records_keyed_by_clean_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = MemoryWorkbook::new().with_sheet("Formas_de_pago", formas_de_pago());
    let processor = ExcelProcessor::new(dir.path(), NormalizerSettings::default());

    let summary = processor.process_workbook(&mut workbook).unwrap();
    assert_eq!(summary.converted, vec!["Formas_de_pago"]);

    let written = read_json(&processor.output_path("Formas_de_pago"));
    assert_eq!(
        written,
        json!([
            {
                "c_formapago": "01",
                "descripcion": "Efectivo",
                "bancarizado": "No",
                "fecha_inicio_de_vigencia": "2022-01-01"
            },
            {
                "c_formapago": "02",
                "descripcion": "Cheque nominativo",
                "bancarizado": "Sí",
                "fecha_inicio_de_vigencia": null
            }
        ])
    );
}

#[test]
fn unlocatable_sheet_is_skipped_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = MemoryWorkbook::new()
        .with_sheet("Notas", notas())
        .with_sheet("Formas_de_pago", formas_de_pago());
    let processor = ExcelProcessor::new(dir.path(), NormalizerSettings::default());

    let summary = processor.process_workbook(&mut workbook).unwrap();

    assert_eq!(summary.converted, vec!["Formas_de_pago"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].sheet, "Notas");
    assert!(summary.failed[0].reason.contains("notas"));
    assert!(!processor.output_path("Notas").exists());
}

#[test]
fn part_sheets_merge_split_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = MemoryWorkbook::new()
        .with_sheet("Impuestos_Parte_1", impuestos(10))
        .with_sheet("Impuestos_Parte_2", impuestos(3));
    let processor = ExcelProcessor::new(dir.path(), NormalizerSettings::default());

    let summary = processor.process_workbook(&mut workbook).unwrap();
    assert_eq!(summary.converted, vec!["Impuestos_Parte_1", "Impuestos_Parte_2"]);

    let expected = json!([{
        "impuesto": "002",
        "unnamed:_1": "IVA",
        "tasa": 0.16,
        "factor": "Tasa",
        "traslado": "Sí",
        "retencion": "Sí",
        "rango": 0,
        "maximo": 0.16,
        "codigo_postal": 1000
    }]);
    assert_eq!(read_json(&processor.output_path("Impuestos_Parte_1")), expected);
    assert_eq!(read_json(&processor.output_path("Impuestos_Parte_2")), expected);
}

#[test]
fn part_sheet_narrower_than_split_header_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let narrow = RawGrid::from_rows(vec![
        cells(&["impuestos"]),
        cells(&["Impuesto", "Tasa"]),
        cells(&["", ""]),
        cells(&["002", "0.16"]),
    ]);
    let mut workbook = MemoryWorkbook::new()
        .with_sheet("Impuestos_Parte_1", narrow)
        .with_sheet("Formas_de_pago", formas_de_pago());
    let processor = ExcelProcessor::new(dir.path(), NormalizerSettings::default());

    let summary = processor.process_workbook(&mut workbook).unwrap();
    assert_eq!(summary.converted, vec!["Formas_de_pago"]);
    assert_eq!(summary.failed[0].sheet, "Impuestos_Parte_1");
    assert!(!processor.output_path("Impuestos_Parte_1").exists());
}

#[test]
fn second_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = MemoryWorkbook::new()
        .with_sheet("Formas_de_pago", formas_de_pago())
        .with_sheet("Notas", notas())
        .with_sheet("Impuestos_Parte_1", impuestos(10));
    let processor = ExcelProcessor::new(dir.path(), NormalizerSettings::default());

    let first = processor.process_workbook(&mut workbook.clone()).unwrap();
    assert_eq!(first.converted.len(), 2);
    let snapshot = fs::read_to_string(processor.output_path("Formas_de_pago")).unwrap();

    let second = processor.process_workbook(&mut workbook.clone()).unwrap();
    assert!(second.converted.is_empty());
    assert_eq!(second.skipped_existing, vec!["Formas_de_pago", "Impuestos_Parte_1"]);
    assert_eq!(fs::read_to_string(processor.output_path("Formas_de_pago")).unwrap(), snapshot);
}
