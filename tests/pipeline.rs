use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use autopartes_inventory::data::export::WORKBOOK_SHEET_NAME;
use autopartes_inventory::data::filter::{CategoryFilter, FilterCriteria, PriceRange};
use autopartes_inventory::data::model::{PartRecord, PartTable, RawRecord, RawValue};
use autopartes_inventory::data::pipeline::Inventory;
use autopartes_inventory::data::source::{FileSource, InMemorySource, RecordSource};
use autopartes_inventory::InventoryError;

const TABLE: &str = "INVENTARIO";
const SHEET: &str = "Escaneo c precios de venta";

fn raw(code: &str, description: &str, price: &str, category: &str) -> RawRecord {
    RawRecord::new()
        .with(" Código", code)
        .with("Descripción ", description)
        .with("Precio Outlet", price)
        .with("Marca", "Bosch")
        .with("Modelo", "Jetta")
        .with("Categoria", category)
        .with("Existencias", RawValue::Integer(4))
}

fn source() -> InMemorySource {
    InMemorySource::new().with_table(
        TABLE,
        SHEET,
        vec![
            raw("A1-200", "Filtro de aire", "$150.50", "Filtros"),
            raw("B2-100", "Balata trasera", "$1,250.00", "Frenos"),
            raw("a1-300", "Filtro de aceite", "99.99", " Filtros "),
            raw("C3-001", "Amortiguador", "N/A", "Suspensión"),
        ],
    )
}

fn read_sheet(bytes: Vec<u8>) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![WORKBOOK_SHEET_NAME.to_string()]);
    let range = workbook.worksheet_range(WORKBOOK_SHEET_NAME).unwrap();
    range
        .rows()
        .map(|row| row.iter().map(Data::to_string).collect())
        .collect()
}

#[test]
fn load_filter_export_end_to_end() {
    let mut src = source();
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();

    assert_eq!(inventory.len(), 4);
    assert_eq!(inventory.categories(), ["Filtros", "Frenos", "Suspensión"]);
    let bounds = inventory.price_bounds().unwrap();
    assert_eq!((bounds.min(), bounds.max()), (0.0, 1250.0));

    let criteria = FilterCriteria {
        description_substring: "filtro".to_string(),
        category: CategoryFilter::Exact("Filtros".to_string()),
        ..Default::default()
    };
    let result = inventory.query(&criteria).unwrap();
    let codes: Vec<_> = result.table.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, ["A1-200", "a1-300"]);
    assert_eq!(result.display.rows[0].outlet_price, "$150.50");

    let csv = String::from_utf8(result.to_csv().unwrap()).unwrap();
    assert_eq!(
        csv,
        "Código,Descripción,Precio Outlet,Marca,Modelo,Categoria\n\
         A1-200,Filtro de aire,$150.50,Bosch,Jetta,Filtros\n\
         a1-300,Filtro de aceite,$99.99,Bosch,Jetta,Filtros\n"
    );

    let sheet = read_sheet(result.to_workbook().unwrap());
    assert_eq!(sheet.len(), 3);
    assert_eq!(sheet[0][2], "Precio Outlet");
    assert_eq!(sheet[1], ["A1-200", "Filtro de aire", "$150.50", "Bosch", "Jetta", "Filtros"]);
}

#[test]
fn each_query_starts_from_the_full_table() {
    let mut src = source();
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();

    let narrow = FilterCriteria {
        code_substring: "B2".to_string(),
        ..Default::default()
    };
    assert_eq!(inventory.query(&narrow).unwrap().table.len(), 1);
    assert_eq!(inventory.query(&FilterCriteria::default()).unwrap().table.len(), 4);
}

#[test]
fn invalid_range_fails_only_the_query() {
    let mut src = source();
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();

    assert!(matches!(
        PriceRange::new(500.0, 100.0),
        Err(InventoryError::InvalidRange { .. })
    ));
    let ok = FilterCriteria {
        price_range: Some(PriceRange::new(100.0, 100.0).unwrap()),
        ..Default::default()
    };
    assert!(inventory.query(&ok).unwrap().table.is_empty());
}

#[test]
fn schema_mismatch_is_distinct_from_outage() {
    let rows = vec![RawRecord::new().with("Código", "A1").with("Precio", "$1")];
    let mut src = InMemorySource::new().with_table(TABLE, SHEET, rows);

    match Inventory::load(&mut src, TABLE, SHEET) {
        Err(InventoryError::Schema { missing }) => {
            assert_eq!(
                missing,
                ["Descripción", "Precio Outlet", "Marca", "Modelo", "Categoria"]
            );
        }
        other => panic!("expected schema error, got {other:?}"),
    }

    match Inventory::load(&mut src, TABLE, "otra") {
        Err(InventoryError::SourceUnavailable(_)) => {}
        other => panic!("expected outage, got {other:?}"),
    }
}

#[test]
fn empty_export_is_header_only() {
    let inventory = Inventory::from_table(PartTable::default());
    let result = inventory.query(&FilterCriteria::default()).unwrap();

    let csv = String::from_utf8(result.to_csv().unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 1);

    let sheet = read_sheet(result.to_workbook().unwrap());
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet[0][0], "Código");
}

#[test]
fn csv_round_trip_keeps_code_and_price() {
    let table = PartTable::from_records(vec![PartRecord {
        code: "A1".to_string(),
        description: "Filter".to_string(),
        outlet_price: 150.5,
        brand: "X".to_string(),
        model: "Y".to_string(),
        category: "Filters".to_string(),
    }]);
    let result = Inventory::from_table(table)
        .query(&FilterCriteria::default())
        .unwrap();
    let csv = String::from_utf8(result.to_csv().unwrap()).unwrap();

    let fields: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(fields[0], "A1");
    let price: f64 = fields[2].trim_start_matches('$').replace(',', "").parse().unwrap();
    assert_eq!(price, 150.5);
}

#[test]
fn file_source_reads_named_worksheet() {
    let dir = tempfile::tempdir().unwrap();

    let mut workbook = Workbook::new();
    let other = workbook.add_worksheet();
    other.set_name("Resumen").unwrap();
    other.write_string(0, 0, "nada").unwrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET).unwrap();
    let headers = [" Código ", "Descripción", "Precio Outlet", "Marca", "Modelo", "Categoria"];
    for (c, h) in headers.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    sheet.write_string(1, 0, "X-1").unwrap();
    sheet.write_string(1, 1, "Bujía").unwrap();
    sheet.write_number(1, 2, 85.0).unwrap();
    sheet.write_string(1, 3, "NGK").unwrap();
    sheet.write_string(1, 4, "Tsuru").unwrap();
    sheet.write_string(1, 5, "Eléctrico").unwrap();
    workbook
        .save(dir.path().join(format!("{TABLE}.xlsx")))
        .unwrap();

    let mut src = FileSource::new(dir.path());
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();
    let rec = &inventory.table().records()[0];
    assert_eq!(rec.code, "X-1");
    assert_eq!(rec.outlet_price, 85.0);
    assert_eq!(rec.category, "Eléctrico");

    let missing = Inventory::load(&mut src, TABLE, "No existe");
    assert!(matches!(missing, Err(InventoryError::SourceUnavailable(_))));

    src.close();
    assert!(Inventory::load(&mut src, TABLE, SHEET).is_err());
}

#[test]
fn file_source_reads_csv_tables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{TABLE}.csv")),
        "Código,Descripción,Precio Outlet,Marca,Modelo,Categoria\n\
         F-1, Filtro ,\"$1,234.56\",Bosch,Aveo,Filtros\n\
         F-2,Filtro,,Bosch,Aveo,Filtros\n",
    )
    .unwrap();

    let mut src = FileSource::new(dir.path());
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();
    let prices: Vec<f64> = inventory.table().iter().map(|r| r.outlet_price).collect();
    assert_eq!(prices, [1234.56, 0.0]);
    assert_eq!(inventory.table().records()[0].description, "Filtro");
}

#[test]
fn header_only_csv_is_checked_against_the_schema() {
    let dir = tempfile::tempdir().unwrap();
    let mut src = FileSource::new(dir.path());

    std::fs::write(dir.path().join("MAL.csv"), "Foo,Bar\n").unwrap();
    match Inventory::load(&mut src, "MAL", SHEET) {
        Err(InventoryError::Schema { missing }) => assert_eq!(missing.len(), 6),
        other => panic!("expected schema error, got {other:?}"),
    }

    std::fs::write(
        dir.path().join(format!("{TABLE}.csv")),
        "Código,Descripción,Precio Outlet,Marca,Modelo,Categoria\n",
    )
    .unwrap();
    let inventory = Inventory::load(&mut src, TABLE, SHEET).unwrap();
    assert!(inventory.is_empty());
    assert!(inventory.price_bounds().is_none());
}

#[test]
fn header_only_worksheet_is_checked_against_the_schema() {
    let dir = tempfile::tempdir().unwrap();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET).unwrap();
    sheet.write_string(0, 0, "Código").unwrap();
    sheet.write_string(0, 1, "Precio").unwrap();
    workbook
        .save(dir.path().join(format!("{TABLE}.xlsx")))
        .unwrap();

    let mut src = FileSource::new(dir.path());
    match Inventory::load(&mut src, TABLE, SHEET) {
        Err(InventoryError::Schema { missing }) => {
            assert_eq!(
                missing,
                ["Descripción", "Precio Outlet", "Marca", "Modelo", "Categoria"]
            );
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}
