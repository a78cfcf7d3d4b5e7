use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use autopartes_inventory::config::{DEFAULT_SHEET_NAME, DEFAULT_TABLE_NAME};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// Source headers, padded the way hand-edited sheets tend to be.
const HEADERS: [&str; 7] = [
    " Código",
    "Descripción ",
    "Precio Outlet",
    "Marca",
    " Modelo ",
    "Categoria",
    "Existencias",
];

struct Row {
    code: String,
    description: String,
    price: String,
    brand: String,
    model: String,
    category: String,
    stock: i64,
}

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    let parts: [(&str, &str, &[&str]); 5] = [
        ("FIL", "Filtros", &["Filtro de aceite", "Filtro de aire", "Filtro de gasolina"][..]),
        ("FRE", "Frenos", &["Balata delantera", "Balata trasera", "Disco de freno"][..]),
        ("SUS", "Suspensión", &["Amortiguador", "Horquilla", "Rótula"][..]),
        ("ELE", "Eléctrico", &["Alternador", "Marcha", "Bobina"][..]),
        ("MOT", "Motor", &["Bomba de agua", "Banda de distribución", "Empaque de cabeza"][..]),
    ];
    let brands = ["Bosch", "ACDelco", "Monroe", "Brembo", "Gates"];
    let models = ["Aveo", "Jetta", "Tsuru", "Sentra", "Civic"];

    (0..n)
        .map(|i| {
            let (prefix, category, descriptions) = parts[rng.below(parts.len() as u64) as usize];
            let cents = 5_000 + rng.below(600_000);
            let amount = cents as f64 / 100.0;

            // Mix the price spellings found in real sheets.
            let price = match i % 5 {
                0 => format!("${amount:.2}"),
                1 => format!("{amount}"),
                2 => format!(" $ {amount:.2} MXN"),
                3 => String::new(),
                _ => format!("{amount:.0}"),
            };

            Row {
                code: format!(" {prefix}-{:04} ", rng.below(10_000)),
                description: rng.pick(descriptions).to_string(),
                price,
                brand: rng.pick(&brands).to_string(),
                model: rng.pick(&models).to_string(),
                category: format!("{category} "),
                stock: rng.below(40) as i64,
            }
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let text_column = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        text_column(|r| r.code.as_str()),
        text_column(|r| r.description.as_str()),
        text_column(|r| r.price.as_str()),
        text_column(|r| r.brand.as_str()),
        text_column(|r| r.model.as_str()),
        text_column(|r| r.category.as_str()),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.stock).collect::<Vec<_>>())),
    ];

    let fields: Vec<Field> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let dt = if i == 6 { DataType::Int64 } else { DataType::Utf8 };
            Field::new(*h, dt, false)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_workbook(rows: &[Row], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(DEFAULT_SHEET_NAME)?;

    for (col, h) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *h)?;
    }
    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &r.code)?;
        sheet.write_string(row, 1, &r.description)?;
        sheet.write_string(row, 2, &r.price)?;
        sheet.write_string(row, 3, &r.brand)?;
        sheet.write_string(row, 4, &r.model)?;
        sheet.write_string(row, 5, &r.category)?;
        sheet.write_number(row, 6, r.stock as f64)?;
    }

    workbook.save(path).with_context(|| format!("saving {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 250);

    let parquet_path = format!("{DEFAULT_TABLE_NAME}.parquet");
    let xlsx_path = format!("{DEFAULT_TABLE_NAME}.xlsx");
    write_parquet(&rows, &parquet_path)?;
    write_workbook(&rows, &xlsx_path)?;

    println!(
        "Wrote {} parts to '{parquet_path}' and '{xlsx_path}' (sheet '{DEFAULT_SHEET_NAME}')",
        rows.len()
    );
    Ok(())
}
