use anyhow::{Context, Result};
use log::info;

use gapfill::data::normalize::MISSING_TOKENS;
use gapfill::rng::SimpleRng;

const ROWS: usize = 300;
const GAP_RATE: f64 = 0.08;

struct Record {
    city: &'static str,
    segment: &'static str,
    age: f64,
    income: f64,
    satisfaction: f64,
}

fn generate_record(rng: &mut SimpleRng) -> Record {
    let cities = [("Oslo", 1.25), ("Lyon", 1.0), ("Porto", 0.85), ("Graz", 0.95)];
    let segments = ["retail", "wholesale", "online"];

    let (city, cost_factor) = cities[rng.next_below(cities.len())];
    let segment = segments[rng.next_below(segments.len())];

    let age = rng.gauss(42.0, 11.0).clamp(18.0, 80.0).round();
    // Income grows with age and city cost level.
    let income = ((18_000.0 + 650.0 * age) * cost_factor + rng.gauss(0.0, 4_000.0)).max(8_000.0);
    let bias = match segment {
        "online" => 0.4,
        "wholesale" => -0.2,
        _ => 0.0,
    };
    let satisfaction = (3.0 + bias + rng.gauss(0.0, 0.8)).clamp(1.0, 5.0);

    Record {
        city,
        segment,
        age,
        income: (income * 100.0).round() / 100.0,
        satisfaction: (satisfaction * 10.0).round() / 10.0,
    }
}

/// Either the field itself or, at `GAP_RATE`, one spelling of a missing cell.
fn maybe_gap(field: String, rng: &mut SimpleRng) -> String {
    if rng.next_f64() >= GAP_RATE {
        return field;
    }
    // Empty and whitespace-only count as missing too.
    let spellings: Vec<&str> = MISSING_TOKENS.iter().copied().chain(["", "  "]).collect();
    spellings[rng.next_below(spellings.len())].to_string()
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .from_path(&output_path)
        .with_context(|| format!("Cannot create {output_path}"))?;
    writer.write_record(["city", "segment", "age", "income", "satisfaction"])?;

    let mut gaps = 0usize;
    for _ in 0..ROWS {
        let r = generate_record(&mut rng);
        let fields = [
            r.city.to_string(),
            r.segment.to_string(),
            format!("{}", r.age),
            format!("{:.2}", r.income),
            format!("{:.1}", r.satisfaction),
        ];
        let row: Vec<String> = fields
            .into_iter()
            .map(|f| {
                let out = maybe_gap(f.clone(), &mut rng);
                if out != f {
                    gaps += 1;
                }
                out
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush().context("Failed to flush CSV writer")?;

    info!("wrote {ROWS} rows with {gaps} gap(s) to {output_path}");
    println!("Wrote {ROWS} rows ({gaps} missing cells) to {output_path}");
    Ok(())
}
