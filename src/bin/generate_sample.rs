use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Outdoor temperature at a given hour of day: winter profile, coldest
/// before dawn, peaking mid-afternoon.
fn outdoor_temp(hour_of_day: f64, day: f64) -> f64 {
    let daily = 4.0 * ((hour_of_day - 14.0) / 24.0 * std::f64::consts::TAU).cos();
    let drift = 1.5 * (day / 14.0 * std::f64::consts::TAU).sin();
    -1.0 + daily + drift
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let zones: [(i64, f64); 3] = [(1, 21.0), (2, 20.0), (3, 22.5)];
    let days = 14u32;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp();

    let mut all_time: Vec<i64> = Vec::new();
    let mut all_zone: Vec<i64> = Vec::new();
    let mut all_ext: Vec<f64> = Vec::new();
    let mut all_indoor: Vec<f64> = Vec::new();
    let mut all_target: Vec<f64> = Vec::new();

    let mut row_count: u64 = 0;
    for hour in 0..(days * 24) {
        let hour_of_day = (hour % 24) as f64;
        let day = (hour / 24) as f64;
        let ext_base = outdoor_temp(hour_of_day, day);

        for &(zoneid, setpoint) in &zones {
            // Night setback between 22:00 and 06:00.
            let target = if !(6.0..22.0).contains(&hour_of_day) {
                setpoint - 3.0
            } else {
                setpoint
            };

            let mut ext = ext_base + rng.gauss(0.0, 0.4);
            let mut indoor =
                target + 0.08 * (ext - target) + rng.gauss(0.0, 0.3);

            // Occasional sensor glitches for the outlier filter to catch.
            if rng.next_f64() < 0.004 {
                ext = if rng.next_f64() < 0.5 { 480.0 } else { -120.0 };
            }
            if rng.next_f64() < 0.002 {
                indoor = 95.0;
            }

            all_time.push(start + hour as i64 * 3600);
            all_zone.push(zoneid);
            all_ext.push(ext);
            all_indoor.push(indoor);
            all_target.push(target);
            row_count += 1;
        }
    }

    let time_array = TimestampSecondArray::from(all_time);
    let zone_array = Int64Array::from(all_zone);
    let ext_array = Float64Array::from(all_ext);
    let indoor_array = Float64Array::from(all_indoor);
    let target_array = Float64Array::from(all_target);

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "sample_time",
            DataType::Timestamp(TimeUnit::Second, None),
            false,
        ),
        Field::new("zoneid", DataType::Int64, false),
        Field::new("ext_temp", DataType::Float64, false),
        Field::new("indoor_temp", DataType::Float64, false),
        Field::new("target_temp", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(time_array),
            Arc::new(zone_array),
            Arc::new(ext_array),
            Arc::new(indoor_array),
            Arc::new(target_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_data.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {row_count} readings across {} zones to {output_path}",
        zones.len()
    );
}
