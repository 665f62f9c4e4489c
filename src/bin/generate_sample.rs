use std::f64::consts::TAU;
use std::path::Path;

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
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + std_dev * z
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap { 29 } else { 28 }
        }
        _ => unreachable!("month out of range"),
    }
}

const WIND_DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// About 2% of cells are missing, matching the texture of the real files.
fn cell(value: f64, decimals: usize, rng: &mut SimpleRng) -> String {
    if rng.next_f64() < 0.02 {
        "NA".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/PRSA_Data_Nongzhanguan_20130301-20170228.csv".to_string());

    if let Some(parent) = Path::new(&path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create output directory");
    }

    let mut writer = csv::Writer::from_path(&path).expect("Failed to create output file");
    writer
        .write_record([
            "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
            "PRES", "DWP", "RAIN", "WSPM", "wd",
        ])
        .expect("Failed to write header");

    let mut rng = SimpleRng::new(42);
    let mut rows: u64 = 0;

    // The real file runs from March 2013 through February 2017.
    for year in 2013..=2017 {
        for month in 1..=12u32 {
            if (year == 2013 && month < 3) || (year == 2017 && month > 2) {
                continue;
            }
            // Winter-peaking seasonal factor: +1 in January, -1 in July.
            let season = ((month - 1) as f64 / 12.0 * TAU).cos();

            for day in 1..=days_in_month(year, month) {
                for hour in 0..24u32 {
                    let diurnal = -(hour as f64 / 24.0 * TAU).cos();

                    let pm10 = (85.0 + 45.0 * season + rng.gauss(0.0, 25.0)).max(2.0);
                    let pm25 = (0.7 * pm10 + rng.gauss(0.0, 10.0)).max(1.0);
                    let so2 = (15.0 + 10.0 * season + rng.gauss(0.0, 6.0)).max(0.5);
                    let no2 = (20.0 + 0.35 * pm10 + rng.gauss(0.0, 8.0)).max(2.0);
                    let co = (900.0 + 6.0 * pm10 + rng.gauss(0.0, 150.0)).max(100.0);
                    let o3 = (60.0 - 30.0 * season + 15.0 * diurnal + rng.gauss(0.0, 12.0)).max(1.0);
                    let temp = 13.0 - 15.0 * season + 4.0 * diurnal + rng.gauss(0.0, 2.5);
                    let pres = 1013.0 + 8.0 * season + rng.gauss(0.0, 3.0);
                    let dwp = temp - 8.0 + rng.gauss(0.0, 2.0);
                    let rain = if rng.next_f64() < 0.05 {
                        -2.0 * rng.next_f64().max(1e-9).ln()
                    } else {
                        0.0
                    };
                    let wspm = rng.gauss(2.0, 1.2).abs();
                    let wd = WIND_DIRECTIONS[(rng.next_u64() % 16) as usize];

                    writer
                        .write_record([
                            year.to_string(),
                            month.to_string(),
                            day.to_string(),
                            hour.to_string(),
                            cell(pm25, 1, &mut rng),
                            cell(pm10, 1, &mut rng),
                            cell(so2, 1, &mut rng),
                            cell(no2, 1, &mut rng),
                            cell(co, 0, &mut rng),
                            cell(o3, 1, &mut rng),
                            cell(temp, 1, &mut rng),
                            cell(pres, 1, &mut rng),
                            cell(dwp, 1, &mut rng),
                            cell(rain, 1, &mut rng),
                            cell(wspm, 1, &mut rng),
                            wd.to_string(),
                        ])
                        .expect("Failed to write row");
                    rows += 1;
                }
            }
        }
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {rows} hourly observations to {path}");
}
