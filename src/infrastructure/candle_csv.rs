use crate::domain::market::Candle;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Writes candle history to a headered CSV file, oldest first.
pub fn save_candles(path: &Path, candles: &[Candle]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
    }

    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = csv::Writer::from_writer(file);

    for candle in candles {
        writer
            .serialize(candle)
            .with_context(|| format!("Failed to serialize candle to {:?}", path))?;
    }
    writer.flush().context("Failed to flush CSV writer")?;

    info!("Saved {} candles to {:?}", candles.len(), path);
    Ok(())
}

/// Reads candle history back from CSV.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut candles = Vec::new();
    for record in reader.deserialize() {
        let candle: Candle =
            record.with_context(|| format!("Failed to parse candle row in {:?}", path))?;
        candles.push(candle);
    }

    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_round_trip() {
        let candles: Vec<Candle> = (0..3)
            .map(|i| Candle {
                symbol: "ETHUSDT".to_string(),
                open_time: i * 3_600_000,
                open: dec!(2000.5),
                high: dec!(2050),
                low: dec!(1990),
                close: dec!(2040.25),
                volume: dec!(123.456),
                close_time: (i + 1) * 3_600_000 - 1,
                quote_volume: dec!(251234.5),
                trade_count: 987,
                taker_buy_base: dec!(60.5),
                taker_buy_quote: dec!(123456.7),
            })
            .collect();

        let path = std::env::temp_dir().join(format!("cryptocast-csv-{}.csv", std::process::id()));
        save_candles(&path, &candles).unwrap();
        let back = load_candles(&path).unwrap();
        assert_eq!(back, candles);
        let _ = std::fs::remove_file(&path);
    }
}
