use crate::error::{EngineError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::Candle;
use shared::utils::millis_to_secs;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Times above this are taken to be epoch milliseconds (10^11 s is year 5138).
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

const COLUMNS: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

pub struct CandleCsvParser;

impl CandleCsvParser {
    // CSV Header: time,open,high,low,close,volume
    // Example Row: 1700000000,37000.5,37100,36950.25,37050,12.5
    pub fn load_candles_from_csv(file_path: impl AsRef<Path>) -> Result<Vec<Candle>> {
        let file = File::open(file_path.as_ref())?;
        Self::read_candles(BufReader::new(file))
    }

    /// Parses candles from any reader. Rows are returned ascending by time with
    /// duplicate times collapsed (the first row for a time wins).
    pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let positions = Self::column_positions(&headers)?;

        let mut candles = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let time_raw = Self::field(&record, positions[0], "time", line)?;
            let time = time_raw
                .parse::<i64>()
                .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing 'time' at line {}: {}", line, e)))?;
            let time = if time > MILLIS_THRESHOLD { millis_to_secs(time) } else { time };

            let mut values = [0.0f64; 5];
            for (slot, (&pos, name)) in values.iter_mut().zip(positions[1..].iter().zip(&COLUMNS[1..])) {
                let raw = Self::field(&record, pos, name, line)?;
                *slot = raw.parse::<f64>().map_err(|e| {
                    EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: '{}': {}", name, line, raw, e))
                })?;
            }
            let [open, high, low, close, volume] = values;

            candles.push(Candle { time, open, high, low, close, volume });
        }

        // Exports are not always sorted; the series requires strict ordering.
        candles.sort_by_key(|c| c.time);
        let before = candles.len();
        candles.dedup_by_key(|c| c.time);
        if candles.len() != before {
            tracing::warn!(dropped = before - candles.len(), "Dropped CSV rows with duplicate times");
        }
        Ok(candles)
    }

    fn column_positions(headers: &StringRecord) -> Result<[usize; 6]> {
        let mut positions = [0usize; 6];
        for (slot, name) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column in CSV header", name)))?;
        }
        Ok(positions)
    }

    fn field<'a>(record: &'a StringRecord, pos: usize, name: &str, line: usize) -> Result<&'a str> {
        record
            .get(pos)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field in CSV record at line {}", name, line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_candles_from_csv_valid_data() {
        let csv_content = "\
time,open,high,low,close,volume
1700000060,37010,37020,37000,37015,3.5
1700000000,37000.5,37100,36950.25,37050,12.5";
        let tmp_file = create_test_csv(csv_content);
        let candles = CandleCsvParser::load_candles_from_csv(tmp_file.path()).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000);
        assert_eq!(candles[0].open, 37000.5);
        assert_eq!(candles[0].low, 36950.25);
        assert_eq!(candles[0].volume, 12.5);
        assert_eq!(candles[1].time, 1_700_000_060);
        assert_eq!(candles[1].close, 37015.0);
    }

    #[test]
    fn test_millisecond_times_are_converted() {
        let csv_content = "time,open,high,low,close,volume\n1700000000000,1,2,0.5,1.5,10";
        let candles = CandleCsvParser::read_candles(csv_content.as_bytes()).unwrap();
        assert_eq!(candles[0].time, 1_700_000_000);
    }

    #[test]
    fn test_columns_matched_by_header_name() {
        let csv_content = "Volume,Close,Low,High,Open,Time\n10,1.5,0.5,2,1,60";
        let candles = CandleCsvParser::read_candles(csv_content.as_bytes()).unwrap();
        assert_eq!(candles[0], Candle { time: 60, open: 1.0, high: 2.0, low: 0.5, close: 1.5, volume: 10.0 });
    }

    #[test]
    fn test_duplicate_times_collapse() {
        let csv_content = "time,open,high,low,close,volume\n60,1,1,1,1,1\n60,2,2,2,2,2\n120,3,3,3,3,3";
        let candles = CandleCsvParser::read_candles(csv_content.as_bytes()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 1.0);
    }

    #[test]
    fn test_load_candles_from_csv_empty_file() {
        let tmp_file = create_test_csv("time,open,high,low,close,volume");
        let candles = CandleCsvParser::load_candles_from_csv(tmp_file.path()).unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let result = CandleCsvParser::read_candles("time,open,high,low,close\n60,1,1,1,1".as_bytes());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Missing 'volume' column"));
    }

    #[test]
    fn test_invalid_number() {
        let result = CandleCsvParser::read_candles("time,open,high,low,close,volume\n60,abc,1,1,1,1".as_bytes());
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert!(err.to_string().contains("Error parsing 'open' at line 2"));
    }

    #[test]
    fn test_missing_file() {
        let result = CandleCsvParser::load_candles_from_csv("non_existent_file.csv");
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }
}
