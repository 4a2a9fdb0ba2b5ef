//! Market vocabulary shared by the DSL and the collaborator ports.
//!
//! These enums mirror the spellings strategy documents use in JSON
//! (`"1day"`, `"equity"`, `"entry_price"`, ...). `Display` reproduces the
//! JSON spelling so canonical keys and diagnostics read the same way the
//! strategy was written.

use serde::Deserialize;
use std::fmt;

/// A tradeable instrument as named by a strategy document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Instrument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub ticker: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Equity,
    Options,
    Futures,
}

/// Candle aggregation interval for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum CandleTime {
    #[serde(rename = "1min")]
    Min1,
    #[serde(rename = "5min")]
    Min5,
    #[serde(rename = "1hour")]
    Hour1,
    #[serde(rename = "1day")]
    Day1,
    #[serde(rename = "1week")]
    Week1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nse,
    Bse,
}

/// Named field of a candle bar, selected by a `key` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl CandleField {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "open" => Some(CandleField::Open),
            "high" => Some(CandleField::High),
            "low" => Some(CandleField::Low),
            "close" => Some(CandleField::Close),
            "volume" => Some(CandleField::Volume),
            _ => None,
        }
    }
}

/// Named field of a historical position, selected by a `key` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionField {
    EntryPrice,
    Quantity,
}

impl PositionField {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "entry_price" => Some(PositionField::EntryPrice),
            "quantity" => Some(PositionField::Quantity),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Equity => write!(f, "equity"),
            AssetKind::Options => write!(f, "options"),
            AssetKind::Futures => write!(f, "futures"),
        }
    }
}

impl fmt::Display for CandleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleTime::Min1 => write!(f, "1min"),
            CandleTime::Min5 => write!(f, "5min"),
            CandleTime::Hour1 => write!(f, "1hour"),
            CandleTime::Day1 => write!(f, "1day"),
            CandleTime::Week1 => write!(f, "1week"),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exchange::Nse => write!(f, "NSE"),
            Exchange::Bse => write!(f, "BSE"),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ticker, self.kind)
    }
}

impl fmt::Display for CandleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleField::Open => write!(f, "open"),
            CandleField::High => write!(f, "high"),
            CandleField::Low => write!(f, "low"),
            CandleField::Close => write!(f, "close"),
            CandleField::Volume => write!(f, "volume"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_deserializes_from_json_shape() {
        let inst: Instrument = serde_json::from_str(
            r#"{"name": "Reliance", "type": "equity", "ticker": "RELIANCE"}"#,
        )
        .unwrap();
        assert_eq!(inst.ticker, "RELIANCE");
        assert_eq!(inst.kind, AssetKind::Equity);
        assert_eq!(inst.to_string(), "RELIANCE:equity");
    }

    #[test]
    fn candletime_spellings_round_trip() {
        for (text, value) in [
            ("1min", CandleTime::Min1),
            ("5min", CandleTime::Min5),
            ("1hour", CandleTime::Hour1),
            ("1day", CandleTime::Day1),
            ("1week", CandleTime::Week1),
        ] {
            let parsed: CandleTime =
                serde_json::from_str(&format!("\"{}\"", text)).unwrap();
            assert_eq!(parsed, value);
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn candletime_rejects_unknown_spelling() {
        assert!(serde_json::from_str::<CandleTime>("\"2day\"").is_err());
    }

    #[test]
    fn candle_field_parse() {
        assert_eq!(CandleField::parse("close"), Some(CandleField::Close));
        assert_eq!(CandleField::parse("volume"), Some(CandleField::Volume));
        assert_eq!(CandleField::parse("vwap"), None);
    }

    #[test]
    fn position_field_parse() {
        assert_eq!(
            PositionField::parse("entry_price"),
            Some(PositionField::EntryPrice)
        );
        assert_eq!(PositionField::parse("quantity"), Some(PositionField::Quantity));
        assert_eq!(PositionField::parse("size"), None);
    }

    #[test]
    fn exchange_deserializes_uppercase() {
        let e: Exchange = serde_json::from_str("\"NSE\"").unwrap();
        assert_eq!(e, Exchange::Nse);
        assert_eq!(e.to_string(), "NSE");
    }
}
