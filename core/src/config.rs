use crate::error::{RadarError, RadarResult};
use crate::types::Won;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Column schema ────────────────────────────────────────────────────

/// Source column names for every field the record normalizer reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSchema {
    pub region_name: String,
    pub neighborhood_code: String,
    pub neighborhood_name: String,
    pub industry: String,
    pub period_code: String,
    pub period_year: String,
    pub period_quarter: String,
    pub total_sales: String,
    pub weekend_sales: String,
    /// 10s, 20s, 30s, 40s, 50s, 60s+
    pub age_sales: [String; 6],
    /// 00-06, 06-11, 11-14, 14-17, 17-21, 21-24
    pub time_slot_sales: [String; 6],
    /// Mon..Sun
    pub day_sales: [String; 7],
    pub closure_rate: String,
    pub store_count: String,
}

impl ColumnSchema {
    /// Headers of the Seoul commercial-district sales and store datasets.
    pub fn seoul() -> Self {
        Self {
            region_name:       "자치구_코드_명".into(),
            neighborhood_code: "행정동_코드".into(),
            neighborhood_name: "행정동_코드_명".into(),
            industry:          "서비스_업종_코드_명".into(),
            period_code:       "기준_년분기_코드".into(),
            period_year:       "기준_년_코드".into(),
            period_quarter:    "기준_분기_코드".into(),
            total_sales:       "당월_매출_금액".into(),
            weekend_sales:     "주말_매출_금액".into(),
            age_sales: [
                "연령대_10_매출_금액".into(),
                "연령대_20_매출_금액".into(),
                "연령대_30_매출_금액".into(),
                "연령대_40_매출_금액".into(),
                "연령대_50_매출_금액".into(),
                "연령대_60_이상_매출_금액".into(),
            ],
            time_slot_sales: [
                "시간대_00~06_매출_금액".into(),
                "시간대_06~11_매출_금액".into(),
                "시간대_11~14_매출_금액".into(),
                "시간대_14~17_매출_금액".into(),
                "시간대_17~21_매출_금액".into(),
                "시간대_21~24_매출_금액".into(),
            ],
            day_sales: [
                "월요일_매출_금액".into(),
                "화요일_매출_금액".into(),
                "수요일_매출_금액".into(),
                "목요일_매출_금액".into(),
                "금요일_매출_금액".into(),
                "토요일_매출_금액".into(),
                "일요일_매출_금액".into(),
            ],
            closure_rate: "폐업_률".into(),
            store_count:  "점포_수".into(),
        }
    }
}

// ── District code table ──────────────────────────────────────────────

/// One entry of the code-prefix → region name lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistrictCode {
    pub code: String,
    pub name: String,
}

const SEOUL_DISTRICTS: [(&str, &str); 25] = [
    ("11110", "종로구"),   ("11140", "중구"),     ("11170", "용산구"),
    ("11200", "성동구"),   ("11215", "광진구"),   ("11230", "동대문구"),
    ("11260", "중랑구"),   ("11290", "성북구"),   ("11305", "강북구"),
    ("11320", "도봉구"),   ("11350", "노원구"),   ("11380", "은평구"),
    ("11410", "서대문구"), ("11440", "마포구"),   ("11470", "양천구"),
    ("11500", "강서구"),   ("11530", "구로구"),   ("11545", "금천구"),
    ("11560", "영등포구"), ("11590", "동작구"),   ("11620", "관악구"),
    ("11650", "서초구"),   ("11680", "강남구"),   ("11710", "송파구"),
    ("11740", "강동구"),
];

/// Length of the region prefix inside a neighborhood code.
pub const DISTRICT_CODE_LEN: usize = 5;

// ── Units ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayUnits {
    /// Base units per revenue display unit (억원). Also the unit of the
    /// minimum-revenue threshold entered by users.
    pub revenue_unit: Won,
    /// Base units per efficiency display unit (만원).
    pub efficiency_unit: Won,
}

impl Default for DisplayUnits {
    fn default() -> Self {
        Self {
            revenue_unit:    100_000_000.0,
            efficiency_unit: 10_000.0,
        }
    }
}

// ── Top-level config ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadarConfig {
    pub columns: ColumnSchema,
    pub district_codes: Vec<DistrictCode>,
    #[serde(default)]
    pub units: DisplayUnits,
    #[serde(default = "default_unknown_region")]
    pub unknown_region: String,
}

fn default_unknown_region() -> String {
    "Unknown".into()
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self::seoul()
    }
}

impl RadarConfig {
    /// Built-in configuration for the Seoul datasets.
    pub fn seoul() -> Self {
        Self {
            columns: ColumnSchema::seoul(),
            district_codes: SEOUL_DISTRICTS
                .iter()
                .map(|(code, name)| DistrictCode {
                    code: (*code).into(),
                    name: (*name).into(),
                })
                .collect(),
            units: DisplayUnits::default(),
            unknown_region: default_unknown_region(),
        }
    }

    /// Load from a JSON file and validate it.
    /// Without a file, use RadarConfig::seoul().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: RadarConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RadarResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.district_codes {
            if entry.code.chars().count() != DISTRICT_CODE_LEN {
                return Err(RadarError::InvalidConfig {
                    reason: format!(
                        "district code '{}' must be {DISTRICT_CODE_LEN} characters",
                        entry.code
                    ),
                });
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(RadarError::InvalidConfig {
                    reason: format!("duplicate district code '{}'", entry.code),
                });
            }
        }
        if self.units.revenue_unit <= 0.0 || self.units.efficiency_unit <= 0.0 {
            return Err(RadarError::InvalidConfig {
                reason: "display units must be positive".into(),
            });
        }
        Ok(())
    }
}
