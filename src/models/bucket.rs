use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Time grouping used to key popularity data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketGranularity {
    #[default]
    Day,
    /// ISO week, starting on Monday
    Week,
    Month,
}

impl BucketGranularity {
    /// Maps a delivery date to the bucket that contains it
    pub fn bucket_of(self, date: NaiveDate) -> DateBucket {
        let start = match self {
            BucketGranularity::Day => date,
            BucketGranularity::Week => {
                date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()))
            }
            BucketGranularity::Month => date - TimeDelta::days(i64::from(date.day0())),
        };
        DateBucket(start)
    }
}

/// First day of a bucket; buckets order chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateBucket(NaiveDate);

impl Display for DateBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
