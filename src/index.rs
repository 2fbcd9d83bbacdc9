// src/index.rs

use crate::decode::{parse_feed, DecodeOptions, DecodeReport, DeviceRecord, RawFeed};
use crate::error::{FeedError, FeedResult};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The four queryable columns of a `DeviceRecord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceField {
    Brand,
    Name,
    Device,
    Model,
}

impl DeviceField {
    pub const ALL: [DeviceField; 4] = [
        DeviceField::Brand,
        DeviceField::Name,
        DeviceField::Device,
        DeviceField::Model,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceField::Brand => "brand",
            DeviceField::Name => "name",
            DeviceField::Device => "device",
            DeviceField::Model => "model",
        }
    }

    pub fn value_of<'r>(&self, record: &'r DeviceRecord) -> &'r str {
        match self {
            DeviceField::Brand => record.brand(),
            DeviceField::Name => record.name(),
            DeviceField::Device => record.device(),
            DeviceField::Model => record.model(),
        }
    }
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceField {
    type Err = FeedError;

    fn from_str(s: &str) -> FeedResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "brand" => Ok(DeviceField::Brand),
            "name" => Ok(DeviceField::Name),
            "device" => Ok(DeviceField::Device),
            "model" => Ok(DeviceField::Model),
            other => Err(FeedError::InvalidArgument(format!(
                "unknown field `{}` (expected brand, name, device or model)",
                other
            ))),
        }
    }
}

/// Read-only view over one loaded feed.
///
/// Built once per load and never mutated; a refresh builds a new index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIndex {
    devices: Vec<DeviceRecord>,
    /// Distinct non-empty brands, first-seen order.
    brands: Vec<String>,
}

impl DeviceIndex {
    pub fn from_records(devices: Vec<DeviceRecord>) -> Self {
        let mut seen = HashSet::new();
        let brands = devices
            .iter()
            .map(DeviceRecord::brand)
            .filter(|brand| !brand.is_empty() && seen.insert(*brand))
            .map(str::to_owned)
            .collect();
        Self { devices, brands }
    }

    /// Decode a raw feed straight into a fresh index.
    pub fn load(feed: &RawFeed<'_>, options: &DecodeOptions) -> FeedResult<(Self, DecodeReport)> {
        let (records, report) = parse_feed(feed, options)?;
        Ok((Self::from_records(records), report))
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Exact-match lookup on `field`. A missing query is an `InvalidArgument`;
    /// an empty query matches only records whose field is empty.
    pub fn lookup(
        &self,
        field: DeviceField,
        query: Option<&str>,
    ) -> FeedResult<Vec<&DeviceRecord>> {
        let query = query.ok_or_else(|| {
            FeedError::InvalidArgument(format!("lookup by {} requires a query value", field))
        })?;
        Ok(self.filter(field, query))
    }

    pub fn by_brand(&self, brand: &str) -> Vec<&DeviceRecord> {
        self.filter(DeviceField::Brand, brand)
    }

    pub fn by_name(&self, name: &str) -> Vec<&DeviceRecord> {
        self.filter(DeviceField::Name, name)
    }

    pub fn by_device(&self, device: &str) -> Vec<&DeviceRecord> {
        self.filter(DeviceField::Device, device)
    }

    pub fn by_model(&self, model: &str) -> Vec<&DeviceRecord> {
        self.filter(DeviceField::Model, model)
    }

    fn filter(&self, field: DeviceField, query: &str) -> Vec<&DeviceRecord> {
        self.devices
            .iter()
            .filter(|record| field.value_of(record) == query)
            .collect()
    }
}
