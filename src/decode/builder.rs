use super::tokenizer::tokenize_row;
use super::{DecodeOptions, DecodeReport, FIELD_COUNT};
use crate::error::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One device from the feed. Columns, in feed order:
/// retail brand, marketing name, `build.os.DEVICE`, `build.os.MODEL`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct DeviceRecord {
    brand: String,
    name: String,
    device: String,
    model: String,
}

impl DeviceRecord {
    pub fn new(
        brand: impl Into<String>,
        name: impl Into<String>,
        device: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            name: name.into(),
            device: device.into(),
            model: model.into(),
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TryFrom<Vec<String>> for DeviceRecord {
    type Error = FeedError;

    fn try_from(fields: Vec<String>) -> FeedResult<Self> {
        let [brand, name, device, model]: [String; FIELD_COUNT] =
            fields.try_into().map_err(|fields: Vec<String>| FeedError::MalformedRow {
                row: fields.join(","),
                found: fields.len(),
                expected: FIELD_COUNT,
            })?;
        Ok(Self {
            brand,
            name,
            device,
            model,
        })
    }
}

/// Build records from the feed's rows, in order.
///
/// - The first row is the header and is always discarded.
/// - Blank rows are skipped; malformed rows are logged and dropped.
/// - A feed with content but no records is `EmptyFeed` unless
///   `options.allow_empty` is set.
pub fn build_records<'a, I>(
    rows: I,
    options: &DecodeOptions,
) -> FeedResult<(Vec<DeviceRecord>, DecodeReport)>
where
    I: IntoIterator<Item = &'a str>,
{
    let dialect = &options.dialect;
    let mut rows = rows.into_iter();
    let mut report = DecodeReport::default();
    let mut records = Vec::new();

    let mut has_content = false;
    if let Some(header) = rows.next() {
        report.rows += 1;
        has_content = !header.trim().is_empty();
        debug!(header, "discarding header row");
    }

    for (idx, row) in rows.enumerate() {
        report.rows += 1;
        match tokenize_row(row, dialect) {
            Ok(Some(fields)) => {
                has_content = true;
                records.push(DeviceRecord::try_from(fields)?);
            }
            Ok(None) => report.blank += 1,
            Err(FeedError::MalformedRow { row, found, expected }) => {
                has_content = true;
                report.malformed += 1;
                // +2: one-based, header is line 1
                warn!(line = idx + 2, found, expected, row = %row, "dropping malformed row");
            }
            Err(e) => return Err(e),
        }
    }

    report.records = records.len();
    if records.is_empty() && has_content && !options.allow_empty {
        return Err(FeedError::EmptyFeed { rows: report.rows });
    }
    Ok((records, report))
}
