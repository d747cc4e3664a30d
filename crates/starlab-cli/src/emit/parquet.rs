//! `repositories.parquet`: the dataset as one Arrow record batch

use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use arrow::array::{
    ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, TimestampMillisecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use starlab_core::{Dataset, RepositoryRecord};

use super::write_atomic;

const ZSTD_LEVEL: i32 = 3;

fn timestamp(name: &str) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())), false)
}

/// repositories.parquet: normalized records with derived columns
pub fn schema() -> &'static Arc<Schema> {
    static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false), // owner/name
            Field::new("name", DataType::Utf8, false),
            Field::new("owner", DataType::Utf8, false),
            Field::new("url", DataType::Utf8, false),
            timestamp("created_at"),
            timestamp("updated_at"),
            Field::new("stars", DataType::UInt64, false),
            Field::new("merged_pull_requests", DataType::UInt64, false),
            Field::new("releases", DataType::UInt64, false),
            Field::new("primary_language", DataType::Utf8, true), // null = unknown
            Field::new("issues", DataType::UInt64, false),
            Field::new("closed_issues", DataType::UInt64, false),
            // Derived at export time
            Field::new("age_days", DataType::Int64, false),
            Field::new("days_since_update", DataType::Int64, false),
            Field::new("closed_issue_ratio", DataType::Float64, true),
        ]))
    });
    &SCHEMA
}

fn strings<'a>(rs: &'a [RepositoryRecord], f: impl Fn(&'a RepositoryRecord) -> &'a str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rs.iter().map(f)))
}

fn counts(rs: &[RepositoryRecord], f: impl Fn(&RepositoryRecord) -> u64) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(rs.iter().map(f)))
}

fn times(rs: &[RepositoryRecord], f: impl Fn(&RepositoryRecord) -> DateTime<Utc>) -> ArrayRef {
    let millis = rs.iter().map(|r| f(r).timestamp_millis());
    Arc::new(TimestampMillisecondArray::from_iter_values(millis).with_timezone("UTC"))
}

pub fn to_record_batch(dataset: &Dataset, now: DateTime<Utc>) -> Result<RecordBatch> {
    let rs = dataset.records();
    let columns: Vec<ArrayRef> = vec![
        strings(rs, |r| r.id.as_str()),
        strings(rs, |r| r.name.as_str()),
        strings(rs, |r| r.owner.as_str()),
        strings(rs, |r| r.url.as_str()),
        times(rs, |r| r.created_at),
        times(rs, |r| r.updated_at),
        counts(rs, |r| r.stars),
        counts(rs, |r| r.merged_pull_requests),
        counts(rs, |r| r.releases),
        Arc::new(StringArray::from_iter(rs.iter().map(|r| r.primary_language.name()))),
        counts(rs, |r| r.issues),
        counts(rs, |r| r.closed_issues),
        Arc::new(Int64Array::from_iter_values(rs.iter().map(|r| r.age_days(now)))),
        Arc::new(Int64Array::from_iter_values(rs.iter().map(|r| r.days_since_update(now)))),
        Arc::new(Float64Array::from_iter(rs.iter().map(|r| r.closed_issue_ratio()))),
    ];

    Ok(RecordBatch::try_new(schema().clone(), columns)?)
}

/// Write the dataset zstd-compressed, via tmp → rename.
pub fn write_dataset(dataset: &Dataset, now: DateTime<Utc>, path: &Path) -> Result<()> {
    let batch = to_record_batch(dataset, now)?;
    write_atomic(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::try_new(ZSTD_LEVEL)?))
            .build();
        let mut writer = ArrowWriter::try_new(file, schema().clone(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;
    use crate::emit::fixtures;

    #[test]
    fn batch_matches_schema() {
        let batch = to_record_batch(&fixtures::dataset(), fixtures::now()).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), schema().fields().len());

        let language = batch.column_by_name("primary_language").unwrap();
        assert!(language.is_null(2));
        let ratio = batch.column_by_name("closed_issue_ratio").unwrap();
        assert!(ratio.is_null(1));
    }

    #[test]
    fn parquet_file_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repositories.parquet");
        write_dataset(&fixtures::dataset(), fixtures::now(), &path).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 3);
    }
}
