//! Field data normalization.
//!
//! [`normalize`] turns caller field data into the form the template engine
//! consumes: every image payload is written to a temporary file and replaced
//! by an [`ImageResource`](crate::model::ImageResource) describing it, while
//! text, numbers and dates are passed through by reference.
//!
//! Traversal uses an explicit work stack bounded by
//! [`NormalizeOptions::max_depth`], so deeply nested input fails cleanly
//! instead of exhausting the thread stack.

mod options;

pub use options::{ImageSizing, NormalizeOptions, DEFAULT_MAX_DEPTH};

use crate::error::{Error, Result};
use crate::model::{FieldRecord, FieldValue, RenderRecord, RenderValue};
use std::slice;

/// A record or list being built on the work stack.
enum Frame<'a> {
    Record {
        /// Field name this record is stored under in its parent
        key: &'a str,
        depth: usize,
        fields: slice::Iter<'a, (String, FieldValue)>,
        out: RenderRecord<'a>,
    },
    List {
        key: &'a str,
        /// Depth of the record holding the list
        depth: usize,
        rows: slice::Iter<'a, FieldRecord>,
        out: Vec<RenderRecord<'a>>,
    },
}

impl<'a> Frame<'a> {
    fn record(
        key: &'a str,
        depth: usize,
        record: &'a FieldRecord,
        options: &NormalizeOptions,
    ) -> Result<Self> {
        if depth > options.max_depth {
            return Err(Error::NestingTooDeep {
                limit: options.max_depth,
            });
        }
        Ok(Frame::Record {
            key,
            depth,
            fields: record.iter(),
            out: RenderRecord::with_capacity(record.len()),
        })
    }
}

/// Normalize field data for rendering.
///
/// Returns a new record with the same keys in the same order. Each
/// [`FieldValue::Image`] at any depth becomes a [`RenderValue::Image`]
/// backed by a temporary file; list rows keep their order. The input is
/// never modified.
///
/// Fields inside a nested record or a list row sit one level deeper than
/// their container. Exceeding `options.max_depth` fails with
/// [`Error::NestingTooDeep`]. On any error, temporary files created so far
/// are deleted before returning.
///
/// # Example
///
/// ```no_run
/// use docfill::{normalize, release, FieldRecord, FieldValue, NormalizeOptions};
///
/// let data = FieldRecord::new()
///     .with("Title", "Quarterly report")
///     .with("Logo", FieldValue::image(std::fs::read("logo.png")?));
///
/// let mut fields = normalize(&data, &NormalizeOptions::default())?;
/// // ... hand `fields` to a template engine ...
/// release(&mut fields);
/// # Ok::<(), docfill::Error>(())
/// ```
pub fn normalize<'a>(
    record: &'a FieldRecord,
    options: &NormalizeOptions,
) -> Result<RenderRecord<'a>> {
    let mut stack = vec![Frame::record("", 0, record, options)?];
    let mut images = 0usize;

    while let Some(top) = stack.last_mut() {
        let next = match top {
            Frame::Record {
                fields, out, depth, ..
            } => match fields.next() {
                Some((name, value)) => match value {
                    FieldValue::Text(text) => {
                        out.push(name, RenderValue::Text(text));
                        continue;
                    }
                    FieldValue::Number(number) => {
                        out.push(name, RenderValue::Number(*number));
                        continue;
                    }
                    FieldValue::Date(date) => {
                        out.push(name, RenderValue::Date(*date));
                        continue;
                    }
                    FieldValue::Image(bytes) => {
                        let size = options.image_size(name, bytes);
                        let image = options.store.materialize(bytes, size)?;
                        out.push(name, RenderValue::Image(image));
                        images += 1;
                        continue;
                    }
                    FieldValue::Record(nested) => {
                        Some(Frame::record(name, *depth + 1, nested, options)?)
                    }
                    FieldValue::List(rows) => Some(Frame::List {
                        key: name.as_str(),
                        depth: *depth,
                        rows: rows.iter(),
                        out: Vec::with_capacity(rows.len()),
                    }),
                },
                None => None,
            },
            Frame::List {
                key, depth, rows, ..
            } => match rows.next() {
                Some(row) => Some(Frame::record(*key, *depth + 1, row, options)?),
                None => None,
            },
        };

        if let Some(frame) = next {
            stack.push(frame);
            continue;
        }

        // The frame on top is exhausted; attach it to its parent.
        let Some(done) = stack.pop() else { break };
        match (stack.last_mut(), done) {
            (None, Frame::Record { out, .. }) => {
                log::debug!(
                    "Normalized {} top-level fields, {} images materialized",
                    out.len(),
                    images
                );
                return Ok(out);
            }
            (Some(Frame::Record { out: parent, .. }), Frame::Record { key, out, .. }) => {
                parent.push(key, RenderValue::Record(out));
            }
            (Some(Frame::Record { out: parent, .. }), Frame::List { key, out, .. }) => {
                parent.push(key, RenderValue::List(out));
            }
            (Some(Frame::List { out: rows, .. }), Frame::Record { out, .. }) => {
                rows.push(out);
            }
            (_, Frame::List { .. }) => unreachable!("lists are only opened inside records"),
        }
    }

    unreachable!("the root record returns before the stack empties")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{any_exists, release};
    use chrono::NaiveDate;

    fn options(dir: &tempfile::TempDir) -> NormalizeOptions {
        NormalizeOptions::new().with_temp_dir(dir.path())
    }

    fn nested(levels: usize) -> FieldRecord {
        let mut record = FieldRecord::new().with("Leaf", FieldValue::image(vec![7]));
        for _ in 0..levels {
            record = FieldRecord::new().with("Inner", record);
        }
        record
    }

    #[test]
    fn test_scalars_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let data = FieldRecord::new()
            .with("Title", "Certificate")
            .with("Score", 9.5)
            .with("Date", date);

        let out = normalize(&data, &options(&dir)).unwrap();

        let keys: Vec<&str> = out.keys().collect();
        assert_eq!(keys, vec!["Title", "Score", "Date"]);
        match out.get("Title") {
            Some(RenderValue::Text(text)) => match data.get("Title") {
                Some(FieldValue::Text(original)) => {
                    assert!(std::ptr::eq(*text, original.as_str()))
                }
                other => panic!("unexpected input {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(out.get("Score"), Some(RenderValue::Number(n)) if *n == 9.5));
        assert!(matches!(out.get("Date"), Some(RenderValue::Date(d)) if *d == date));
    }

    #[test]
    fn test_image_replaced_input_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data = FieldRecord::new().with("Logo", FieldValue::image(b"PNGDATA".to_vec()));

        let out = normalize(&data, &options(&dir)).unwrap();

        let image = out.get("Logo").and_then(RenderValue::as_image).unwrap();
        assert_eq!(std::fs::read(image.path()).unwrap(), b"PNGDATA");
        assert_eq!((image.width(), image.height()), (100, 100));
        assert_eq!(data.get("Logo"), Some(&FieldValue::Image(b"PNGDATA".to_vec())));
    }

    #[test]
    fn test_list_order_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            FieldRecord::new().with("Name", "Alice"),
            FieldRecord::new().with("Name", "Bob"),
            FieldRecord::new().with("Name", "Carol"),
        ];
        let data = FieldRecord::new().with("Employees", rows);

        let out = normalize(&data, &options(&dir)).unwrap();

        let Some(RenderValue::List(rows)) = out.get("Employees") else {
            panic!("expected list");
        };
        let names: Vec<&str> = rows
            .iter()
            .map(|row| match row.get("Name") {
                Some(RenderValue::Text(name)) => *name,
                _ => "",
            })
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_images_at_every_depth() {
        let dir = tempfile::tempdir().unwrap();
        let row = |n: u8| {
            FieldRecord::new()
                .with("ID", n.to_string())
                .with("Photo", FieldValue::image(vec![n]))
        };
        let data = FieldRecord::new()
            .with("Logo", FieldValue::image(vec![0]))
            .with("Rows", vec![row(1), row(2)])
            .with(
                "Footer",
                FieldRecord::new()
                    .with("Seal", FieldValue::image(vec![9]))
                    .with("Items", vec![row(3)]),
            );

        let out = normalize(&data, &options(&dir)).unwrap();

        assert_eq!(out.images().len(), data.image_count());
        assert_eq!(out.images().len(), 5);

        let Some(RenderValue::Record(footer)) = out.get("Footer") else {
            panic!("expected record");
        };
        assert!(footer.get("Seal").and_then(RenderValue::as_image).is_some());
        let Some(RenderValue::List(items)) = footer.get("Items") else {
            panic!("expected list");
        };
        let photo = items[0].get("Photo").and_then(RenderValue::as_image).unwrap();
        assert_eq!(std::fs::read(photo.path()).unwrap(), vec![3u8]);
    }

    #[test]
    fn test_empty_image() {
        let dir = tempfile::tempdir().unwrap();
        let data = FieldRecord::new().with("Logo", FieldValue::image(Vec::new()));

        let mut out = normalize(&data, &options(&dir)).unwrap();
        let path = out.image_paths()[0].to_path_buf();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        release(&mut out);
        assert!(!path.exists());
    }

    #[test]
    fn test_depth_limit() {
        let dir = tempfile::tempdir().unwrap();

        let data3 = nested(3);
        let ok = normalize(&data3, &options(&dir).with_max_depth(3));
        assert!(ok.is_ok());

        let data4 = nested(4);
        let err = normalize(&data4, &options(&dir).with_max_depth(3));
        assert!(matches!(err, Err(Error::NestingTooDeep { limit: 3 })));
    }

    #[test]
    fn test_list_rows_count_as_level() {
        let dir = tempfile::tempdir().unwrap();
        let data = FieldRecord::new().with("Rows", vec![FieldRecord::new().with("A", "1")]);

        assert!(normalize(&data, &options(&dir).with_max_depth(1)).is_ok());
        assert!(matches!(
            normalize(&data, &options(&dir).with_max_depth(0)),
            Err(Error::NestingTooDeep { limit: 0 })
        ));
    }

    #[test]
    fn test_failure_cleans_up_created_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = FieldRecord::new()
            .with("Logo", FieldValue::image(vec![1, 2, 3]))
            .with("Deep", nested(5));

        let err = normalize(&data, &options(&dir).with_max_depth(2));
        assert!(err.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_deep_input_rejected_at_default_limit() {
        let dir = tempfile::tempdir().unwrap();
        let data = nested(1_000);

        let err = normalize(&data, &options(&dir));
        assert!(matches!(err, Err(Error::NestingTooDeep { limit: 64 })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_release_removes_all() {
        let dir = tempfile::tempdir().unwrap();
        let data = FieldRecord::new()
            .with("A", FieldValue::image(vec![1]))
            .with("Rows", vec![FieldRecord::new().with("B", FieldValue::image(vec![2]))]);

        let mut out = normalize(&data, &options(&dir)).unwrap();
        assert!(any_exists(&out));
        release(&mut out);
        assert!(!any_exists(&out));
        release(&mut out);
    }
}
