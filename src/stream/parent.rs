//! Slicing a child stream by the records of a parent stream

use super::types::{ReadRequest, SliceRequest, SliceStream, Stream};
use crate::logger::SyncLogger;
use crate::slicing::StreamSlice;
use futures::stream::{StreamExt, TryStreamExt};

/// One slice per parent record, e.g. one per channel for a messages stream
///
/// The parent is read in full-refresh mode, lazily, as the child consumes
/// its slices. Each slice holds `parent_key` of a parent record under
/// `slice_field`; parent records without that key are skipped.
pub fn parent_slices<'a>(
    parent: &'a dyn Stream,
    parent_key: &'a str,
    slice_field: &'a str,
    logger: SyncLogger,
) -> SliceStream<'a> {
    parent
        .stream_slices(SliceRequest::full_refresh(None, logger.clone()))
        .map_ok(move |slice| {
            parent.read_records(ReadRequest::full_refresh(slice, logger.clone()))
        })
        .try_flatten()
        .try_filter_map(move |record| async move {
            Ok(record
                .get(parent_key)
                .filter(|value| !value.is_null())
                .map(|value| StreamSlice::new().with_value(slice_field, value.clone())))
        })
        .boxed()
}
