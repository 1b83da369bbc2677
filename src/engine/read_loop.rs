//! The read loop
//!
//! An explicit state machine driven one message at a time. Streams are read
//! strictly in catalog order; within a stream, slices in order; within a
//! slice, records in order. Nothing is fetched before it is pulled.

use super::plan::StreamPlan;
use super::types::SyncStats;
use crate::error::{Error, Result};
use crate::logger::SyncLogger;
use crate::protocol::Message;
use crate::state::ConnectorState;
use crate::stream::{ReadRequest, RecordStream, SliceRequest, SliceStream};
use futures::StreamExt;
use std::collections::VecDeque;

/// The stream currently being read
struct ActiveStream<'a> {
    plan: StreamPlan<'a>,
    logger: SyncLogger,
    slices: SliceStream<'a>,
    records: Option<RecordStream<'a>>,
    records_read: u64,
    slice_records: u64,
    checkpoints: u64,
}

pub(crate) struct ReadLoop<'a> {
    plans: VecDeque<StreamPlan<'a>>,
    active: Option<ActiveStream<'a>>,
    state: ConnectorState,
    pending: VecDeque<Message>,
    logger: SyncLogger,
    stats: SyncStats,
    finished: bool,
}

impl<'a> ReadLoop<'a> {
    pub(crate) fn new(plans: Vec<StreamPlan<'a>>, state: ConnectorState, logger: SyncLogger) -> Self {
        logger.info("Starting read");
        Self {
            plans: plans.into(),
            active: None,
            state,
            pending: VecDeque::new(),
            logger,
            stats: SyncStats::new(),
            finished: false,
        }
    }

    /// Produce the next message, or `None` once every stream is exhausted
    ///
    /// After an error the loop is fused and yields nothing more.
    pub(crate) async fn next_message(&mut self) -> Option<Result<Message>> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(Ok(message));
            }
            if self.finished {
                return None;
            }

            let Some(active) = self.active.as_mut() else {
                match self.plans.pop_front() {
                    Some(plan) => {
                        self.active = Some(self.start_stream(plan));
                        continue;
                    }
                    None => {
                        self.finished = true;
                        self.logger.info(format!(
                            "Finished read: {} records, {} checkpoints, {} streams",
                            self.stats.records_read,
                            self.stats.checkpoints,
                            self.stats.streams_completed
                        ));
                        return None;
                    }
                }
            };

            if let Some(records) = active.records.as_mut() {
                match records.next().await {
                    Some(Ok(record)) => {
                        active.records_read += 1;
                        active.slice_records += 1;
                        self.stats.add_record();

                        if let Some(incremental) = &active.plan.incremental {
                            let current = self.state.stream_state(&active.plan.name);
                            let updated = incremental
                                .capability
                                .get_updated_state(&current, &record);
                            self.state.set(active.plan.name.clone(), updated);

                            if incremental
                                .checkpoint_interval
                                .is_some_and(|k| active.slice_records % k == 0)
                            {
                                active.checkpoints += 1;
                                self.stats.add_checkpoint();
                                self.pending.push_back(Message::state(self.state.clone()));
                            }
                        }

                        return Some(Ok(Message::record(active.plan.name.clone(), record)));
                    }
                    Some(Err(e)) => return Some(Err(self.fail(e))),
                    None => {
                        active.records = None;
                        self.stats.add_slice();
                        if active.plan.incremental.is_some() {
                            active.checkpoints += 1;
                            self.stats.add_checkpoint();
                            return Some(Ok(Message::state(self.state.clone())));
                        }
                        continue;
                    }
                }
            }

            match active.slices.next().await {
                Some(Ok(slice)) => {
                    active.logger.debug(format!("Reading slice {slice:?}"));
                    active.slice_records = 0;
                    let request = match &active.plan.incremental {
                        Some(incremental) => ReadRequest::incremental(
                            slice,
                            self.state.stream_state(&active.plan.name),
                            Some(incremental.cursor_field.clone()),
                            active.logger.clone(),
                        ),
                        None => ReadRequest::full_refresh(slice, active.logger.clone()),
                    };
                    active.records = Some(active.plan.stream.read_records(request));
                }
                Some(Err(e)) => return Some(Err(self.fail(e))),
                None => {
                    // a stream with no slices still reports its (seeded) state
                    let trailing = active.plan.incremental.is_some() && active.checkpoints == 0;
                    active.logger.info(format!(
                        "Read {} records from {} stream",
                        active.records_read, active.plan.name
                    ));
                    self.stats.add_stream();
                    self.active = None;

                    if trailing {
                        self.stats.add_checkpoint();
                        return Some(Ok(Message::state(self.state.clone())));
                    }
                }
            }
        }
    }

    fn start_stream(&self, plan: StreamPlan<'a>) -> ActiveStream<'a> {
        let logger = self.logger.for_stream(&plan.name);
        let slices = match &plan.incremental {
            Some(incremental) => {
                logger.info(format!(
                    "Syncing stream {} incrementally on cursor {}",
                    plan.name, incremental.cursor_field
                ));
                plan.stream.stream_slices(SliceRequest::incremental(
                    self.state.stream_state(&plan.name),
                    incremental.cursor_field.clone(),
                    logger.clone(),
                ))
            }
            None => {
                logger.info(format!("Syncing stream {} in full refresh", plan.name));
                plan.stream.stream_slices(SliceRequest::full_refresh(
                    plan.configured_cursor.clone(),
                    logger.clone(),
                ))
            }
        };

        ActiveStream {
            plan,
            logger,
            slices,
            records: None,
            records_read: 0,
            slice_records: 0,
            checkpoints: 0,
        }
    }

    /// Log a fatal error against the active stream and fuse the loop
    fn fail(&mut self, error: Error) -> Error {
        if let Some(active) = self.active.take() {
            active.logger.error(format!(
                "Encountered an error while reading stream {} after {} records: {error}",
                active.plan.name, active.records_read
            ));
        }
        self.pending.clear();
        self.finished = true;
        error
    }
}
