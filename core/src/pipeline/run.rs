//! pipeline/run.rs
//! Pure pipeline wiring (no crypto logic).
//!
//! ```text
//! reader ──jobs──▶ worker × N ──results──▶ ordered writer (calling thread)
//!   ▲                                            │
//!   └────────────────── credits ─────────────────┘
//! ```
//!
//! The credit channel starts with `inflight_segments` tokens. The reader
//! spends one per dispatched segment and the writer returns one per segment
//! written, so the reorder buffer never holds more than the window.

use std::io::{Read, Seek, SeekFrom, Write};
use std::thread;
use std::time::Instant;

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, info};

use crate::container::{Container, SegmentDescriptor};
use crate::pipeline::abort::AbortHandle;
use crate::pipeline::io::{read_segment_ciphertext, OrderedPlaintextWriter};
use crate::pipeline::parallelism::ParallelismProfile;
use crate::pipeline::segment::SegmentDecryptor;
use crate::pipeline::types::{SegmentJob, SegmentResult};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::AeaError;

/// Decrypt every segment of `container` from `reader` into `writer`, in order.
///
/// With one worker this drives a `SegmentStream` on the calling thread;
/// otherwise it runs the threaded pipeline. Both produce identical output.
pub fn run_decrypt_pipeline<R, W>(
    reader: R,
    container: &Container,
    decryptor: &SegmentDecryptor,
    profile: &ParallelismProfile,
    abort: &AbortHandle,
    writer: &mut W,
) -> Result<TelemetrySnapshot, AeaError>
where
    R: Read + Seek + Send,
    W: Write,
{
    let mut timer = TelemetryTimer::new();
    let profile = profile.clone().fit_to(container.segment_count());

    debug!(
        workers = profile.worker_count,
        inflight = profile.inflight_segments,
        segments = container.segment_count(),
        "starting decrypt pipeline"
    );

    let (counters, stage_times) = if profile.worker_count <= 1 {
        run_sequential(reader, container, decryptor, abort, writer)?
    } else {
        run_parallel(reader, container, decryptor, &profile, abort, writer)?
    };

    let t = Instant::now();
    writer.flush()?;
    timer.add_stage_time(Stage::Write, t.elapsed());
    timer.stage_times.merge(&stage_times);
    timer.finish();

    let snapshot = TelemetrySnapshot::from(&counters, &timer, profile.worker_count);
    info!(
        segments = snapshot.segments,
        bytes_plaintext = snapshot.bytes_plaintext,
        workers = snapshot.workers,
        elapsed_ms = snapshot.elapsed.as_millis() as u64,
        "decrypt pipeline finished"
    );
    Ok(snapshot)
}

fn run_sequential<R, W>(
    reader: R,
    container: &Container,
    decryptor: &SegmentDecryptor,
    abort: &AbortHandle,
    writer: &mut W,
) -> Result<(TelemetryCounters, StageTimes), AeaError>
where
    R: Read + Seek,
    W: Write,
{
    let mut ordered = OrderedPlaintextWriter::new(writer, container.segment_count() as u32);
    for segment in decryptor.stream(container, reader).with_abort(abort.clone()) {
        let segment = segment?;
        ordered.push(segment.index, Ok(segment))?;
    }
    ordered.finish()
}

fn run_parallel<R, W>(
    reader: R,
    container: &Container,
    decryptor: &SegmentDecryptor,
    profile: &ParallelismProfile,
    abort: &AbortHandle,
    writer: &mut W,
) -> Result<(TelemetryCounters, StageTimes), AeaError>
where
    R: Read + Seek + Send,
    W: Write,
{
    let total = container.segment_count() as u32;
    let segments = container.segments();
    let payload_offset = container.payload_offset();
    let window = profile.inflight_segments;

    thread::scope(|scope| {
        let (job_tx, job_rx) = bounded::<SegmentJob>(window);
        let (res_tx, res_rx) = bounded::<SegmentResult>(window);
        let (credit_tx, credit_rx) = bounded::<()>(window);
        for _ in 0..window {
            credit_tx.send(()).map_err(|_| AeaError::Pipeline("credit channel closed"))?;
        }
        // Dropped once a failure is known, which stops the reader dispatching.
        let mut credit_tx = Some(credit_tx);

        // ---- Reader ----
        let reader_handle = scope.spawn(move || {
            read_segments(reader, segments, payload_offset, job_tx, credit_rx, abort)
        });

        // ---- Workers ----
        for worker_id in 0..profile.worker_count {
            let job_rx = job_rx.clone();
            let res_tx = res_tx.clone();
            scope.spawn(move || decrypt_worker(worker_id, decryptor, job_rx, res_tx, abort));
        }
        drop(job_rx);
        drop(res_tx);

        // ---- Ordered writer ----
        let mut ordered = OrderedPlaintextWriter::new(writer, total);
        while ordered.written() < total {
            if abort.is_cancelled() {
                return Err(AeaError::Cancelled);
            }
            let Ok((index, result)) = res_rx.recv() else {
                break;
            };
            match ordered.push(index, result) {
                Ok(flushed) => {
                    if let Some(failed) = ordered.pending_failure() {
                        // Everything below `failed` is already dispatched; only
                        // those results are still needed to pick the error.
                        if credit_tx.take().is_some() {
                            debug!(segment = failed, "segment failed, reader stops dispatching");
                        }
                    }
                    if let Some(tx) = &credit_tx {
                        for _ in 0..flushed {
                            // Reader may already be done; a closed channel is fine.
                            if tx.send(()).is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    abort.cancel();
                    return Err(e);
                }
            }
        }

        // Workers are gone or everything is written; release the reader.
        drop(credit_tx);
        let read_result = reader_handle
            .join()
            .map_err(|_| AeaError::Pipeline("reader thread panicked"))?;

        if abort.is_cancelled() && ordered.written() < total {
            return Err(AeaError::Cancelled);
        }
        read_result?;
        ordered.finish()
    })
}

fn read_segments<R: Read + Seek>(
    mut reader: R,
    segments: &[SegmentDescriptor],
    payload_offset: u64,
    jobs: Sender<SegmentJob>,
    credits: Receiver<()>,
    abort: &AbortHandle,
) -> Result<(), AeaError> {
    reader.seek(SeekFrom::Start(payload_offset))?;

    for desc in segments {
        if credits.recv().is_err() || abort.is_cancelled() {
            debug!(segment = desc.index, "reader stopping early");
            return Ok(());
        }

        let t = Instant::now();
        let ciphertext = read_segment_ciphertext(&mut reader, desc)?;
        let job = SegmentJob { descriptor: *desc, ciphertext, read_time: t.elapsed() };

        if jobs.send(job).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

fn decrypt_worker(
    worker_id: usize,
    decryptor: &SegmentDecryptor,
    jobs: Receiver<SegmentJob>,
    results: Sender<SegmentResult>,
    abort: &AbortHandle,
) {
    let mut decompressor = decryptor.decompressor();

    for job in jobs.iter() {
        if abort.is_cancelled() {
            break;
        }
        let index = job.descriptor.index;
        let result = decryptor
            .decrypt_segment(&job.descriptor, &job.ciphertext, decompressor.as_mut())
            .map(|mut seg| {
                seg.stage_times.add(Stage::Read, job.read_time);
                seg
            });

        if results.send((index, result)).is_err() {
            break;
        }
    }
    debug!(worker_id, "decrypt worker exiting");
}
