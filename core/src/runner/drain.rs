use std::io::Read;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::{EventCodec, FrameReader};
use crate::error::DrainError;
use crate::event::Event;
use crate::handler::Handler;

/// Push every frame from `frames` through `chain` until the stream closes.
///
/// `delivered` counts events the chain accepted; it stays accurate if the
/// future is dropped part-way (e.g. by a deadline), because frames are only
/// taken from the buffer at the await point.
pub async fn pump<R>(
    frames: &mut FramedRead<R, EventCodec>,
    chain: &mut dyn Handler,
    delivered: &mut usize,
) -> Result<(), DrainError>
where
    R: AsyncRead + Unpin,
{
    while let Some(item) = frames.next().await {
        let ev = item?;
        chain.observe(&ev)?;
        *delivered += 1;
    }
    Ok(())
}

/// Decode `reader` to the end and feed the chain. Returns the event count.
pub async fn drain<R>(reader: R, codec: EventCodec, chain: &mut dyn Handler) -> Result<usize, DrainError>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, codec);
    let mut delivered = 0;
    pump(&mut frames, chain, &mut delivered)
        .await
        .inspect_err(log_corrupt)?;
    Ok(delivered)
}

pub(crate) fn log_corrupt(e: &DrainError) {
    if let DrainError::Protocol(e) = e {
        tracing::error!(target: "linetrace.runner", error = %e, "event stream is corrupt");
    }
}

/// Blocking counterpart of [`drain`].
pub fn drain_blocking<R: Read>(
    reader: R,
    codec: EventCodec,
    chain: &mut dyn Handler,
) -> Result<usize, DrainError> {
    drain_events(FrameReader::with_codec(reader, codec), chain)
}

/// Feed already-decoded events (e.g. from a JSONL recording) through the chain.
pub fn drain_events<I, E>(events: I, chain: &mut dyn Handler) -> Result<usize, DrainError>
where
    I: IntoIterator<Item = Result<Event, E>>,
    DrainError: From<E>,
{
    let mut delivered = 0;
    for item in events {
        let ev = item.map_err(DrainError::from).inspect_err(log_corrupt)?;
        chain.observe(&ev)?;
        delivered += 1;
    }
    Ok(delivered)
}
