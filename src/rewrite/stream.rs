//! Streaming adapter between an HTTP body and the HTML rewriter.
//!
//! ```text
//! origin chunks ──pump task──▶ [input channel] ──blocking rewriter──▶ [output channel] ──▶ response Body
//! ```
//!
//! The lol_html rewriter is not `Send`, so it lives on a blocking thread for
//! the lifetime of one response. Channels are bounded; a slow client applies
//! backpressure all the way to the origin read. Once the client goes away the
//! rewriter stops, which drops the input channel and ends the origin read.

use std::io;

use axum::body::{Body, Bytes};
use futures_util::{stream, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::rewrite::html::{html_rewriter, RewriteContext};

const CHANNEL_CAPACITY: usize = 16;

/// Wrap an origin byte stream in a rewriting response body.
pub fn rewrite_body<S, E>(ctx: RewriteContext, upstream: S) -> Body
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let (input_tx, mut input_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
    let (output_tx, output_rx) = mpsc::channel::<Result<Bytes, io::Error>>(CHANNEL_CAPACITY);

    let pump_errors = output_tx.clone();
    tokio::spawn(async move {
        let mut upstream = Box::pin(upstream);
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    if input_tx.send(bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Origin body stream failed");
                    let _ = pump_errors.send(Err(io::Error::other(e))).await;
                    break;
                }
            }
        }
    });

    tokio::task::spawn_blocking(move || {
        let sink_tx = output_tx.clone();
        let mut rewriter = html_rewriter(&ctx, move |chunk: &[u8]| {
            if !chunk.is_empty() {
                let _ = sink_tx.blocking_send(Ok(Bytes::copy_from_slice(chunk)));
            }
        });

        while let Some(chunk) = input_rx.blocking_recv() {
            if output_tx.is_closed() {
                tracing::debug!("Client went away, abandoning rewrite");
                return;
            }
            if let Err(e) = rewriter.write(&chunk) {
                tracing::error!(error = %e, "HTML rewrite failed mid-stream");
                let _ = output_tx.blocking_send(Err(io::Error::other(e.to_string())));
                return;
            }
        }

        if output_tx.is_closed() {
            return;
        }
        if let Err(e) = rewriter.end() {
            tracing::error!(error = %e, "HTML rewrite failed at end of document");
            let _ = output_tx.blocking_send(Err(io::Error::other(e.to_string())));
        }
    });

    Body::from_stream(stream::unfold(output_rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }))
}
