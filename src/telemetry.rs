use crate::{block::BlockKind, Descriptor};
use std::time::Duration;

/// Number of tile-channel blocks of each kind in an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockCounts {
    pub uniform: usize,
    pub flat: usize,
    pub packed: usize,
}

impl BlockCounts {
    #[inline]
    pub fn record(&mut self, kind: BlockKind) {
        match kind {
            BlockKind::Uniform => self.uniform += 1,
            BlockKind::Flat => self.flat += 1,
            BlockKind::Packed => self.packed += 1,
        }
    }

    #[inline]
    pub fn merge(&mut self, other: BlockCounts) {
        self.uniform += other.uniform;
        self.flat += other.flat;
        self.packed += other.packed;
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.uniform + self.flat + self.packed
    }
}

/// Summary of one compress or decompress call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    pub descriptor: Descriptor,
    pub elapsed: Duration,
    /// Size of the native pixel buffer.
    pub raw_bytes: usize,
    /// Size of the encoded stream, header included.
    pub encoded_bytes: usize,
    pub blocks: BlockCounts,
}

impl Report {
    /// Encoded size relative to the raw size.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.encoded_bytes as f64 / self.raw_bytes as f64
    }
}

/// Hooks receiving a [`Report`] after every successful call.
///
/// Both methods default to doing nothing.
pub trait Telemetry {
    fn compressed(&self, _report: &Report) {}

    fn decompressed(&self, _report: &Report) {}
}

/// Telemetry that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTelemetry;

impl Telemetry for NoTelemetry {}

/// Telemetry forwarding reports to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn compressed(&self, report: &Report) {
        tracing::info!(
            width = report.descriptor.width,
            height = report.descriptor.height,
            channels = report.descriptor.channels,
            "Compressed {} bytes into {} bytes ({:.1}% of original) in {:?}",
            report.raw_bytes,
            report.encoded_bytes,
            report.ratio() * 100.0,
            report.elapsed
        );
        tracing::info!(
            "Blocks: {} total, {} uniform, {} flat, {} packed",
            report.blocks.total(),
            report.blocks.uniform,
            report.blocks.flat,
            report.blocks.packed
        );
    }

    fn decompressed(&self, report: &Report) {
        tracing::info!(
            width = report.descriptor.width,
            height = report.descriptor.height,
            channels = report.descriptor.channels,
            "Decompressed {} bytes into {} bytes in {:?}",
            report.encoded_bytes,
            report.raw_bytes,
            report.elapsed
        );
    }
}
