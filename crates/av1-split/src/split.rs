//! Regrouping scanned OBUs into temporal units.
//!
//! Every OBU belongs to the frame currently being assembled. A
//! temporal delimiter flushes the previous frame before starting the
//! next one; end of input forces a final flush. Completed frames go
//! to a [`FrameSink`], injected so the accumulation policy stays free
//! of filesystem coupling.

use std::io;

use tracing::{error, warn};

use crate::error::{Av1SplitError, Result};
use crate::obu::ObuType;
use crate::scan::{ObuRecord, ObuScanner};

/// A destination for completed frames.
///
/// `index` is a monotonically increasing counter starting at 0,
/// advanced only on a successful write.
pub trait FrameSink {
    /// Durably persists one frame's bytes under the given index.
    fn write_frame(&mut self, index: u64, frame: &[u8]) -> io::Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn write_frame(&mut self, index: u64, frame: &[u8]) -> io::Result<()> {
        (**self).write_frame(index, frame)
    }
}

/// Run totals accumulated by a [`FrameSplitter`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitStats {
    /// Frames successfully written to the sink.
    pub frames: u64,
    /// Total bytes written across all frames.
    pub frame_bytes: u64,
    /// OBUs consumed from the scanner.
    pub obus: u64,
    /// Frame writes the sink rejected.
    pub sink_errors: u64,
}

/// Result of a full [`split_stream`] run.
#[derive(Debug)]
pub struct SplitOutcome {
    /// Run totals.
    pub stats: SplitStats,
    /// Set when the scan stopped early on a truncated OBU. The final
    /// flush has still been performed in that case.
    pub truncation: Option<Av1SplitError>,
}

/// Accumulates OBUs into frames and flushes them to a sink.
pub struct FrameSplitter<'a, S> {
    data: &'a [u8],
    sink: S,
    frame: Vec<u8>,
    stats: SplitStats,
}

impl<'a, S: FrameSink> FrameSplitter<'a, S> {
    /// Creates a splitter over the scanned buffer.
    ///
    /// `data` must be the same buffer the records were scanned from;
    /// frame bytes are sliced out of it on append.
    pub fn new(data: &'a [u8], sink: S) -> Self {
        Self {
            data,
            sink,
            frame: Vec::new(),
            stats: SplitStats::default(),
        }
    }

    /// Consumes one scanned OBU.
    ///
    /// A temporal delimiter flushes the in-progress frame first and
    /// then starts the next one with its own bytes.
    pub fn push(&mut self, record: &ObuRecord) {
        if record.obu_type == ObuType::TemporalDelimiter {
            self.flush();
        }
        self.frame
            .extend_from_slice(&self.data[record.start..record.end()]);
        self.stats.obus += 1;
    }

    /// Writes the in-progress frame to the sink, if non-empty.
    ///
    /// On sink failure the accumulated bytes are kept and the index
    /// does not advance, so the next flush retries them merged with
    /// whatever has been appended since.
    pub fn flush(&mut self) {
        if self.frame.is_empty() {
            return;
        }

        match self.sink.write_frame(self.stats.frames, &self.frame) {
            Ok(()) => {
                self.stats.frame_bytes += self.frame.len() as u64;
                self.stats.frames += 1;
                self.frame.clear();
            }
            Err(err) => {
                error!("cannot write frame {}: {err}", self.stats.frames);
                self.stats.sink_errors += 1;
            }
        }
    }

    /// Performs the final flush and returns the run totals.
    pub fn finish(mut self) -> SplitStats {
        self.flush();
        self.stats
    }
}

/// Scans `data` and splits it into temporal units, one sink write per
/// completed frame.
///
/// A truncated trailing OBU stops the scan, still flushes the
/// accumulated frame, and is reported in [`SplitOutcome::truncation`].
/// An OBU without a size field aborts immediately: nothing after it
/// is scanned and the in-progress frame is discarded, not flushed.
pub fn split_stream<S: FrameSink>(data: &[u8], sink: S) -> Result<SplitOutcome> {
    let mut splitter = FrameSplitter::new(data, sink);
    let mut truncation = None;

    for record in ObuScanner::new(data) {
        match record {
            Ok(record) => splitter.push(&record),
            Err(err @ Av1SplitError::Truncated { .. }) => {
                warn!("stopping scan: {err}");
                truncation = Some(err);
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(SplitOutcome {
        stats: splitter.finish(),
        truncation,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::obu::write_leb128;

    fn obu(obu_type: ObuType, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![(u8::from(obu_type) << 3) | 0x02];
        write_leb128(&mut out, payload.len() as u64).unwrap();
        out.extend_from_slice(payload);
        out
    }

    fn td() -> Vec<u8> {
        obu(ObuType::TemporalDelimiter, &[])
    }

    #[derive(Default)]
    struct VecSink {
        frames: Vec<(u64, Vec<u8>)>,
        // Writes to reject before starting to accept.
        fail_first: usize,
    }

    impl FrameSink for VecSink {
        fn write_frame(&mut self, index: u64, frame: &[u8]) -> io::Result<()> {
            if self.fail_first > 0 {
                self.fail_first -= 1;
                return Err(io::Error::other("sink closed"));
            }
            self.frames.push((index, frame.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_boundary_splitting() {
        let a = obu(ObuType::Frame, b"aaaa");
        let b = obu(ObuType::Frame, b"bb");
        let c = obu(ObuType::Frame, b"cccccc");

        let mut data = Vec::new();
        for payload in [&a, &b, &c] {
            data.extend(td());
            data.extend(payload);
        }

        let mut sink = VecSink::default();
        let outcome = split_stream(&data, &mut sink).unwrap();

        assert!(outcome.truncation.is_none());
        assert_eq!(outcome.stats.frames, 3);
        assert_eq!(outcome.stats.obus, 6);
        assert_eq!(outcome.stats.frame_bytes, data.len() as u64);
        assert_eq!(outcome.stats.sink_errors, 0);

        let expected: Vec<Vec<u8>> = [&a, &b, &c]
            .iter()
            .map(|payload| {
                let mut frame = td();
                frame.extend_from_slice(payload);
                frame
            })
            .collect();
        assert_eq!(sink.frames.len(), 3);
        for (index, frame) in &sink.frames {
            assert_eq!(frame, &expected[*index as usize]);
        }
    }

    #[derive(Default, Clone)]
    struct SharedSink(Rc<RefCell<Vec<(u64, Vec<u8>)>>>);

    impl FrameSink for SharedSink {
        fn write_frame(&mut self, index: u64, frame: &[u8]) -> io::Result<()> {
            self.0.borrow_mut().push((index, frame.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_frame_flushed_only_at_next_delimiter() {
        let mut stream = td();
        stream.extend(obu(ObuType::Frame, b"a"));
        stream.extend(td());

        let sink = SharedSink::default();
        let mut splitter = FrameSplitter::new(&stream, sink.clone());
        let records: Vec<_> = ObuScanner::new(&stream)
            .collect::<Result<_>>()
            .unwrap();

        splitter.push(&records[0]);
        splitter.push(&records[1]);
        assert!(sink.0.borrow().is_empty());

        // The second delimiter is what flushes frame 0.
        splitter.push(&records[2]);
        assert_eq!(sink.0.borrow().len(), 1);

        splitter.finish();
        assert_eq!(sink.0.borrow().len(), 2);
    }

    #[test]
    fn test_no_delimiters_yields_single_frame() {
        let mut data = obu(ObuType::SequenceHeader, &[0x10; 8]);
        data.extend(obu(ObuType::Frame, &[0x20; 32]));

        let mut sink = VecSink::default();
        let outcome = split_stream(&data, &mut sink).unwrap();

        assert_eq!(outcome.stats.frames, 1);
        assert_eq!(sink.frames, [(0, data.clone())]);
    }

    #[test]
    fn test_leading_units_before_first_delimiter() {
        let seq = obu(ObuType::SequenceHeader, &[0x10; 4]);
        let frame = obu(ObuType::Frame, b"xy");

        let mut data = seq.clone();
        data.extend(td());
        data.extend(&frame);

        let mut sink = VecSink::default();
        let outcome = split_stream(&data, &mut sink).unwrap();

        assert_eq!(outcome.stats.frames, 2);
        assert_eq!(sink.frames[0].1, seq);
        let mut second = td();
        second.extend(&frame);
        assert_eq!(sink.frames[1].1, second);
    }

    #[test]
    fn test_empty_input_flushes_nothing() {
        let mut sink = VecSink::default();
        let outcome = split_stream(&[], &mut sink).unwrap();
        assert_eq!(outcome.stats, SplitStats::default());
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_empty_flush_is_a_no_op() {
        let mut sink = VecSink::default();
        let mut splitter = FrameSplitter::new(&[], &mut sink);
        splitter.flush();
        splitter.flush();
        assert_eq!(splitter.finish(), SplitStats::default());
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_truncation_still_flushes_accumulated_frame() {
        let mut data = td();
        data.extend(obu(ObuType::Frame, b"payload"));
        // Declares 64 payload bytes, stream ends here.
        data.extend([0x32, 0x40]);

        let mut sink = VecSink::default();
        let outcome = split_stream(&data, &mut sink).unwrap();

        assert!(matches!(
            outcome.truncation,
            Some(Av1SplitError::Truncated { .. })
        ));
        assert_eq!(outcome.stats.frames, 1);
        assert_eq!(outcome.stats.obus, 2);
        // Everything before the truncated unit survives.
        assert_eq!(sink.frames[0].1, data[..data.len() - 2]);
    }

    #[test]
    fn test_unsupported_variant_does_not_flush_partial_frame() {
        let mut data = td();
        data.extend(obu(ObuType::Frame, b"first"));
        let first_unit_len = data.len();
        data.extend(td());
        data.extend(obu(ObuType::Frame, b"second"));
        data.push(0x08); // obu_has_size_field=0

        let mut sink = VecSink::default();
        let err = split_stream(&data, &mut sink).unwrap_err();
        assert!(matches!(err, Av1SplitError::MissingSizeField));

        // The first temporal unit was flushed when the second
        // delimiter arrived; the in-progress second unit is dropped.
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].1, data[..first_unit_len]);
    }

    #[test]
    fn test_failing_sink_retains_bytes() {
        let a = obu(ObuType::Frame, b"aa");
        let b = obu(ObuType::Frame, b"bbbb");

        let mut data = td();
        data.extend(&a);
        data.extend(td());
        data.extend(&b);

        let mut sink = VecSink {
            fail_first: 1,
            ..Default::default()
        };
        let outcome = split_stream(&data, &mut sink).unwrap();

        // The rejected frame's bytes merged into the final flush.
        assert_eq!(outcome.stats.sink_errors, 1);
        assert_eq!(outcome.stats.frames, 1);
        assert_eq!(sink.frames, [(0, data.clone())]);
    }
}
