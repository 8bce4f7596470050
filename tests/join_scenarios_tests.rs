//! Join semantics over in-memory streams.


use std::io::{self, Cursor, Read};

use framejoin_core::row;
use framejoin_core::types::{Row, Scalar};
use framejoin_operators::{
    InputStream, JoinPhase, LocalHashJoin, OpError, Operator, OutputStream, Stats,
};
use test_data_gen::{frames, keyed_rows, malformed_frame, read_rows, truncated_frame};

fn join(positions: Vec<usize>, build: Vec<u8>, probe: Vec<u8>) -> (Vec<Row>, Stats) {
    let op = LocalHashJoin::new(positions).unwrap();
    let mut stats = Stats::new();
    let mut out: Vec<u8> = Vec::new();
    op.execute(Cursor::new(build), Cursor::new(probe), &mut out, &mut stats);
    (read_rows(&out), stats)
}

#[test]
fn scenario_a_only_matching_keys_are_emitted() {
    let (out, stats) = join(
        vec![0],
        frames(&[row!["a", 1i64], row!["b", 2i64]]),
        frames(&[row!["a", 10i64], row!["c", 30i64]]),
    );
    assert_eq!(out, vec![row!["a", 10i64, 1i64]]);
    assert_eq!(stats.rows_emitted, 1);
    assert_eq!(stats.probe_rows_read, 2);
    assert!(!stats.is_degraded());
}

#[test]
fn scenario_b_duplicate_build_key_keeps_last_value() {
    let (out, stats) = join(
        vec![0],
        frames(&[row!["a", 1i64], row!["a", 2i64]]),
        frames(&[row!["a", 9i64]]),
    );
    assert_eq!(out, vec![row!["a", 9i64, 2i64]]);
    assert_eq!(stats.table_entries, 1);
    assert_eq!(stats.build_keys_overwritten, 1);
}

#[test]
fn scenario_c_malformed_build_frame_stops_build_only() {
    let mut build = frames(&[row!["a", 1i64], row!["b", 2i64], row!["c", 3i64]]);
    build.extend(malformed_frame());
    build.extend(frames(&[row!["d", 4i64]]));

    let (out, stats) = join(
        vec![0],
        build,
        frames(&[row!["c", 30i64], row!["d", 40i64], row!["a", 10i64]]),
    );

    assert_eq!(stats.build_rows_read, 3);
    assert_eq!(stats.table_entries, 3);
    assert_eq!(stats.build_errors, 1);
    assert_eq!(stats.probe_errors, 0);
    assert_eq!(stats.total_errors(), 1);
    assert_eq!(stats.diagnostics.len(), 1);
    assert_eq!(stats.diagnostics[0].phase, JoinPhase::Building);
    assert_eq!(stats.diagnostics[0].kind, "decode");

    // "d" sat behind the bad frame, so it never reached the table.
    assert_eq!(out, vec![row!["c", 30i64, 3i64], row!["a", 10i64, 1i64]]);
    assert_eq!(stats.phase, JoinPhase::Done);
}

#[test]
fn one_output_per_matching_probe_row_in_arrival_order() {
    let (out, _) = join(
        vec![0],
        frames(&[row!["k", "build"]]),
        frames(&[row!["k", 1i64], row!["x", 2i64], row!["k", 3i64], row!["k", 4i64]]),
    );
    let seconds: Vec<&Scalar> = out.iter().map(|r| &r[1]).collect();
    assert_eq!(seconds, vec![&Scalar::I64(1), &Scalar::I64(3), &Scalar::I64(4)]);
    assert!(out.iter().all(|r| r[2] == Scalar::Str("build".into())));
}

#[test]
fn composite_keys_come_first_in_configured_order() {
    // Key is (col 2, col 0); value keeps the remaining columns in order.
    let (out, _) = join(
        vec![2, 0],
        frames(&[row!["x", 1i64, "y", true]]),
        frames(&[row!["x", "probe-mid", "y"]]),
    );
    assert_eq!(out, vec![row!["y", "x", "probe-mid", 1i64, true]]);
}

#[test]
fn keys_compare_by_type_and_bits() {
    let (out, _) = join(
        vec![0],
        frames(&[row![1i64, "i64"], row![0.0f64, "zero"]]),
        frames(&[row![1i32, "i32"], row![-0.0f64, "neg"], row![0.0f64, "pos"]]),
    );
    assert_eq!(out, vec![row![0.0f64, "pos", "zero"]]);
}

#[test]
fn nan_keys_match_only_the_same_bits() {
    let other_nan = f64::from_bits(0x7ff8_0000_0000_0001);
    assert!(other_nan.is_nan());
    assert_ne!(other_nan.to_bits(), f64::NAN.to_bits());

    let (out, stats) = join(
        vec![0],
        frames(&[row![f64::NAN, "build"]]),
        frames(&[row![f64::NAN, "same"], row![other_nan, "other"]]),
    );
    assert_eq!(stats.rows_emitted, 1);
    assert_eq!(out.len(), 1);
    match &out[0][..] {
        [Scalar::F64(k), Scalar::Str(p), Scalar::Str(b)] => {
            assert_eq!(k.to_bits(), f64::NAN.to_bits());
            assert_eq!((p.as_str(), b.as_str()), ("same", "build"));
        }
        other => panic!("unexpected row {other:?}"),
    }
}

#[test]
fn null_keys_match_each_other() {
    let (out, _) = join(
        vec![0],
        frames(&[vec![Scalar::Null, Scalar::from("b")]]),
        frames(&[vec![Scalar::Null, Scalar::from("p")]]),
    );
    assert_eq!(out, vec![vec![Scalar::Null, Scalar::from("p"), Scalar::from("b")]]);
}

#[test]
fn identical_inputs_give_identical_output_bytes() {
    let build = frames(&keyed_rows(200, 37));
    let probe = frames(&keyed_rows(500, 50));
    let op = LocalHashJoin::new(vec![0]).unwrap();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let mut out: Vec<u8> = Vec::new();
        op.execute(
            Cursor::new(build.clone()),
            Cursor::new(probe.clone()),
            &mut out,
            &mut Stats::new(),
        );
        outputs.push(out);
    }
    assert_eq!(outputs[0], outputs[1]);
    assert!(!outputs[0].is_empty());
}

#[test]
fn empty_build_drains_probe_and_emits_nothing() {
    let probe = frames(&keyed_rows(10, 10));
    let probe_len = probe.len() as u64;
    let (out, stats) = join(vec![0], Vec::new(), probe);
    assert!(out.is_empty());
    assert_eq!(stats.table_entries, 0);
    assert_eq!(stats.probe_rows_read, 0);
    assert_eq!(stats.probe_bytes_drained, probe_len);
    assert!(!stats.is_degraded());
}

#[test]
fn drain_does_not_decode_probe_frames() {
    let mut probe = frames(&[row!["a", 1i64]]);
    probe.extend(malformed_frame());
    let (out, stats) = join(vec![0], Vec::new(), probe);
    assert!(out.is_empty());
    assert_eq!(stats.probe_errors, 0);
}

#[test]
fn truncated_probe_stream_keeps_earlier_matches() {
    let mut probe = frames(&[row!["a", 1i64], row!["a", 2i64]]);
    probe.extend(truncated_frame());
    let (out, stats) = join(vec![0], frames(&[row!["a", "b"]]), probe);
    assert_eq!(out.len(), 2);
    assert_eq!(stats.probe_errors, 1);
    assert_eq!(stats.diagnostics[0].kind, "decode");
}

#[test]
fn build_row_narrower_than_key_stops_build() {
    let (out, stats) = join(
        vec![1],
        frames(&[row!["a", "k1"], row!["short"], row!["b", "k2"]]),
        frames(&[row!["p", "k1"], row!["q", "k2"]]),
    );
    assert_eq!(stats.table_entries, 1);
    assert_eq!(stats.build_errors, 1);
    assert_eq!(stats.diagnostics[0].kind, "key");
    assert_eq!(out, vec![row!["k1", "p", "a"]]);
}

#[test]
fn one_stats_sink_accumulates_over_invocations() {
    let op = LocalHashJoin::new(vec![0]).unwrap();
    let mut stats = Stats::new();
    let mut first: Vec<u8> = Vec::new();
    let mut second: Vec<u8> = Vec::new();

    op.execute(
        Cursor::new(frames(&[row!["a", 1i64]])),
        Cursor::new(frames(&[row!["a", 10i64]])),
        &mut first,
        &mut stats,
    );
    let mut bad_build = frames(&[row!["b", 2i64]]);
    bad_build.extend(malformed_frame());
    op.execute(
        Cursor::new(bad_build),
        Cursor::new(frames(&[row!["b", 20i64], row!["a", 30i64]])),
        &mut second,
        &mut stats,
    );

    assert_eq!(read_rows(&first), vec![row!["a", 10i64, 1i64]]);
    assert_eq!(read_rows(&second), vec![row!["b", 20i64, 2i64]]);
    assert_eq!(stats.invocations, 2);
    assert_eq!(stats.phase, JoinPhase::Done);
    assert_eq!(stats.build_rows_read, 2);
    assert_eq!(stats.probe_rows_read, 3);
    assert_eq!(stats.rows_emitted, 2);
    assert_eq!(stats.table_entries, 2);
    assert_eq!(stats.build_errors, 1);
    assert_eq!(stats.diagnostics[0].phase, JoinPhase::Building);
}

struct FailingReader {
    ok: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.ok.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
            n => Ok(n),
        }
    }
}

#[test]
fn upstream_read_failure_is_recorded_against_its_phase() {
    let op = LocalHashJoin::new(vec![0]).unwrap();
    let mut stats = Stats::new();
    let mut out: Vec<u8> = Vec::new();
    op.execute(
        FailingReader { ok: Cursor::new(frames(&[row!["a", 1i64]])) },
        Cursor::new(frames(&[row!["a", 2i64]])),
        &mut out,
        &mut stats,
    );
    assert_eq!(stats.build_errors, 1);
    assert_eq!(stats.diagnostics[0].kind, "upstream_read");
    assert_eq!(read_rows(&out), vec![row!["a", 2i64, 1i64]]);
}

#[test]
fn run_checks_stream_counts() {
    let op = LocalHashJoin::new(vec![0]).unwrap();
    let mut stats = Stats::new();
    let inputs: Vec<InputStream<'_>> = vec![Box::new(Cursor::new(Vec::<u8>::new()))];
    let outputs: Vec<OutputStream<'_>> = vec![Box::new(Vec::<u8>::new())];

    let err = op.run(inputs, outputs, &mut stats).unwrap_err();
    assert!(matches!(err, OpError::Arity { inputs: 1, outputs: 1, .. }));
    assert_eq!(stats.phase, JoinPhase::Idle);
}

#[test]
fn run_through_operator_trait() {
    let op = LocalHashJoin::new(vec![0]).unwrap();
    let mut stats = Stats::new();
    let mut out: Vec<u8> = Vec::new();
    {
        let inputs: Vec<InputStream<'_>> = vec![
            Box::new(Cursor::new(frames(&[row!["a", 1i64]]))),
            Box::new(Cursor::new(frames(&[row!["a", 2i64]]))),
        ];
        let outputs: Vec<OutputStream<'_>> = vec![Box::new(&mut out)];
        op.run(inputs, outputs, &mut stats).unwrap();
    }
    assert_eq!(read_rows(&out), vec![row!["a", 2i64, 1i64]]);
}
