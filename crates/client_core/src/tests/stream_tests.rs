use super::*;

use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use futures::stream;

fn chunk_stream(
    chunks: Vec<&'static str>,
    polled: Arc<AtomicUsize>,
) -> impl Stream<Item = Result<&'static [u8], Infallible>> {
    stream::iter(chunks).map(move |chunk| {
        polled.fetch_add(1, Ordering::SeqCst);
        Ok(chunk.as_bytes())
    })
}

#[test]
fn decoder_reassembles_lines_split_across_chunks() {
    let mut decoder = LineDecoder::new();
    assert!(decoder.push(b"data: {\"sta").is_empty());
    assert_eq!(decoder.pending(), 11);
    assert_eq!(
        decoder.push(b"tus\":\"A\"}\n\ndata: {}"),
        vec!["data: {\"status\":\"A\"}".to_string(), String::new()]
    );
    assert_eq!(decoder.finish(), Some("data: {}".to_string()));
    assert_eq!(decoder.finish(), None);
}

#[test]
fn decoder_keeps_multibyte_characters_split_across_chunks() {
    let text = "data: {\"status\":\"正在处理\"}\n".as_bytes();
    let (head, tail) = text.split_at(19);
    let mut decoder = LineDecoder::new();
    assert!(decoder.push(head).is_empty());
    assert_eq!(
        decoder.push(tail),
        vec!["data: {\"status\":\"正在处理\"}".to_string()]
    );
}

#[test]
fn decoder_strips_carriage_returns() {
    let mut decoder = LineDecoder::new();
    assert_eq!(
        decoder.push(b"data: {\"status\":\"A\"}\r\n"),
        vec!["data: {\"status\":\"A\"}".to_string()]
    );
}

#[test]
fn non_data_lines_are_framing() {
    assert_eq!(decode_line(""), Ok(None));
    assert_eq!(decode_line(": keep-alive"), Ok(None));
    assert_eq!(decode_line("event: status"), Ok(None));
    assert_eq!(decode_line("data:{\"status\":\"no space\"}"), Ok(None));
}

#[test]
fn data_lines_decode_to_events() {
    assert_eq!(
        decode_line("data: {\"status\":\"A\"}"),
        Ok(Some(StreamEvent::Status("A".to_string())))
    );
    assert_eq!(
        decode_line("data: {\"success\":true,\"download_url\":\"/x\",\"message\":\"done\"}"),
        Ok(Some(StreamEvent::Success {
            download_url: "/x".to_string(),
            message: Some("done".to_string()),
        }))
    );
}

#[test]
fn undecodable_payload_is_malformed() {
    let err = decode_line("data: {not json").expect_err("malformed");
    assert_eq!(err.code, shared::error::ErrorCode::MalformedEvent);
}

#[tokio::test]
async fn success_ends_the_run_without_reading_further_chunks() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec![
            "data: {\"status\":\"A\"}\n",
            "data: {\"success\":true,\"download_url\":\"/x\"}\n",
            "data: {\"status\":\"never seen\"}\n",
        ],
        polled.clone(),
    );

    let mut statuses = Vec::new();
    let outcome = consume_stream(chunks, |status| statuses.push(status.to_string())).await;

    assert_eq!(
        outcome,
        RunOutcome::Succeeded {
            download_url: "/x".to_string(),
            message: None,
        }
    );
    assert_eq!(statuses, vec!["A".to_string()]);
    assert_eq!(polled.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn error_event_is_terminal() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec!["data: {\"error\":\"boom\"}\n", "data: {\"status\":\"late\"}\n"],
        polled.clone(),
    );

    let mut statuses = Vec::new();
    let outcome = consume_stream(chunks, |status| statuses.push(status.to_string())).await;

    assert_eq!(outcome, RunOutcome::ServerError("boom".to_string()));
    assert!(statuses.is_empty());
    assert_eq!(polled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn error_with_mistyped_status_still_ends_the_run() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec!["data: {\"error\":\"boom\",\"status\":5}\n", "data: {\"status\":\"late\"}\n"],
        polled.clone(),
    );

    let mut statuses = Vec::new();
    let outcome = consume_stream(chunks, |status| statuses.push(status.to_string())).await;

    assert_eq!(outcome, RunOutcome::ServerError("boom".to_string()));
    assert!(statuses.is_empty());
    assert_eq!(polled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_inside_one_chunk_are_processed_in_order() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec![concat!(
            "data: {\"status\":\"one\"}\n\n",
            "data: {\"status\":\"two\"}\n\n",
            "data: {\"error\":\"stop\"}\n\n",
            "data: {\"status\":\"three\"}\n\n",
        )],
        polled,
    );

    let mut statuses = Vec::new();
    let outcome = consume_stream(chunks, |status| statuses.push(status.to_string())).await;

    assert_eq!(outcome, RunOutcome::ServerError("stop".to_string()));
    assert_eq!(statuses, vec!["one".to_string(), "two".to_string()]);
}

#[tokio::test]
async fn malformed_lines_do_not_abort_the_run() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec![
            "data: {broken\n",
            "data: {\"success\":true}\n",
            "data: {\"success\":true,\"download_url\":\"/ok\"}\n",
        ],
        polled,
    );

    let outcome = consume_stream(chunks, |_| {}).await;
    assert_eq!(outcome.download_url(), Some("/ok"));
}

#[tokio::test]
async fn event_split_across_chunks_is_delivered() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(
        vec!["data: {\"succ", "ess\":true,\"download_url\":", "\"/split\"}\n"],
        polled,
    );

    let outcome = consume_stream(chunks, |_| {}).await;
    assert_eq!(outcome.download_url(), Some("/split"));
}

#[tokio::test]
async fn unterminated_final_line_is_still_dispatched() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(vec!["data: {\"error\":\"no newline\"}"], polled);

    let outcome = consume_stream(chunks, |_| {}).await;
    assert_eq!(outcome, RunOutcome::ServerError("no newline".to_string()));
}

#[tokio::test]
async fn exhausted_stream_without_terminal_event_reports_stream_end() {
    let polled = Arc::new(AtomicUsize::new(0));
    let chunks = chunk_stream(vec!["data: {\"status\":\"A\"}\n", ": ping\n"], polled);

    let mut statuses = Vec::new();
    let outcome = consume_stream(chunks, |status| statuses.push(status.to_string())).await;

    assert_eq!(outcome, RunOutcome::StreamEnded);
    assert_eq!(statuses, vec!["A".to_string()]);
}

#[tokio::test]
async fn chunk_error_is_a_transport_failure() {
    let chunks = stream::iter(vec![
        Ok(b"data: {\"status\":\"A\"}\n".to_vec()),
        Err("connection reset"),
    ]);

    let outcome = consume_stream(chunks, |_| {}).await;
    assert_eq!(
        outcome,
        RunOutcome::TransportFailure("connection reset".to_string())
    );
}

#[test]
fn failed_outcomes_map_to_error_codes() {
    use shared::error::ErrorCode;

    let success = RunOutcome::Succeeded {
        download_url: "/download/plot.png".into(),
        message: None,
    };
    assert_eq!(success.error(), None);

    let server = RunOutcome::ServerError("bad figure".into())
        .error()
        .expect("server error");
    assert_eq!(server.code, ErrorCode::ServerReportedError);
    assert_eq!(server.message, "bad figure");

    let transport = RunOutcome::TransportFailure("connection reset".into())
        .error()
        .expect("transport error");
    assert_eq!(transport.code, ErrorCode::TransportFailure);
    assert_eq!(
        RunOutcome::StreamEnded.error().map(|err| err.code),
        Some(ErrorCode::TransportFailure)
    );
}
