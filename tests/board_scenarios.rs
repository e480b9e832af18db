use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde_json::json;

use job_board::board::job::parse_timestamp;
use job_board::board::{
    Board, BoardParams, Clock, DateWindow, FilterState, FixedClock, Job, JobStatus, SpecialFilter,
    StandardFilter,
};

fn now() -> DateTime<Utc> {
    parse_timestamp("2024-06-15T10:00:00Z").unwrap()
}

fn clock() -> FixedClock {
    FixedClock::at_utc(now())
}

fn utc() -> FixedOffset {
    *clock().now().offset()
}

fn job(value: serde_json::Value) -> Job {
    serde_json::from_value(value).unwrap()
}

fn ids(jobs: &[&Job]) -> Vec<String> {
    jobs.iter().map(|j| j.id.clone()).collect()
}

fn params(pairs: &[(&str, &str)]) -> BoardParams {
    let mut params = BoardParams::default();
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "filter" => params.filter = value,
            "search" => params.search = value,
            "date" => params.date = value,
            "status" => params.status = value,
            "from" => params.from = value,
            "to" => params.to = value,
            other => panic!("unknown param {}", other),
        }
    }
    params
}

fn mixed_snapshot() -> Vec<Job> {
    let ago = |minutes: i64| (now() - Duration::minutes(minutes)).to_rfc3339();
    vec![
        job(json!({ "id": "1", "status": "new", "job_type": "service", "priority": "low",
                    "created_at": ago(60 * 24 * 3), "scheduled_date": "2024-06-12" })),
        job(json!({ "id": "2", "status": "assigned", "job_type": "repair", "priority": "high",
                    "created_at": ago(60 * 24 * 5), "scheduled_date": "2024-06-13",
                    "assigned_technician_id": "t1" })),
        job(json!({ "id": "3", "status": "in_progress", "job_type": "checking", "priority": "medium",
                    "created_at": ago(30), "assigned_technician_id": "t2" })),
        job(json!({ "id": "4", "status": "completed", "job_type": "service", "priority": "low",
                    "created_at": ago(60 * 24 * 10), "scheduled_date": "2024-06-01",
                    "assigned_technician_id": "t3" })),
        job(json!({ "id": "5", "status": "disputed", "job_type": "repair", "priority": "emergency",
                    "created_at": ago(60 * 24 * 40), "scheduled_date": "2024-05-01",
                    "assigned_technician_id": "t1" })),
        job(json!({ "id": "6", "status": "cancelled", "job_type": "courier", "priority": "low",
                    "scheduled_date": "2024-06-02" })),
        job(json!({ "id": "7", "status": "completed_awaiting_ack", "job_type": "service",
                    "priority": "medium", "scheduled_date": "2024-06-03",
                    "assigned_technician_id": "t2" })),
        job(json!({ "id": "8", "status": "assigned", "job_type": "slot_in", "priority": "high",
                    "created_at": ago(4), "assigned_technician_id": "t4",
                    "is_escalated": true })),
        job(json!({ "id": "9", "status": "assigned", "job_type": "service", "priority": "low",
                    "created_at": "garbage", "scheduled_date": "also garbage",
                    "assigned_technician_id": "t5" })),
    ]
}

#[test]
fn scenario_a_slot_in_outranks_emergency_and_completed_is_hidden() {
    let jobs = vec![
        job(json!({ "id": "slot", "status": "assigned", "job_type": "slot_in", "priority": "low",
                    "created_at": (now() - Duration::minutes(20)).to_rfc3339(),
                    "sla_target_minutes": 15 })),
        job(json!({ "id": "emergency", "status": "new", "job_type": "repair",
                    "priority": "emergency", "created_at": now().to_rfc3339() })),
        job(json!({ "id": "done", "status": "completed", "job_type": "service",
                    "priority": "low", "created_at": now().to_rfc3339() })),
    ];

    let state = FilterState::from_params(&params(&[("date", "unfinished"), ("status", "all")]));
    let out = Board::default().apply(&jobs, &state, &clock());
    assert_eq!(ids(&out), vec!["slot", "emergency"]);
}

#[test]
fn scenario_b_search_by_forklift_serial() {
    let mut jobs = mixed_snapshot();
    jobs.push(job(json!({
        "id": "forklift", "status": "assigned", "job_type": "service", "priority": "low",
        "created_at": now().to_rfc3339(), "assigned_technician_id": "t9",
        "forklift": { "serial_number": "xx-acw-102-b", "model": "FD25" }
    })));

    let state = FilterState::from_params(&params(&[("search", "ACW-102")]));
    let out = Board::default().apply(&jobs, &state, &clock());
    assert_eq!(ids(&out), vec!["forklift"]);
}

#[test]
fn scenario_c_custom_window_open_above() {
    let jobs = mixed_snapshot();
    let state = FilterState::from_params(&params(&[
        ("date", "custom"),
        ("from", "2024-06-10"),
        ("to", ""),
    ]));

    let from = parse_timestamp("2024-06-10").unwrap();
    let out = Board::default().apply(&jobs, &state, &clock());

    let expected: Vec<&str> = jobs
        .iter()
        .filter(|j| j.effective_date(utc()).is_some_and(|d| d >= from))
        .map(|j| j.id.as_str())
        .collect();
    let mut got: Vec<String> = ids(&out);
    got.sort();
    let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
    expected.sort();

    assert_eq!(got, expected);
    assert_eq!(got, vec!["1", "2", "3", "8"]);
}

#[test]
fn scenario_d_new_jobs_are_never_overdue() {
    let yesterday = (now() - Duration::days(1)).to_rfc3339();
    let jobs = vec![
        job(json!({ "id": "a", "status": "new", "job_type": "service", "priority": "low",
                    "scheduled_date": yesterday })),
        job(json!({ "id": "b", "status": "new", "job_type": "service", "priority": "low" })),
    ];

    let state = FilterState::special(SpecialFilter::Overdue);
    assert!(Board::default().apply(&jobs, &state, &clock()).is_empty());
}

#[test]
fn overdue_results_are_past_and_open() {
    let jobs = mixed_snapshot();
    let state = FilterState::from_params(&params(&[("filter", "overdue")]));
    let out = Board::default().apply(&jobs, &state, &clock());

    let today = job_board::board::clock::start_of_day(clock().now());
    assert!(!out.is_empty());
    for j in &out {
        let scheduled = j.scheduled_date.and_then(|d| d.start_in(utc()));
        assert!(scheduled.is_some_and(|d| d < today), "job {}", j.id);
        assert!(
            !matches!(
                j.status,
                JobStatus::Completed
                    | JobStatus::Cancelled
                    | JobStatus::CompletedAwaitingAck
                    | JobStatus::New
            ),
            "job {}",
            j.id
        );
    }
    assert_eq!(ids(&out), vec!["5", "2"]);
}

#[test]
fn smaller_sla_target_sorts_first() {
    let created = (now() - Duration::minutes(2)).to_rfc3339();
    let jobs = vec![
        job(json!({ "id": "t30", "status": "assigned", "job_type": "slot_in", "priority": "low",
                    "created_at": created, "sla_target_minutes": 30 })),
        job(json!({ "id": "t10", "status": "assigned", "job_type": "slot_in", "priority": "low",
                    "created_at": created, "sla_target_minutes": 10 })),
    ];
    let state = FilterState::Standard(StandardFilter {
        window: DateWindow::All,
        ..StandardFilter::default()
    });
    let out = Board::default().apply(&jobs, &state, &clock());
    assert_eq!(ids(&out), vec!["t10", "t30"]);
}

#[test]
fn pipeline_is_idempotent() {
    let jobs = mixed_snapshot();
    let board = Board::default();

    for state in [
        FilterState::default(),
        FilterState::from_params(&params(&[("date", "all")])),
        FilterState::from_params(&params(&[("filter", "unassigned")])),
        FilterState::from_params(&params(&[("date", "week"), ("search", "a")])),
    ] {
        let first = ids(&board.apply(&jobs, &state, &clock()));
        let second = ids(&board.apply(&jobs, &state, &clock()));
        assert_eq!(first, second);
    }
}

#[test]
fn ordering_does_not_drift_as_time_passes() {
    let jobs = mixed_snapshot();
    let state = FilterState::from_params(&params(&[("date", "all")]));
    let board = Board::default();

    let early = ids(&board.apply(&jobs, &state, &clock()));
    let later_clock = FixedClock::at_utc(now() + Duration::minutes(3));
    let later = ids(&board.apply(&jobs, &state, &later_clock));
    assert_eq!(early, later);
}

#[test]
fn every_matching_job_appears_exactly_once() {
    let jobs = mixed_snapshot();
    let state = FilterState::from_params(&params(&[("date", "all")]));
    let out = Board::default().apply(&jobs, &state, &clock());

    assert_eq!(out.len(), jobs.len());
    for j in &jobs {
        assert_eq!(out.iter().filter(|o| o.id == j.id).count(), 1, "job {}", j.id);
    }

    // Slot-in pending first, emergency next, malformed dates last
    assert_eq!(out.first().map(|j| j.id.as_str()), Some("8"));
    assert_eq!(out.get(1).map(|j| j.id.as_str()), Some("5"));
    assert_eq!(out.last().map(|j| j.id.as_str()), Some("9"));
}

#[test]
fn default_view_shows_unfinished_work() {
    let jobs = mixed_snapshot();
    let out = Board::default().apply(&jobs, &FilterState::default(), &clock());
    let got = ids(&out);
    assert!(!got.contains(&"4".to_string()));
    assert!(!got.contains(&"7".to_string()));
    assert!(got.contains(&"6".to_string()));
    assert_eq!(got.len(), 7);
}

#[test]
fn status_summary_matches_predicates() {
    let jobs = mixed_snapshot();
    let counts = Board::default().status_counts(&jobs, &clock());

    assert_eq!(counts.total, 9);
    assert_eq!(counts.by_status["assigned"], 3);
    assert_eq!(counts.overdue, 2);
    assert_eq!(counts.unassigned, 1);
    assert_eq!(counts.escalated, 1);
    assert_eq!(counts.awaiting_ack, 1);
    assert_eq!(counts.slot_in_pending, 1);
    assert_eq!(counts.sla_expired, 0);
}

#[test]
fn date_only_schedule_belongs_to_the_local_day() {
    let central = FixedOffset::west_opt(5 * 3600).unwrap();
    // 10:00 on the 15th in UTC-5.
    let local_now = parse_timestamp("2024-06-15T15:00:00Z").unwrap();
    let clock = FixedClock(local_now.with_timezone(&central));
    let jobs = vec![
        job(json!({ "id": "today", "status": "assigned", "job_type": "service",
                    "priority": "low", "scheduled_date": "2024-06-15" })),
        job(json!({ "id": "yesterday", "status": "assigned", "job_type": "service",
                    "priority": "low", "scheduled_date": "2024-06-14" })),
    ];
    let board = Board::default();

    let today = FilterState::from_params(&params(&[("date", "today")]));
    assert_eq!(ids(&board.apply(&jobs, &today, &clock)), vec!["today"]);

    let overdue = FilterState::special(SpecialFilter::Overdue);
    assert_eq!(ids(&board.apply(&jobs, &overdue, &clock)), vec!["yesterday"]);
}

#[test]
fn malformed_sla_target_does_not_break_the_board() {
    let created = (now() - Duration::minutes(5)).to_rfc3339();
    let jobs = vec![
        job(json!({ "id": "huge", "status": "assigned", "job_type": "slot_in", "priority": "low",
                    "created_at": created, "sla_target_minutes": 9_000_000_000_000_000_000i64 })),
        job(json!({ "id": "normal", "status": "assigned", "job_type": "slot_in", "priority": "low",
                    "created_at": created, "sla_target_minutes": "15" })),
    ];
    let state = FilterState::from_params(&params(&[("date", "all")]));
    let board = Board::default();

    assert_eq!(ids(&board.apply(&jobs, &state, &clock())), vec!["normal", "huge"]);
    assert_eq!(board.status_counts(&jobs, &clock()).slot_in_pending, 2);
}
