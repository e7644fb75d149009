mod utils;

use utils::{at_millis, build_harness, ingest, sdvx_key, sdvx_submission};

use scorevault::chart::ChartInfo;
use scorevault::event::UserEvent;
use scorevault::pb::PbRepository;
use scorevault::profile::{AchievementLogRepository, ProfileRepository, ProfileStats};
use scorevault::session::{SessionOutcomeKind, SessionRepository};

fn catalog() -> Vec<ChartInfo> {
    vec![
        ChartInfo::new("chart-a", "iLLness LiLin", 17.0, 2600),
        ChartInfo::new("chart-b", "Bangin' Burst", 16.0, 2400),
    ]
}

const HOUR: i64 = 60 * 60 * 1000;
const T0: i64 = 1_700_000_000_000;

#[tokio::test]
async fn first_import_builds_sessions_pbs_ranks_and_profile() {
    let harness = build_harness(catalog());
    let mut events = harness.event_bus.subscribe_to_user("user-1").await;

    let summary = ingest(
        &harness,
        "user-1",
        vec![
            sdvx_submission("s1", "user-1", "chart-a", Some(T0), 9_500_000, "CLEAR", 31.0),
            sdvx_submission(
                "s2",
                "user-1",
                "chart-a",
                Some(T0 + HOUR / 2),
                9_200_000,
                "EXCESSIVE CLEAR",
                97.0,
            ),
            sdvx_submission(
                "s3",
                "user-1",
                "chart-b",
                Some(T0 + HOUR),
                8_800_000,
                "CLEAR",
                45.0,
            ),
        ],
    )
    .await;

    // one evening of play, two charts touched
    assert_eq!(summary.sessions.len(), 1);
    assert_eq!(summary.sessions[0].kind, SessionOutcomeKind::Created);
    assert_eq!(summary.charts_processed, 2);
    assert_eq!(summary.pbs_updated, 2);

    let session = harness
        .sessions
        .get_session(&summary.sessions[0].session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.submission_ids, vec!["s1", "s2", "s3"]);
    assert_eq!(session.time_started, at_millis(T0));
    assert_eq!(session.time_ended, at_millis(T0 + HOUR));

    // the chart-a PB composes best score (s1) with best lamp (s2),
    // carrying s2's gauge, and re-derives the grade from the merged score
    let pb = harness.pbs.get("user-1", "chart-a").await.unwrap().unwrap();
    assert_eq!(pb.score_data.integer("score"), Some(9_500_000));
    assert_eq!(pb.score_data.enum_label("lamp"), Some("EXCESSIVE CLEAR"));
    assert_eq!(pb.score_data.decimal("gauge"), Some(97.0));
    assert_eq!(pb.score_data.enum_label("grade"), Some("AA+"));

    let provenance: Vec<(&str, &str)> = pb
        .composed_from
        .iter()
        .map(|e| (e.name.as_str(), e.submission_id.as_str()))
        .collect();
    assert_eq!(provenance, vec![("bestScore", "s1"), ("bestLamp", "s2")]);

    let rank_data = pb.rank_data.unwrap();
    assert_eq!(rank_data.rank, 1);
    assert_eq!(rank_data.out_of, 1);

    // profile: volforce summed over both PBs, classes derived from it
    let profile: ProfileStats = harness
        .profiles
        .get("user-1", sdvx_key())
        .await
        .unwrap()
        .unwrap();
    let vf6 = profile.ratings.get("vf6").copied().flatten().unwrap();
    assert!((vf6 - (31.95 + 24.78)).abs() < 1e-9);
    assert!(profile.classes.contains_key("vfClass"));
    assert!(profile.classes.contains_key("dan"));

    assert_eq!(summary.deltas.len(), 2);
    assert_eq!(
        harness.achievements.list_for_user("user-1").await.unwrap().len(),
        2
    );

    // accepted deltas also land on the event bus
    let UserEvent::ClassDeltaAchieved { delta } = events.recv().await.unwrap();
    assert_eq!(delta.user_id, "user-1");
    assert_eq!(delta.old, None);
}

#[tokio::test]
async fn follow_up_batch_appends_the_session_and_improves_the_pb() {
    let harness = build_harness(catalog());

    let first = ingest(
        &harness,
        "user-1",
        vec![
            sdvx_submission("s1", "user-1", "chart-a", Some(T0), 9_500_000, "CLEAR", 31.0),
            sdvx_submission(
                "s2",
                "user-1",
                "chart-a",
                Some(T0 + HOUR / 2),
                9_200_000,
                "EXCESSIVE CLEAR",
                97.0,
            ),
        ],
    )
    .await;
    let session_id = first.sessions[0].session_id.clone();

    // 90 minutes after the last play: still the same session
    let second = ingest(
        &harness,
        "user-1",
        vec![sdvx_submission(
            "s4",
            "user-1",
            "chart-a",
            Some(T0 + 2 * HOUR),
            9_800_000,
            "FAILED",
            3.0,
        )],
    )
    .await;

    assert_eq!(second.sessions.len(), 1);
    assert_eq!(second.sessions[0].kind, SessionOutcomeKind::Appended);
    assert_eq!(second.sessions[0].session_id, session_id);

    let session = harness
        .sessions
        .get_session(&session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.submission_ids, vec!["s1", "s2", "s4"]);
    assert_eq!(session.time_ended, at_millis(T0 + 2 * HOUR));

    // the new score seeds the PB; the old EXCESSIVE CLEAR lamp survives
    let pb = harness.pbs.get("user-1", "chart-a").await.unwrap().unwrap();
    assert_eq!(pb.score_data.integer("score"), Some(9_800_000));
    assert_eq!(pb.score_data.enum_label("lamp"), Some("EXCESSIVE CLEAR"));
    assert_eq!(pb.score_data.enum_label("grade"), Some("AAA+"));

    let provenance: Vec<(&str, &str)> = pb
        .composed_from
        .iter()
        .map(|e| (e.name.as_str(), e.submission_id.as_str()))
        .collect();
    assert_eq!(provenance, vec![("bestScore", "s4"), ("bestLamp", "s2")]);
}

#[tokio::test]
async fn chart_ranks_update_across_users() {
    let harness = build_harness(catalog());

    ingest(
        &harness,
        "user-1",
        vec![sdvx_submission(
            "u1-s1", "user-1", "chart-a", Some(T0), 9_500_000, "CLEAR", 40.0,
        )],
    )
    .await;

    // a second user outscores the first; both documents re-rank
    ingest(
        &harness,
        "user-2",
        vec![sdvx_submission(
            "u2-s1",
            "user-2",
            "chart-a",
            Some(T0 + HOUR),
            9_900_000,
            "CLEAR",
            55.0,
        )],
    )
    .await;

    let first = harness.pbs.get("user-1", "chart-a").await.unwrap().unwrap();
    let second = harness.pbs.get("user-2", "chart-a").await.unwrap().unwrap();
    assert_eq!(first.rank_data.unwrap().rank, 2);
    assert_eq!(first.rank_data.unwrap().out_of, 2);
    assert_eq!(second.rank_data.unwrap().rank, 1);

    let rival_rank = harness
        .ranker
        .update_rival_rank(sdvx_key(), "chart-a", "user-1", &["user-2".to_string()])
        .await
        .unwrap();
    assert_eq!(rival_rank, Some(2));
}

#[tokio::test]
async fn untimestamped_scores_reach_the_pb_but_never_a_session() {
    let harness = build_harness(catalog());

    let summary = ingest(
        &harness,
        "user-1",
        vec![sdvx_submission(
            "s1", "user-1", "chart-a", None, 9_100_000, "CLEAR", 22.0,
        )],
    )
    .await;

    assert!(summary.sessions.is_empty());
    assert_eq!(summary.pbs_updated, 1);

    let pb = harness.pbs.get("user-1", "chart-a").await.unwrap().unwrap();
    assert_eq!(pb.time_achieved, None);
}

#[tokio::test]
async fn provided_class_survives_a_weaker_recompute() {
    let harness = build_harness(catalog());

    // an authoritative dan is already on record
    let mut stored = ProfileStats::new("user-1", sdvx_key());
    stored.classes.insert("dan".to_string(), "INF".to_string());
    harness.profiles.upsert(&stored).await.unwrap();

    let summary = ingest(
        &harness,
        "user-1",
        vec![sdvx_submission(
            "s1", "user-1", "chart-b", Some(T0), 8_000_000, "CLEAR", 18.0,
        )],
    )
    .await;

    let profile = harness
        .profiles
        .get("user-1", sdvx_key())
        .await
        .unwrap()
        .unwrap();

    // the modest import derives a much lower dan, which is not an upgrade
    assert_eq!(profile.classes.get("dan").map(String::as_str), Some("INF"));
    assert!(summary.deltas.iter().all(|d| d.set != "dan"));

    // the derived colour class still tracks the fresh ratings
    assert!(profile.classes.contains_key("vfClass"));
}
