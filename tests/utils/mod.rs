use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};

use scorevault::capability::CapabilityTable;
use scorevault::chart::{ChartInfo, InMemoryChartRepository};
use scorevault::event::UserEventBus;
use scorevault::games::{GameId, GameKey, Playtype};
use scorevault::import::ImportService;
use scorevault::pb::{ChartRanker, InMemoryPbRepository, PbService};
use scorevault::profile::{InMemoryAchievementLog, InMemoryProfileRepository, ProfileService};
use scorevault::score::{
    InMemorySubmissionRepository, MetricValue, ScoreData, Submission, SubmissionRepository,
};
use scorevault::session::{InMemorySessionRepository, PetNameSessionNameGenerator, SessionService};

static TRACING: Once = Once::new();

/// Initializes test logging once; respects RUST_LOG.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub struct TestHarness {
    pub submissions: Arc<InMemorySubmissionRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub pbs: Arc<InMemoryPbRepository>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub achievements: Arc<InMemoryAchievementLog>,
    pub ranker: Arc<ChartRanker>,
    pub event_bus: UserEventBus,
    pub import: ImportService,
}

/// Wires the full pipeline over in-memory stores and the given catalog.
pub fn build_harness(charts: Vec<ChartInfo>) -> TestHarness {
    init_tracing();

    let submissions = Arc::new(InMemorySubmissionRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());
    let pbs = Arc::new(InMemoryPbRepository::new());
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let achievements = Arc::new(InMemoryAchievementLog::new());
    let chart_repo = Arc::new(InMemoryChartRepository::with_charts(charts));
    let capabilities = Arc::new(CapabilityTable::standard());
    let event_bus = UserEventBus::new();

    let session_service = Arc::new(SessionService::new(
        sessions.clone(),
        submissions.clone(),
        capabilities.clone(),
        Arc::new(PetNameSessionNameGenerator::new()),
    ));
    let pb_service = Arc::new(PbService::new(
        capabilities.clone(),
        submissions.clone(),
        chart_repo.clone(),
        pbs.clone(),
    ));
    let ranker = Arc::new(ChartRanker::new(capabilities.clone(), pbs.clone()));
    let profile_service = Arc::new(
        ProfileService::builder(
            capabilities.clone(),
            pbs.clone(),
            chart_repo.clone(),
            profiles.clone(),
            achievements.clone(),
        )
        .with_event_bus(event_bus.clone())
        .build(),
    );

    let import = ImportService::new(
        session_service,
        pb_service,
        ranker.clone(),
        profile_service,
    );

    TestHarness {
        submissions,
        sessions,
        pbs,
        profiles,
        achievements,
        ranker,
        event_bus,
        import,
    }
}

pub fn sdvx_key() -> GameKey {
    GameKey::new(GameId::Sdvx, Playtype::Single)
}

pub fn at_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

const SDVX_LAMPS: &[&str] = &[
    "FAILED",
    "CLEAR",
    "EXCESSIVE CLEAR",
    "ULTIMATE CHAIN",
    "PERFECT ULTIMATE CHAIN",
];

fn sdvx_lamp_index(lamp: &str) -> u32 {
    SDVX_LAMPS
        .iter()
        .position(|l| *l == lamp)
        .unwrap_or_else(|| panic!("unknown test lamp: {lamp}")) as u32
}

/// A normalized SDVX submission the way ingestion would hand it over.
pub fn sdvx_submission(
    id: &str,
    user_id: &str,
    chart_id: &str,
    time_millis: Option<i64>,
    score: i64,
    lamp: &str,
    gauge: f64,
) -> Submission {
    let mut score_data = ScoreData::new();
    score_data.set("score", MetricValue::Integer(score));
    score_data.set_enum("lamp", lamp, sdvx_lamp_index(lamp));
    score_data.set("gauge", MetricValue::Decimal(gauge));

    Submission {
        id: id.to_string(),
        user_id: user_id.to_string(),
        chart_id: chart_id.to_string(),
        game_key: sdvx_key(),
        time_achieved: time_millis.map(at_millis),
        score_data,
        calculated_data: Default::default(),
        highlight: false,
    }
}

/// Stores a batch in the submission store and runs it through the
/// pipeline, the way the import job does.
pub async fn ingest(
    harness: &TestHarness,
    user_id: &str,
    batch: Vec<Submission>,
) -> scorevault::import::ImportSummary {
    for submission in &batch {
        harness.submissions.insert(submission).await.unwrap();
    }
    harness
        .import
        .process_batch(user_id, sdvx_key(), &batch)
        .await
        .unwrap()
}
