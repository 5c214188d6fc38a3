use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::{sleep, timeout, Duration};

use samproai::catalog::sign_with_date;
use samproai::gate::GateState;
use samproai::{
    messages, App, AppConfig, AppEvent, GenerateError, NullAdPlayer, ServiceKind, SessionFlags,
    Store, TextGenerator,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Backend double: records every prompt, pops scripted outcomes, and answers
/// with a stock text once the script runs dry.
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerateError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, outcome: Result<String, GenerateError>) {
        self.responses.lock().unwrap().push_back(outcome);
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("نص مولد".to_string()))
    }
}

struct Harness {
    app: App,
    generator: Arc<ScriptedGenerator>,
    events: Arc<Mutex<Vec<AppEvent>>>,
    dir: PathBuf,
}

impl Harness {
    fn build(config: AppConfig, subscribed: bool) -> Self {
        let dir = std::env::temp_dir().join(format!("samproai-flow-{}", uuid_suffix()));
        let store = Store::open(&dir).expect("open store");
        store.save_config(&config).expect("seed config");
        store
            .save_flags(&SessionFlags {
                subscribed,
                authenticated: false,
            })
            .expect("seed flags");

        let generator = ScriptedGenerator::new();
        let events: Arc<Mutex<Vec<AppEvent>>> = Arc::default();
        let sink_events = Arc::clone(&events);
        let app = App::open(
            &dir,
            Arc::<ScriptedGenerator>::clone(&generator),
            Arc::new(NullAdPlayer),
            Arc::new(move |ev| sink_events.lock().unwrap().push(ev)),
        )
        .expect("open app");

        Self {
            app,
            generator,
            events,
            dir,
        }
    }

    fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    fn ad_starts(&self) -> Vec<(String, u64)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                AppEvent::AdStarted { url, seconds } => Some((url, seconds)),
                _ => None,
            })
            .collect()
    }

    async fn wait_for_result(&self, service: ServiceKind) -> String {
        timeout(Duration::from_secs(120), async {
            loop {
                if let Some(text) = self.app.result(service) {
                    return text;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("generation never resolved")
    }
}

fn uuid_suffix() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn config_with_ads(urls: &[&str], duration: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.ad_settings.video_urls = urls.iter().map(|s| s.to_string()).collect();
    config.ad_settings.duration = duration;
    config
}

// ---------------------------------------------------------------------------
// Flow tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn unsubscribed_submit_shows_the_prompt_and_never_calls_the_backend() {
    let h = Harness::build(config_with_ads(&["https://ads.example/a"], 5), false);

    h.app.submit(ServiceKind::Poem, "الوطن").expect("submit");
    sleep(Duration::from_secs(30)).await;

    assert!(h.events().contains(&AppEvent::SubscriptionPrompt));
    assert_eq!(h.generator.calls(), 0);
    assert_eq!(h.app.gate_state(), GateState::AwaitingSubscription);
    assert!(h.app.is_busy(ServiceKind::Poem));

    // Subscribing resumes the pending request through the ad step.
    h.app.subscribe().expect("subscribe");
    assert!(h.app.is_subscribed());
    h.app.ad_finished();
    let text = h.wait_for_result(ServiceKind::Poem).await;

    assert_eq!(text, "نص مولد");
    assert_eq!(h.generator.calls(), 1);
    assert!(!h.app.is_busy(ServiceKind::Poem));
    assert_eq!(h.app.pending(), None);
}

#[tokio::test(start_paused = true)]
async fn subscribed_submit_plays_exactly_one_configured_ad() {
    let urls = ["https://ads.example/a", "https://ads.example/b"];
    let h = Harness::build(config_with_ads(&urls, 5), true);

    h.app.submit(ServiceKind::Story, "مغامرة").expect("submit");
    h.app.ad_ready();
    let _ = h.wait_for_result(ServiceKind::Story).await;

    let starts = h.ad_starts();
    assert_eq!(starts.len(), 1);
    assert!(urls.contains(&starts[0].0.as_str()));
    assert_eq!(starts[0].1, 5);
    assert_eq!(h.generator.calls(), 1);

    // Five whole seconds of countdown were announced.
    let ticks = h
        .events()
        .iter()
        .filter(|ev| matches!(ev, AppEvent::AdTick { .. }))
        .count();
    assert_eq!(ticks, 5);
}

#[tokio::test(start_paused = true)]
async fn blank_ad_list_dispatches_without_an_ad_step() {
    let h = Harness::build(config_with_ads(&[""], 5), true);

    h.app.submit(ServiceKind::Summary, "نص طويل").expect("submit");
    let _ = h.wait_for_result(ServiceKind::Summary).await;

    assert!(h.ad_starts().is_empty());
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn racing_countdown_and_finish_signal_dispatch_once() {
    let h = Harness::build(config_with_ads(&["https://ads.example/a"], 5), true);

    h.app.submit(ServiceKind::Quiz, "الألوان").expect("submit");
    h.app.ad_ready();
    // The surface reports completion immediately; the countdown and the
    // safety timeout are still armed behind it.
    h.app.ad_finished();
    let _ = h.wait_for_result(ServiceKind::Quiz).await;
    sleep(Duration::from_secs(30)).await;

    assert_eq!(h.generator.calls(), 1);
    assert_eq!(h.app.gate_state(), GateState::Idle);
}

#[tokio::test(start_paused = true)]
async fn the_safety_timeout_rescues_a_silent_playback_surface() {
    let h = Harness::build(config_with_ads(&["https://ads.example/a"], 5), true);

    h.app.submit(ServiceKind::Poem, "البحر").expect("submit");
    // No ad_ready, no ad_finished: the surface is broken.
    let text = h.wait_for_result(ServiceKind::Poem).await;

    assert_eq!(text, "نص مولد");
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn backend_failure_lands_the_localized_message_in_the_result_slot() {
    let h = Harness::build(config_with_ads(&[], 5), true);
    let err = GenerateError::Api {
        code: 400,
        message: "bad request".into(),
    };
    h.generator.push(Err(err.clone()));

    h.app.submit(ServiceKind::CvWriter, "خبرة 5 سنوات").expect("submit");
    let text = h.wait_for_result(ServiceKind::CvWriter).await;

    assert_eq!(text, messages::generation_failure(&err));
    assert!(!h.app.is_busy(ServiceKind::CvWriter));
    assert_eq!(h.app.pending(), None);
    // The failure is announced, but the success tone stays silent.
    assert!(h
        .events()
        .contains(&AppEvent::GenerationFinished {
            service: ServiceKind::CvWriter,
            ok: false
        }));
    assert!(!h.events().contains(&AppEvent::NotifyTone));
}

#[tokio::test(start_paused = true)]
async fn horoscope_request_carries_the_sign_and_date_through_the_gate() {
    let h = Harness::build(config_with_ads(&["https://ads.example/a"], 5), true);

    let raw = sign_with_date("الحمل", "2024-01-01");
    h.app.submit(ServiceKind::Horoscope, &raw).expect("submit");
    h.app.ad_ready();
    let _ = h.wait_for_result(ServiceKind::Horoscope).await;

    assert_eq!(
        h.generator.last_prompt().as_deref(),
        Some("اكتب تحليلاً يومياً ترفيهياً ومضحكاً بأسلوب ظريف لبرج الحمل بتاريخ 2024-01-01")
    );
}

#[tokio::test(start_paused = true)]
async fn post_ad_redirect_opens_with_a_scheme() {
    let mut config = config_with_ads(&[], 5);
    config.ad_settings.post_ad_url = "example.com/offer".into();
    let h = Harness::build(config, true);

    h.app.submit(ServiceKind::Story, "قصة").expect("submit");
    let _ = h.wait_for_result(ServiceKind::Story).await;

    assert!(h.events().contains(&AppEvent::OpenExternal {
        url: "https://example.com/offer".into()
    }));
}

#[tokio::test(start_paused = true)]
async fn dispatch_without_a_pending_request_is_a_no_op() {
    let h = Harness::build(config_with_ads(&[], 5), true);

    h.app.dispatch();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(h.generator.calls(), 0);
    assert_eq!(h.app.gate_state(), GateState::Idle);
}

#[tokio::test(start_paused = true)]
async fn subscription_flag_survives_a_restart() {
    let h = Harness::build(config_with_ads(&[], 5), false);
    h.app.submit(ServiceKind::Poem, "الوطن").expect("submit");
    h.app.subscribe().expect("subscribe");
    let _ = h.wait_for_result(ServiceKind::Poem).await;

    let reopened = App::open(
        &h.dir,
        ScriptedGenerator::new(),
        Arc::new(NullAdPlayer),
        Arc::new(|_| {}),
    )
    .expect("reopen");
    assert!(reopened.is_subscribed());
}

#[tokio::test(start_paused = true)]
async fn disabled_login_never_requires_authentication() {
    let mut config = config_with_ads(&[], 5);
    config.login.enabled = false;
    let h = Harness::build(config, false);

    assert!(!h.app.login_required());

    // Even a stale authenticated=false flag cannot bring the screen back.
    let store = Store::open(&h.dir).expect("open store");
    let flags = store.load_flags();
    assert!(!flags.authenticated);
    assert!(!h.app.login_required());
}

#[tokio::test(start_paused = true)]
async fn login_checks_configured_credentials_and_persists() {
    let h = Harness::build(config_with_ads(&[], 5), false);

    assert!(h.app.login_required());
    assert!(!h.app.login("admin", "wrong").expect("login"));
    assert!(h.app.login_required());

    assert!(h.app.login("admin", "password").expect("login"));
    assert!(!h.app.login_required());
    assert!(Store::open(&h.dir).expect("store").load_flags().authenticated);
}

#[tokio::test(start_paused = true)]
async fn import_replaces_the_data_document_but_not_the_subscription() {
    let h = Harness::build(config_with_ads(&[], 5), true);

    let exported = {
        h.app
            .save_result(ServiceKind::Poem, "الوطن", "بيت شعر")
            .expect("save result");
        h.app.export_data().expect("export")
    };

    let fresh = Harness::build(config_with_ads(&[], 5), false);
    fresh.app.import_data(&exported).expect("import");

    let data = fresh.app.data();
    assert_eq!(data.saved_results.len(), 1);
    assert_eq!(data.saved_results[0].prompt, "الوطن");
    assert_eq!(data.results.len(), ServiceKind::ALL.len());
    // The imported document does not touch the subscription gate.
    assert!(!fresh.app.is_subscribed());
}
