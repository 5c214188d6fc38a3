use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::catalog::ServiceKind;
use crate::gate::{self, AdGate, AdStep, GateDecision, GateState, SAFETY_GRACE_SECS};
use crate::gemini::TextGenerator;
use crate::messages;
use crate::store::{AppConfig, AppData, CustomAd, SavedResult, SessionFlags, Store};
use crate::sync::{self, GistStore, SyncError};

// ---------------------------------------------------------------------------
// Root controller. Owns the persisted documents and the gate machine behind
// one lock; the view layer drives it through methods and listens on the
// event sink.
// ---------------------------------------------------------------------------

/// Notifications for the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A submit arrived from an unsubscribed user; show the subscription prompt.
    SubscriptionPrompt,
    /// An ad clip was chosen and loaded into the playback surface.
    AdStarted { url: String, seconds: u64 },
    /// One second of the ad countdown elapsed.
    AdTick { remaining: u64 },
    /// Open a URL in a new tab / external browser. Failing to open it is
    /// never fatal.
    OpenExternal { url: String },
    /// The backend call for a service resolved; the result slot holds either
    /// the generated text or a localized failure message.
    GenerationFinished { service: ServiceKind, ok: bool },
    /// Play the short success tone.
    NotifyTone,
}

pub type EventSink = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Capability interface over the ad playback surface. The surface signals
/// back through [`App::ad_ready`] and [`App::ad_finished`]; a surface that
/// never signals is covered by the safety timeout.
pub trait AdPlayer: Send + Sync {
    fn load(&self, url: &str);
}

/// Surface for headless runs: loads nothing and never signals, leaving the
/// safety timeout to drive completion.
pub struct NullAdPlayer;

impl AdPlayer for NullAdPlayer {
    fn load(&self, _url: &str) {}
}

/// The single pending (service, prompt) pair awaiting backend dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub service: ServiceKind,
    pub prompt: String,
}

struct AppState {
    config: AppConfig,
    data: AppData,
    flags: SessionFlags,
    gate: AdGate,
    pending: Option<GenerationRequest>,
    busy: BTreeSet<ServiceKind>,
}

#[derive(Clone)]
pub struct App {
    state: Arc<Mutex<AppState>>,
    store: Arc<Store>,
    generator: Arc<dyn TextGenerator>,
    player: Arc<dyn AdPlayer>,
    events: EventSink,
    http: reqwest::Client,
    gists: Arc<GistStore>,
}

impl App {
    /// Load all persisted documents from `dir` and build the controller.
    pub fn open(
        dir: impl Into<PathBuf>,
        generator: Arc<dyn TextGenerator>,
        player: Arc<dyn AdPlayer>,
        events: EventSink,
    ) -> Result<Self> {
        let store = Store::open(dir).context("failed to open app store")?;
        let config = store.load_config();
        let data = store.load_data();
        let flags = store.load_flags();
        info!(
            services = ServiceKind::ALL.len(),
            subscribed = flags.subscribed,
            "loaded app documents"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(AppState {
                config,
                data,
                flags,
                gate: AdGate::new(),
                pending: None,
                busy: BTreeSet::new(),
            })),
            store: Arc::new(store),
            generator,
            player,
            events,
            http: reqwest::Client::new(),
            gists: Arc::new(GistStore::new()),
        })
    }

    // State is only ever replaced whole-value under the lock, so even a
    // poisoned mutex still holds a consistent document.
    fn lock(&self) -> MutexGuard<'_, AppState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, event: AppEvent) {
        (self.events)(event);
    }

    fn persist_data(&self, state: &AppState) {
        if let Err(e) = self.store.save_data(&state.data) {
            warn!("failed to persist app data: {e:#}");
        }
    }

    // -----------------------------------------------------------------------
    // Read accessors for the view layer
    // -----------------------------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.lock().config.clone()
    }

    pub fn data(&self) -> AppData {
        self.lock().data.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().flags.subscribed
    }

    pub fn is_busy(&self, service: ServiceKind) -> bool {
        self.lock().busy.contains(&service)
    }

    pub fn result(&self, service: ServiceKind) -> Option<String> {
        self.lock().data.results.get(&service).cloned().flatten()
    }

    pub fn pending(&self) -> Option<GenerationRequest> {
        self.lock().pending.clone()
    }

    pub fn gate_state(&self) -> GateState {
        self.lock().gate.state()
    }

    // -----------------------------------------------------------------------
    // Generation flow
    // -----------------------------------------------------------------------

    /// Sole entry point for a generation request. Assembles the full prompt,
    /// installs it as the pending request (last submit wins) and consults the
    /// gate machine.
    pub fn submit(&self, service: ServiceKind, raw_prompt: &str) -> Result<()> {
        let prompt = service.config().full_prompt(raw_prompt);
        let decision = {
            let mut st = self.lock();
            st.data.results.insert(service, None);
            st.busy.insert(service);
            st.pending = Some(GenerationRequest { service, prompt });
            self.persist_data(&st);
            let subscribed = st.flags.subscribed;
            st.gate.request(subscribed)
        };

        match decision {
            GateDecision::NeedSubscription => {
                self.emit(AppEvent::SubscriptionPrompt);
                Ok(())
            }
            GateDecision::StartAd => self.start_ad_flow(),
        }
    }

    /// The subscription action: open the external link and, with no
    /// verification at all, mark the user subscribed and resume the pending
    /// request. A local trust boundary, not a paywall.
    pub fn subscribe(&self) -> Result<()> {
        let (resume, url) = {
            let mut st = self.lock();
            st.flags.subscribed = true;
            self.store
                .save_flags(&st.flags)
                .context("failed to persist subscription flag")?;
            (st.gate.on_subscribed(), st.config.subscription_url.clone())
        };

        if !url.trim().is_empty() {
            self.emit(AppEvent::OpenExternal { url });
        }
        if resume {
            self.start_ad_flow()?;
        }
        Ok(())
    }

    fn start_ad_flow(&self) -> Result<()> {
        let step = {
            let mut st = self.lock();
            let settings = st.config.ad_settings.clone();
            st.gate.begin_ad(&settings)
        };

        match step {
            AdStep::Skip => {
                self.after_ad_step();
                Ok(())
            }
            AdStep::Play {
                url,
                duration_secs,
                seq,
            } => {
                self.player.load(&url);
                self.emit(AppEvent::AdStarted {
                    url,
                    seconds: duration_secs,
                });

                // Safety timeout: the surface may never signal ready or
                // finished; forward progress is guaranteed regardless.
                let app = self.clone();
                tokio::spawn(async move {
                    sleep(Duration::from_secs(duration_secs + SAFETY_GRACE_SECS)).await;
                    if app.lock().gate.try_finish(seq) {
                        warn!(seq, "playback surface never signalled; forcing ad completion");
                        app.after_ad_step();
                    }
                });
                Ok(())
            }
        }
    }

    /// The playback surface reports the clip is actually playing; start the
    /// countdown.
    pub fn ad_ready(&self) {
        let (seq, seconds) = {
            let st = self.lock();
            if st.gate.state() != GateState::AwaitingAd {
                return;
            }
            (st.gate.current_seq(), st.config.ad_settings.duration)
        };

        let app = self.clone();
        tokio::spawn(async move {
            let mut remaining = seconds;
            while remaining > 0 {
                sleep(Duration::from_secs(1)).await;
                remaining -= 1;
                {
                    let st = app.lock();
                    if st.gate.state() != GateState::AwaitingAd || st.gate.current_seq() != seq {
                        return;
                    }
                }
                app.emit(AppEvent::AdTick { remaining });
            }
            if app.lock().gate.try_finish(seq) {
                app.after_ad_step();
            }
        });
    }

    /// External "ad finished" signal from the playback surface.
    pub fn ad_finished(&self) {
        if self.lock().gate.finish_current() {
            self.after_ad_step();
        }
    }

    /// Post-ad redirect, then dispatch. Runs exactly once per ad step thanks
    /// to the gate's sequence guard.
    fn after_ad_step(&self) {
        let post_ad = self.lock().config.ad_settings.post_ad_url.clone();
        if let Some(url) = gate::normalize_redirect_url(&post_ad) {
            self.emit(AppEvent::OpenExternal { url });
        }
        self.dispatch();
    }

    /// Consume the pending request and call the backend on a background
    /// task. No-op when nothing is pending.
    pub fn dispatch(&self) {
        let request = {
            let mut st = self.lock();
            match st.pending.take() {
                Some(req) => req,
                None => {
                    st.gate.reset();
                    return;
                }
            }
        };

        let app = self.clone();
        tokio::spawn(async move {
            let outcome = app.generator.generate(&request.prompt).await;
            let ok = outcome.is_ok();
            let text = match outcome {
                Ok(text) => text,
                Err(e) => {
                    error!(service = ?request.service, "generation failed: {e}");
                    messages::generation_failure(&e)
                }
            };

            {
                let mut st = app.lock();
                st.data.results.insert(request.service, Some(text));
                st.busy.remove(&request.service);
                st.gate.complete_dispatch();
                app.persist_data(&st);
            }

            if ok {
                app.emit(AppEvent::NotifyTone);
            }
            app.emit(AppEvent::GenerationFinished {
                service: request.service,
                ok,
            });
        });
    }

    // -----------------------------------------------------------------------
    // Login gate — a client-side toggle, not a security boundary
    // -----------------------------------------------------------------------

    /// False whenever the login screen is disabled, regardless of any stored
    /// authentication flag.
    pub fn login_required(&self) -> bool {
        let st = self.lock();
        st.config.login.enabled && !st.flags.authenticated
    }

    pub fn login(&self, username: &str, password: &str) -> Result<bool> {
        let ok = {
            let st = self.lock();
            st.config.login.username == username && st.config.login.password == password
        };
        if ok {
            let mut st = self.lock();
            st.flags.authenticated = true;
            self.store
                .save_flags(&st.flags)
                .context("failed to persist login flag")?;
        }
        Ok(ok)
    }

    pub fn logout(&self) -> Result<()> {
        let mut st = self.lock();
        st.flags.authenticated = false;
        self.store
            .save_flags(&st.flags)
            .context("failed to persist login flag")
    }

    // -----------------------------------------------------------------------
    // Content management
    // -----------------------------------------------------------------------

    pub fn clear_result(&self, service: ServiceKind) -> Result<()> {
        let mut st = self.lock();
        st.data.results.insert(service, None);
        self.store.save_data(&st.data).context("failed to persist app data")
    }

    /// Append to the saved-results list, most recent first.
    pub fn save_result(
        &self,
        service: ServiceKind,
        prompt: &str,
        result: &str,
    ) -> Result<SavedResult> {
        let saved = SavedResult::new(service, prompt.to_string(), result.to_string());
        let mut st = self.lock();
        st.data.saved_results.insert(0, saved.clone());
        self.store.save_data(&st.data).context("failed to persist app data")?;
        Ok(saved)
    }

    pub fn delete_saved_result(&self, id: &str) -> Result<()> {
        let mut st = self.lock();
        st.data.saved_results.retain(|r| r.id != id);
        self.store.save_data(&st.data).context("failed to persist app data")
    }

    pub fn add_custom_ad(
        &self,
        name: String,
        description: String,
        link: String,
        image: String,
    ) -> Result<CustomAd> {
        let ad = CustomAd::new(name, description, link, image);
        let mut st = self.lock();
        st.data.custom_ads.push(ad.clone());
        self.store.save_data(&st.data).context("failed to persist app data")?;
        Ok(ad)
    }

    pub fn update_custom_ad(&self, ad: CustomAd) -> Result<()> {
        let mut st = self.lock();
        if let Some(slot) = st.data.custom_ads.iter_mut().find(|a| a.id == ad.id) {
            *slot = ad;
        }
        self.store.save_data(&st.data).context("failed to persist app data")
    }

    pub fn delete_custom_ad(&self, id: &str) -> Result<()> {
        let mut st = self.lock();
        st.data.custom_ads.retain(|a| a.id != id);
        self.store.save_data(&st.data).context("failed to persist app data")
    }

    /// Replace the config document wholesale and rewrite it.
    pub fn set_config(&self, config: AppConfig) -> Result<()> {
        let mut st = self.lock();
        st.config = config;
        self.store
            .save_config(&st.config)
            .context("failed to persist app config")
    }

    pub fn export_data(&self) -> Result<String> {
        self.lock().data.to_export_json()
    }

    /// Re-parse an uploaded export wholesale into the live document.
    pub fn import_data(&self, json: &str) -> Result<()> {
        let data = AppData::from_import_json(json)?;
        let mut st = self.lock();
        st.data = data;
        self.store.save_data(&st.data).context("failed to persist app data")
    }

    // -----------------------------------------------------------------------
    // Remote shared document
    // -----------------------------------------------------------------------

    /// Best-effort startup sync. The remote list replaces the local ad list
    /// wholesale; results and saved results stay untouched. Failures keep
    /// local data and are logged, never surfaced.
    pub async fn refresh_shared_content(&self, url: &str) {
        if url.trim().is_empty() {
            info!("public feed URL not configured; using local data only");
            return;
        }
        match sync::fetch_shared(&self.http, url).await {
            Ok(doc) => {
                let mut st = self.lock();
                st.data.custom_ads = doc.custom_ads;
                self.persist_data(&st);
                info!(ads = st.data.custom_ads.len(), "merged shared content");
            }
            Err(e) => {
                warn!("failed to refresh shared content, keeping local data: {e}");
            }
        }
    }

    /// Operator action: replace the local data document with the gist copy.
    pub async fn pull_from_gist(&self, url: &str, token: &str) -> Result<(), SyncError> {
        let doc = self.gists.load(url, token).await?;
        let mut data: AppData =
            serde_json::from_value(doc).map_err(|e| SyncError::Malformed(e.to_string()))?;
        data.normalize();

        let mut st = self.lock();
        st.data = data;
        self.persist_data(&st);
        Ok(())
    }

    /// Operator action: publish the local data document to the gist.
    pub async fn push_to_gist(&self, url: &str, token: &str) -> Result<(), SyncError> {
        let doc = {
            let st = self.lock();
            serde_json::to_value(&st.data).map_err(|e| SyncError::Malformed(e.to_string()))?
        };
        self.gists.save(url, token, &doc).await
    }
}
