//! Application state management for threatdeck.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, fetched data, the session store and route
//! guard, and background task coordination.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{
    CredentialStore, FileSessionStorage, MemorySessionStorage, RouteGuard, SessionStorage,
    SessionStore,
};
use crate::config::Config;
use crate::models::{
    DashboardData, Identity, NewIdentity, ProfileUpdate, Scan, Source, SourceStats, ThreatPage,
    ThreatReport, User,
};
use crate::poller::StatusPoller;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is sufficient for a full refresh (~7 API calls) with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
/// Usernames are email addresses; 64 chars covers nearly all of them.
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for single-line form fields (names, emails).
const MAX_FIELD_LENGTH: usize = 80;

/// Number of items to scroll on page up/down.
/// 10 rows provides a good balance of speed without losing context.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Scan type submitted when starting a scan from the identities tab.
const DEFAULT_SCAN_TYPE: &str = "full";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Identities,
    Scans,
    Threats,
    Sources,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Overview,
        Tab::Identities,
        Tab::Scans,
        Tab::Threats,
        Tab::Sources,
        Tab::Profile,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Identities => "Identities",
            Tab::Scans => "Scans",
            Tab::Threats => "Threats",
            Tab::Sources => "Sources",
            Tab::Profile => "Profile",
        }
    }

    /// Position in the tab bar.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Overview => Tab::Identities,
            Tab::Identities => Tab::Scans,
            Tab::Scans => Tab::Threats,
            Tab::Threats => Tab::Sources,
            Tab::Sources => Tab::Profile,
            Tab::Profile => Tab::Overview,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Overview => Tab::Profile,
            Tab::Identities => Tab::Overview,
            Tab::Scans => Tab::Identities,
            Tab::Threats => Tab::Scans,
            Tab::Sources => Tab::Threats,
            Tab::Profile => Tab::Sources,
        }
    }
}

/// Current UI focus area on the scans tab (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    Registering,
    AddingIdentity,
    EditingName,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Register form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegisterFocus {
    Name,
    Email,
    Password,
    Button,
}

/// Add-identity form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdentityFocus {
    Email,
    Name,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background tasks.
///
/// These variants are sent through an MPSC channel from spawned fetch
/// tasks back to the main application loop.
enum RefreshResult {
    /// Dashboard overview snapshot
    Dashboard(DashboardData),
    /// Logged-in account profile
    Profile(User),
    /// Monitored identity list
    Identities(Vec<Identity>),
    /// Scan history
    Scans(Vec<Scan>),
    /// Aggregate threat report
    ThreatReport(ThreatReport),
    /// Monitored source list
    Sources(Vec<Source>),
    /// Source aggregate stats
    SourceStats(SourceStats),
    /// Findings page for one scan (scan_uuid, page)
    ScanThreats(String, ThreatPage),
    /// A scan was started from the identities tab
    ScanStarted(Scan),
    /// A new identity was saved
    IdentityAdded(Identity),
    /// An identity was removed (id)
    IdentityDeleted(i64),
    /// The profile edit was saved
    ProfileUpdated(User),
    /// The server rejected the token; the session is over
    SessionExpired,
    /// Signal that a full refresh has completed
    RefreshComplete,
    /// An error occurred during a background task
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub store: SessionStore,
    pub guard: RouteGuard,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Register form state
    pub register_name: String,
    pub register_email: String,
    pub register_password: String,
    pub register_focus: RegisterFocus,
    pub register_error: Option<String>,

    // Add-identity form state
    pub identity_email: String,
    pub identity_name: String,
    pub identity_focus: IdentityFocus,
    pub identity_error: Option<String>,

    // Profile name edit buffer
    pub name_input: String,

    // Selection indices
    pub identity_selection: usize,
    pub scan_selection: usize,
    pub threat_selection: usize,
    pub source_selection: usize,

    // Fetched data
    pub dashboard: Option<DashboardData>,
    pub identities: Vec<Identity>,
    pub scans: Vec<Scan>,
    pub threat_report: ThreatReport,
    pub sources: Vec<Source>,
    pub source_stats: SourceStats,

    // Open scan detail: live status poller plus its findings page
    pub scan_poller: Option<StatusPoller>,
    pub scan_threats: Option<ThreatPage>,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,

    // Last completed full refresh, for the status bar
    pub last_refresh: Option<chrono::DateTime<chrono::Utc>>,
}

impl App {
    /// Create a new application instance. Rehydrates the session before
    /// the first frame is ever drawn.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        // Durable session storage; fall back to memory-only when no cache
        // directory is available.
        let storage: Arc<dyn SessionStorage> = match config.cache_dir() {
            Ok(dir) => Arc::new(FileSessionStorage::new(dir)),
            Err(e) => {
                warn!(error = %e, "No cache directory, session will not survive restarts");
                Arc::new(MemorySessionStorage::new())
            }
        };

        let store = SessionStore::open(storage);
        let guard = RouteGuard::new(store.subscribe());

        let mut api = ApiClient::new(&config.api_url())?;
        if let Some(token) = store.token() {
            api.set_token(token);
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Credentials from env vars, config, or the OS keychain
        let login_username = std::env::var("THREATDECK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let mut login_password = std::env::var("THREATDECK_PASSWORD").unwrap_or_default();
        if login_password.is_empty() && !login_username.is_empty() {
            if let Ok(saved) = CredentialStore::get_password(&login_username) {
                login_password = saved;
            }
        }

        Ok(Self {
            config,
            store,
            guard,
            api,

            state: AppState::Normal,
            current_tab: Tab::Overview,
            focus: Focus::List,
            search_query: String::new(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            register_name: String::new(),
            register_email: String::new(),
            register_password: String::new(),
            register_focus: RegisterFocus::Name,
            register_error: None,

            identity_email: String::new(),
            identity_name: String::new(),
            identity_focus: IdentityFocus::Email,
            identity_error: None,

            name_input: String::new(),

            identity_selection: 0,
            scan_selection: 0,
            threat_selection: 0,
            source_selection: 0,

            dashboard: None,
            identities: Vec::new(),
            scans: Vec::new(),
            threat_report: ThreatReport::default(),
            sources: Vec::new(),
            source_stats: SourceStats::default(),

            scan_poller: None,
            scan_threats: None,

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
            last_refresh: None,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Re-apply the guard's decision to the UI. Called every frame after
    /// the first; a redirect lands on the login overlay and drops any
    /// protected state still in flight.
    pub fn apply_guard_decision(&mut self) {
        use crate::auth::GuardDecision;

        match self.guard.decision() {
            GuardDecision::Placeholder => {}
            GuardDecision::Render => {}
            GuardDecision::Redirect => {
                if !matches!(
                    self.state,
                    AppState::LoggingIn
                        | AppState::Registering
                        | AppState::ConfirmingQuit
                        | AppState::Quitting
                ) {
                    self.close_scan_detail();
                    self.start_login();
                }
            }
        }
    }

    /// Attempt login with the credentials from the login form.
    ///
    /// Order matters: the token is stored, then the profile is fetched
    /// and stored, before this returns and the guard reads again. A
    /// profile fetch failure rolls the token back so the session never
    /// rests authenticated without a user.
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        let token = match self.api.login(&username, &password).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(Self::login_error_message(&e));
                return Err(e);
            }
        };

        self.store.set_token(token.clone());
        self.api.set_token(token);

        let user = match self.api.fetch_me().await {
            Ok(user) => user,
            Err(e) => {
                // Roll the token back rather than staying authenticated
                // with no profile.
                error!(error = %e, "Profile fetch failed after login, rolling back");
                self.store.logout();
                self.api.clear_token();
                self.login_error =
                    Some("Signed in, but loading your profile failed. Please try again.".to_string());
                return Err(e);
            }
        };
        self.store.set_user(user);

        if let Err(e) = CredentialStore::store(&username, &password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.login_password.clear();
        self.state = AppState::Normal;
        info!("Login successful");
        Ok(())
    }

    /// Map a login failure onto a message fit for the overlay.
    fn login_error_message(e: &anyhow::Error) -> String {
        match e.downcast_ref::<ApiError>() {
            Some(ApiError::AuthenticationFailed(detail)) => detail.clone(),
            Some(ApiError::NetworkError(_)) => {
                "Unable to connect to server. Check the API URL and your connection.".to_string()
            }
            Some(ApiError::RateLimited) => {
                "Server is busy. Please wait a moment and try again.".to_string()
            }
            _ => format!("Login failed: {}", e),
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Show the registration overlay
    pub fn start_register(&mut self) {
        self.state = AppState::Registering;
        self.register_focus = RegisterFocus::Name;
        self.register_error = None;
    }

    /// Create an account from the register form, then return to login.
    pub async fn attempt_register(&mut self) -> Result<()> {
        let name = self.register_name.clone();
        let email = self.register_email.clone();
        let password = self.register_password.clone();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            self.register_error = Some("All fields are required".to_string());
            return Err(anyhow::anyhow!("All fields are required"));
        }

        self.register_error = None;

        match self.api.register(&name, &email, &password).await {
            Ok(user) => {
                info!(email = %user.email, "Account created");
                self.login_username = user.email;
                self.login_password.clear();
                self.register_password.clear();
                self.status_message = Some("Account created. Sign in to continue.".to_string());
                self.start_login();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                let message = match e.downcast_ref::<ApiError>() {
                    Some(ApiError::AuthenticationFailed(detail)) => detail.clone(),
                    Some(api_err) => api_err.to_string(),
                    None => format!("Registration failed: {}", e),
                };
                self.register_error = Some(message);
                Err(e)
            }
        }
    }

    /// Clear the session. Purely local: no server call, the guard's next
    /// decision redirects to the login overlay.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.close_scan_detail();
        self.store.logout();
        self.api.clear_token();

        self.dashboard = None;
        self.identities.clear();
        self.scans.clear();
        self.threat_report = ThreatReport::default();
        self.sources.clear();
        self.source_stats = SourceStats::default();
        self.last_refresh = None;
        self.status_message = None;
    }

    // =========================================================================
    // Scan detail / status polling
    // =========================================================================

    /// Open the detail pane for the selected scan and start polling its
    /// status. Any previous poller is cancelled before the new one starts.
    pub fn open_scan_detail(&mut self) {
        let scan_uuid = {
            let Some(scan) = self.visible_scans().get(self.scan_selection).copied() else {
                return;
            };
            scan.scan_uuid.clone()
        };

        // Cancel-before-establish: dropping the old poller kills its
        // timer before a new one exists.
        self.scan_poller = None;
        self.scan_threats = None;

        let fetcher: Arc<dyn crate::poller::StatusFetch> = Arc::new(self.api.clone());
        self.scan_poller = Some(StatusPoller::spawn(fetcher, scan_uuid.clone()));
        self.focus = Focus::Detail;

        // Findings load once in the background; the status record is what
        // stays live.
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.fetch_scan_threats(&scan_uuid, 0).await {
                Ok(page) => {
                    Self::send_result(&tx, RefreshResult::ScanThreats(scan_uuid, page)).await;
                }
                Err(e) => {
                    warn!(scan = %scan_uuid, error = %e, "Findings fetch failed");
                }
            }
        });
    }

    /// Close the detail pane. Dropping the poller cancels its timer.
    pub fn close_scan_detail(&mut self) {
        self.scan_poller = None;
        self.scan_threats = None;
        self.focus = Focus::List;
    }

    /// Start a scan against the selected identity.
    pub fn start_scan_for_selected_identity(&mut self) {
        let (identity_id, label) = {
            let Some(identity) = self.visible_identities().get(self.identity_selection).copied()
            else {
                return;
            };
            (identity.id, identity.display_name().to_string())
        };

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.start_scan(DEFAULT_SCAN_TYPE, identity_id).await {
                Ok(scan) => Self::send_result(&tx, RefreshResult::ScanStarted(scan)).await,
                Err(e) => {
                    error!(identity_id, error = %e, "Failed to start scan");
                    Self::send_result(&tx, RefreshResult::Error(format!("Start scan: {}", e)))
                        .await;
                }
            }
        });

        self.status_message =
            Some(format!("Starting {} scan for {}...", DEFAULT_SCAN_TYPE, label));
    }

    // =========================================================================
    // Identity management
    // =========================================================================

    /// Show the add-identity overlay
    pub fn start_add_identity(&mut self) {
        self.state = AppState::AddingIdentity;
        self.identity_email.clear();
        self.identity_name.clear();
        self.identity_focus = IdentityFocus::Email;
        self.identity_error = None;
    }

    /// Save the add-identity form in the background.
    pub fn submit_add_identity(&mut self) {
        if self.identity_email.is_empty() || self.identity_name.is_empty() {
            self.identity_error = Some("Email and name are required".to_string());
            return;
        }

        let body = NewIdentity {
            email: self.identity_email.clone(),
            name: self.identity_name.clone(),
            username: None,
            phone: None,
        };

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.add_identity(&body).await {
                Ok(identity) => {
                    Self::send_result(&tx, RefreshResult::IdentityAdded(identity)).await
                }
                Err(e) => {
                    error!(error = %e, "Failed to add identity");
                    Self::send_result(&tx, RefreshResult::Error(format!("Add identity: {}", e)))
                        .await;
                }
            }
        });

        self.state = AppState::Normal;
        self.status_message = Some("Saving identity...".to_string());
    }

    /// Remove the selected identity (already confirmed by the overlay).
    pub fn delete_selected_identity(&mut self) {
        let id = {
            let Some(identity) = self.visible_identities().get(self.identity_selection).copied()
            else {
                return;
            };
            identity.id
        };

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.delete_identity(id).await {
                Ok(()) => Self::send_result(&tx, RefreshResult::IdentityDeleted(id)).await,
                Err(e) => {
                    error!(id, error = %e, "Failed to delete identity");
                    Self::send_result(&tx, RefreshResult::Error(format!("Delete identity: {}", e)))
                        .await;
                }
            }
        });

        self.status_message = Some("Removing identity...".to_string());
    }

    // =========================================================================
    // Profile editing
    // =========================================================================

    /// Open the display-name editor prefilled with the current name.
    pub fn start_edit_name(&mut self) {
        self.name_input = self.store.user().map(|u| u.name).unwrap_or_default();
        self.state = AppState::EditingName;
    }

    /// Save the edited display name in the background.
    pub fn submit_edit_name(&mut self) {
        let name = self.name_input.trim().to_string();
        if name.is_empty() {
            self.status_message = Some("Name cannot be empty".to_string());
            return;
        }

        let update = ProfileUpdate {
            name: Some(name),
            ..Default::default()
        };

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.update_profile(&update).await {
                Ok(user) => Self::send_result(&tx, RefreshResult::ProfileUpdated(user)).await,
                Err(e) => {
                    error!(error = %e, "Failed to update profile");
                    Self::send_result(&tx, RefreshResult::Error(format!("Update profile: {}", e)))
                        .await;
                }
            }
        });

        self.state = AppState::Normal;
        self.status_message = Some("Saving profile...".to_string());
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all data
    pub fn refresh_all_background(&mut self) {
        if !self.store.is_authenticated() {
            warn!("No session, skipping refresh");
            return;
        }

        info!("Starting background refresh of all data");
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Execute the background refresh task.
    ///
    /// Runs in a spawned Tokio task and fetches every tab's data in
    /// parallel; results stream back through the MPSC channel as
    /// `RefreshResult` variants. A 401 anywhere downgrades to a single
    /// `SessionExpired` so the main loop can log the session out.
    async fn execute_background_refresh(tx: mpsc::Sender<RefreshResult>, api: ApiClient) {
        info!("Background refresh task started");

        // Clones share the connection pool, so parallel fetches are cheap.
        let (
            dashboard_res,
            profile_res,
            identities_res,
            scans_res,
            report_res,
            sources_res,
            stats_res,
        ) = tokio::join!(
            api.fetch_dashboard(),
            api.fetch_me(),
            api.fetch_identities(),
            api.fetch_scans(),
            api.fetch_threat_report(),
            api.fetch_sources(),
            api.fetch_source_stats(),
        );

        Self::send_fetch_result(&tx, "Dashboard", dashboard_res, RefreshResult::Dashboard).await;
        Self::send_fetch_result(&tx, "Profile", profile_res, RefreshResult::Profile).await;
        Self::send_fetch_result(&tx, "Identities", identities_res, RefreshResult::Identities)
            .await;
        Self::send_fetch_result(&tx, "Scans", scans_res, RefreshResult::Scans).await;
        Self::send_fetch_result(&tx, "Threat report", report_res, RefreshResult::ThreatReport)
            .await;
        Self::send_fetch_result(&tx, "Sources", sources_res, RefreshResult::Sources).await;
        Self::send_fetch_result(&tx, "Source stats", stats_res, RefreshResult::SourceStats).await;

        info!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    /// Helper to send a successful fetch result, an expiry signal, or an
    /// error message.
    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<RefreshResult>,
        name: &str,
        result: Result<T>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> RefreshResult,
    {
        match result {
            Ok(data) => {
                Self::send_result(tx, wrapper(data)).await;
            }
            Err(e) => {
                if matches!(e.downcast_ref::<ApiError>(), Some(err) if err.is_unauthorized()) {
                    warn!("{} fetch rejected: token expired", name);
                    Self::send_result(tx, RefreshResult::SessionExpired).await;
                } else {
                    error!(error = %e, "{} fetch failed", name);
                    Self::send_result(tx, RefreshResult::Error(format!("{}: {}", name, e))).await;
                }
            }
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        // Now process all results
        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single result from a background task.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Dashboard(data) => {
                self.dashboard = Some(data);
            }
            RefreshResult::Profile(user) => {
                self.store.set_user(user);
            }
            RefreshResult::Identities(data) => {
                self.identities = data;
                self.clamp_selections();
            }
            RefreshResult::Scans(data) => {
                self.scans = data;
                self.clamp_selections();
            }
            RefreshResult::ThreatReport(report) => {
                self.threat_report = report;
                self.clamp_selections();
            }
            RefreshResult::Sources(data) => {
                self.sources = data;
                self.clamp_selections();
            }
            RefreshResult::SourceStats(stats) => {
                self.source_stats = stats;
            }
            RefreshResult::ScanThreats(scan_uuid, page) => {
                // The detail pane may have moved to another scan already.
                let still_open = self
                    .scan_poller
                    .as_ref()
                    .is_some_and(|p| p.scan_uuid() == scan_uuid);
                if still_open {
                    self.scan_threats = Some(page);
                }
            }
            RefreshResult::ScanStarted(scan) => {
                self.status_message = Some(format!("Scan {} started", scan.scan_uuid));
                self.scans.insert(0, scan);
            }
            RefreshResult::IdentityAdded(identity) => {
                self.status_message = Some(format!("Now monitoring {}", identity.email));
                self.identities.push(identity);
            }
            RefreshResult::IdentityDeleted(id) => {
                self.identities.retain(|i| i.id != id);
                self.clamp_selections();
                self.status_message = Some("Identity removed".to_string());
            }
            RefreshResult::ProfileUpdated(user) => {
                self.status_message = Some("Profile saved".to_string());
                self.store.set_user(user);
            }
            RefreshResult::SessionExpired => {
                warn!("Session expired, logging out");
                self.logout();
                self.status_message = Some("Session expired. Please log in again.".to_string());
            }
            RefreshResult::RefreshComplete => {
                self.last_refresh = Some(chrono::Utc::now());
                // Only clear status if it's a progress message, preserve errors
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error:") {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                // Simplify common error messages for the user
                let user_message = if msg.to_lowercase().contains("rate limit") {
                    "Server is busy. Please wait a moment and try again.".to_string()
                } else if msg.to_lowercase().contains("network")
                    || msg.to_lowercase().contains("connect")
                {
                    "Network error. Check your connection.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.status_message = Some(user_message);
            }
        }
    }

    // =========================================================================
    // List filtering and selection
    // =========================================================================

    /// Identities matching the current search query.
    pub fn visible_identities(&self) -> Vec<&Identity> {
        if self.search_query.is_empty() || self.current_tab != Tab::Identities {
            return self.identities.iter().collect();
        }
        let query = self.search_query.to_lowercase();
        self.identities
            .iter()
            .filter(|i| {
                i.email.to_lowercase().contains(&query)
                    || i.name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Scans matching the current search query (by uuid or type).
    pub fn visible_scans(&self) -> Vec<&Scan> {
        if self.search_query.is_empty() || self.current_tab != Tab::Scans {
            return self.scans.iter().collect();
        }
        let query = self.search_query.to_lowercase();
        self.scans
            .iter()
            .filter(|s| {
                s.scan_uuid.to_lowercase().contains(&query)
                    || s.scan_type
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Sources matching the current search query (by domain or category).
    pub fn visible_sources(&self) -> Vec<&Source> {
        if self.search_query.is_empty() || self.current_tab != Tab::Sources {
            return self.sources.iter().collect();
        }
        let query = self.search_query.to_lowercase();
        self.sources
            .iter()
            .filter(|s| {
                s.display_domain().to_lowercase().contains(&query)
                    || s.category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&query))
            })
            .collect()
    }

    fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Overview | Tab::Profile => 0,
            Tab::Identities => self.visible_identities().len(),
            Tab::Scans => self.visible_scans().len(),
            Tab::Threats => self.threat_report.recent_findings.len(),
            Tab::Sources => self.visible_sources().len(),
        }
    }

    fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Overview | Tab::Profile => None,
            Tab::Identities => Some(&mut self.identity_selection),
            Tab::Scans => Some(&mut self.scan_selection),
            Tab::Threats => Some(&mut self.threat_selection),
            Tab::Sources => Some(&mut self.source_selection),
        }
    }

    /// Move the current tab's selection down by `amount`, clamped.
    pub fn select_next(&mut self, amount: usize) {
        let len = self.current_list_len();
        if let Some(selection) = self.current_selection_mut() {
            if len > 0 {
                *selection = (*selection + amount).min(len - 1);
            }
        }
    }

    /// Move the current tab's selection up by `amount`.
    pub fn select_prev(&mut self, amount: usize) {
        if let Some(selection) = self.current_selection_mut() {
            *selection = selection.saturating_sub(amount);
        }
    }

    /// Jump to the top of the current tab's list.
    pub fn select_first(&mut self) {
        if let Some(selection) = self.current_selection_mut() {
            *selection = 0;
        }
    }

    /// Jump to the bottom of the current tab's list.
    pub fn select_last(&mut self) {
        let len = self.current_list_len();
        if let Some(selection) = self.current_selection_mut() {
            *selection = len.saturating_sub(1);
        }
    }

    /// Keep selections inside their lists after data changes.
    fn clamp_selections(&mut self) {
        let identities = self.identities.len();
        let scans = self.scans.len();
        let threats = self.threat_report.recent_findings.len();
        let sources = self.sources.len();
        Self::clamp(&mut self.identity_selection, identities);
        Self::clamp(&mut self.scan_selection, scans);
        Self::clamp(&mut self.threat_selection, threats);
        Self::clamp(&mut self.source_selection, sources);
    }

    fn clamp(selection: &mut usize, len: usize) {
        if len == 0 {
            *selection = 0;
        } else if *selection >= len {
            *selection = len - 1;
        }
    }

}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if an input character is valid for text entry
fn is_valid_input_char(c: char) -> bool {
    // Allow printable ASCII and common extended chars, reject control chars
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a form field character should be accepted
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Overview.next(), Tab::Identities);
        assert_eq!(Tab::Identities.next(), Tab::Scans);
        assert_eq!(Tab::Scans.next(), Tab::Threats);
        assert_eq!(Tab::Threats.next(), Tab::Sources);
        assert_eq!(Tab::Sources.next(), Tab::Profile);
        assert_eq!(Tab::Profile.next(), Tab::Overview); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Overview.prev(), Tab::Profile); // Wraps around
        assert_eq!(Tab::Profile.prev(), Tab::Sources);
        assert_eq!(Tab::Sources.prev(), Tab::Threats);
        assert_eq!(Tab::Threats.prev(), Tab::Scans);
        assert_eq!(Tab::Scans.prev(), Tab::Identities);
        assert_eq!(Tab::Identities.prev(), Tab::Overview);
    }

    #[test]
    fn test_tab_index_matches_order() {
        for (i, tab) in Tab::ALL.iter().enumerate() {
            assert_eq!(tab.index(), i);
        }
    }

    // -------------------------------------------------------------------------
    // Selection Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_clamp() {
        let mut selection = 5;
        App::clamp(&mut selection, 3);
        assert_eq!(selection, 2);

        App::clamp(&mut selection, 0);
        assert_eq!(selection, 0);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        // Valid chars within length
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(63, 'z'));
        // Exceeds max length
        assert!(!can_add_username_char(64, 'a'));
        assert!(!can_add_username_char(100, 'a'));
        // Control characters rejected
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        // Valid chars within length
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        // Exceeds max length
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(200, 'a'));
        // Control characters rejected
        assert!(!can_add_password_char(0, '\x00'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
