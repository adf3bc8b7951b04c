//! Application state management for Rollcall.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, fetched record lists, session management, and background
//! refresh coordination.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::{CredentialStore, Session};
use crate::cache::{CacheAges, CacheManager};
use crate::config::Config;
use crate::models::{AttendanceRecord, RecordFilter};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces a handful of messages; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Number of most-recent archived days to prefetch after a full refresh.
const PREFETCH_DAYS: usize = 7;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Today,
    History,
    Chart,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::History => "History",
            Tab::Chart => "Chart",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Today => Tab::History,
            Tab::History => Tab::Chart,
            Tab::Chart => Tab::Today,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Today => Tab::Chart,
            Tab::History => Tab::Today,
            Tab::Chart => Tab::History,
        }
    }
}

/// Current UI focus area (left list panel or right detail panel)
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
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks.
///
/// These variants are sent through an MPSC channel from the spawned refresh
/// task back to the main application.
enum RefreshResult {
    /// Today's attendance records fetched successfully
    Records(Vec<AttendanceRecord>),
    /// List of archived dates fetched successfully
    ArchivedDates(Vec<String>),
    /// Records for a single archived day (date, records)
    DayRecords(String, Vec<AttendanceRecord>),
    /// Signal that all refresh tasks have completed
    RefreshComplete,
    /// An error occurred during refresh
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub cache: CacheManager,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub filter: RecordFilter,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Selection indices
    pub record_selection: usize,
    pub date_selection: usize,
    pub day_record_selection: usize,

    // Fetched data
    pub records: Vec<AttendanceRecord>,
    pub archived_dates: Vec<String>,
    /// Archived day records already fetched this run, keyed by date
    pub day_records: HashMap<String, Vec<AttendanceRecord>>,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,

    // Cache ages for status bar
    pub cache_ages: CacheAges,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        // Load session from disk if it exists
        let mut session = Session::new(cache_dir.clone());
        let load_result = session.load();
        debug!(?load_result, has_data = session.data.is_some(), "Session loaded");

        let mut api = ApiClient::new(config.base_url())?;

        // If we have a valid session, set the token on the API client
        if let Some(ref data) = session.data {
            if !data.is_expired() {
                api.set_token(data.token.clone());
                debug!("Token set on API client");
            }
        }

        let cache = CacheManager::new(cache_dir)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill login form from env vars or config
        let login_email = std::env::var("ROLLCALL_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("ROLLCALL_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            cache,

            state: AppState::Normal,
            current_tab: Tab::Today,
            focus: Focus::List,
            filter: RecordFilter::default(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            record_selection: 0,
            date_selection: 0,
            day_record_selection: 0,

            records: Vec::new(),
            archived_dates: Vec::new(),
            day_records: HashMap::new(),

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
            cache_ages: CacheAges::default(),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if the user has a valid (non-expired) session
    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;

        // Fall back to the keychain when no password came from the env
        if self.login_password.is_empty() && !self.login_email.is_empty() {
            if let Ok(password) = CredentialStore::get_password(&self.login_email) {
                self.login_password = password;
            }
        }
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.clone();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.authenticate(&email, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                if let Some(ref data) = self.session.data {
                    self.api.set_token(data.token.clone());
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                // Provide user-friendly error messages based on error type
                let text = e.to_string().to_lowercase();
                let user_message = if text.contains("401") || text.contains("unauthorized") {
                    "Invalid email or password".to_string()
                } else if text.contains("network") || text.contains("connect") {
                    "Unable to connect to server. Check your internet connection.".to_string()
                } else if text.contains("timeout") {
                    "Connection timed out. Please try again.".to_string()
                } else {
                    format!("Login failed: {}", e)
                };
                self.login_error = Some(user_message);
                Err(e)
            }
        }
    }

    /// Sign out: clear the session and return to the login overlay
    pub fn sign_out(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.login_password.clear();
        self.start_login();
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load all data from cache
    pub fn load_from_cache(&mut self) -> Result<()> {
        if let Ok(Some(cached)) = self.cache.load_records() {
            self.records = cached.data;
        }

        if let Ok(Some(cached)) = self.cache.load_archived_dates() {
            self.archived_dates = cached.data;
        }

        for date in &self.archived_dates {
            if let Ok(Some(cached)) = self.cache.load_day(date) {
                self.day_records.insert(date.clone(), cached.data);
            }
        }

        self.cache_ages = self.cache.get_cache_ages();
        Ok(())
    }

    /// Check if today's cached records are stale
    pub fn is_cache_stale(&self) -> bool {
        self.cache.records_stale()
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh today's records and the archive list
    pub fn refresh_all_background(&mut self) {
        if !self.is_authenticated() {
            warn!("Refresh requested without a valid session");
            return;
        }

        info!("Starting background refresh");
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let (records_res, dates_res) =
                tokio::join!(api.fetch_records(), api.fetch_archived_dates());

            match records_res {
                Ok(records) => {
                    debug!(count = records.len(), "Records fetched");
                    Self::send_result(&tx, RefreshResult::Records(records)).await;
                }
                Err(e) => {
                    error!(error = %e, "Records fetch failed");
                    Self::send_result(&tx, RefreshResult::Error(format!("Records: {}", e))).await;
                }
            }

            match dates_res {
                Ok(dates) => {
                    debug!(count = dates.len(), "Archived dates fetched");
                    let recent: Vec<String> =
                        dates.iter().take(PREFETCH_DAYS).cloned().collect();
                    Self::send_result(&tx, RefreshResult::ArchivedDates(dates)).await;

                    // Warm the most recent days so History opens instantly
                    let day_futures: Vec<_> = recent
                        .iter()
                        .map(|date| api.fetch_records_for_date(date))
                        .collect();
                    let results = futures::future::join_all(day_futures).await;
                    for (date, result) in recent.into_iter().zip(results) {
                        match result {
                            Ok(records) => {
                                Self::send_result(&tx, RefreshResult::DayRecords(date, records))
                                    .await;
                            }
                            Err(e) => {
                                debug!(error = %e, date = %date, "Day prefetch failed");
                            }
                        }
                    }
                }
                Err(e) => {
                    // The archive list is secondary; keep whatever we had
                    debug!(error = %e, "Archived dates fetch failed");
                }
            }

            Self::send_result(&tx, RefreshResult::RefreshComplete).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Fetch a single archived day in the background, unless already loaded
    pub fn fetch_day_background(&mut self, date: &str) {
        if self.day_records.contains_key(date) {
            return;
        }
        if !self.is_authenticated() {
            return;
        }

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        let date = date.to_string();

        let date_for_task = date.clone();
        tokio::spawn(async move {
            let date = date_for_task;
            match api.fetch_records_for_date(&date).await {
                Ok(records) => {
                    debug!(date = %date, count = records.len(), "Day records fetched");
                    Self::send_result(&tx, RefreshResult::DayRecords(date, records)).await;
                }
                Err(e) => {
                    error!(error = %e, date = %date, "Day fetch failed");
                    Self::send_result(&tx, RefreshResult::Error(format!("{}: {}", date, e)))
                        .await;
                }
            }
        });

        self.status_message = Some(format!("Loading {}...", date));
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
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

        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single refresh result from the background task.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Records(data) => {
                if let Err(e) = self.cache.save_records(&data) {
                    warn!(error = %e, "Failed to cache records");
                }
                self.records = data;
                self.clamp_selections();
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::ArchivedDates(data) => {
                if let Err(e) = self.cache.save_archived_dates(&data) {
                    warn!(error = %e, "Failed to cache archived dates");
                }
                self.archived_dates = data;
                self.clamp_selections();
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::DayRecords(date, data) => {
                if let Err(e) = self.cache.save_day(&date, &data) {
                    warn!(error = %e, "Failed to cache day records");
                }
                self.day_records.insert(date, data);
                self.day_record_selection = 0;
            }
            RefreshResult::RefreshComplete => {
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
                let lower = msg.to_lowercase();
                let user_message = if lower.contains("rate limit") {
                    "Server is busy. Please wait a moment and try again.".to_string()
                } else if lower.contains("unauthorized") || lower.contains("401") {
                    "Session expired. Please log in again.".to_string()
                } else if lower.contains("network") || lower.contains("connect") {
                    "Network error. Check your connection.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.status_message = Some(user_message);
            }
        }
    }

    // =========================================================================
    // Filtered Views
    // =========================================================================

    /// Today's records, narrowed by the active filter, input order preserved
    pub fn filtered_records(&self) -> Vec<&AttendanceRecord> {
        self.filter.apply(&self.records)
    }

    /// The archived date currently selected on the History tab
    pub fn selected_date(&self) -> Option<&String> {
        self.archived_dates.get(self.date_selection)
    }

    /// The selected archived day's records, narrowed by the active filter
    pub fn filtered_day_records(&self) -> Vec<&AttendanceRecord> {
        match self.selected_date().and_then(|d| self.day_records.get(d)) {
            Some(records) => self.filter.apply(records),
            None => Vec::new(),
        }
    }

    /// The record list feeding the current tab's view
    pub fn visible_records(&self) -> Vec<&AttendanceRecord> {
        match self.current_tab {
            Tab::History => self.filtered_day_records(),
            Tab::Today | Tab::Chart => self.filtered_records(),
        }
    }

    /// Keep selection indices inside the (possibly shrunken) lists
    fn clamp_selections(&mut self) {
        let visible = self.filtered_records().len();
        if self.record_selection >= visible {
            self.record_selection = visible.saturating_sub(1);
        }
        if self.date_selection >= self.archived_dates.len() {
            self.date_selection = self.archived_dates.len().saturating_sub(1);
        }
    }

    /// Reset selections after a filter change
    pub fn on_filter_changed(&mut self) {
        self.record_selection = 0;
        self.day_record_selection = 0;
    }

    // =========================================================================
    // CSV Export
    // =========================================================================

    /// Export the current tab's filtered records to a CSV file in the
    /// working directory. Returns the file name on success.
    pub fn export_csv(&self) -> Result<String> {
        use crate::summary::normalize_minutes;
        use crate::utils::csv_field;

        let records = self.visible_records();
        let filename = format!(
            "rollcall-export-{}.csv",
            Local::now().format("%Y%m%d-%H%M%S")
        );

        let mut out = String::from(
            "student_name,status,parent_notified,checkin_time,checkout_time,minutes,date\n",
        );
        for record in &records {
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                csv_field(&record.student_name),
                csv_field(&record.status),
                record.parent_notified,
                csv_field(record.checkin_time.as_deref().unwrap_or("")),
                csv_field(record.checkout_time.as_deref().unwrap_or("")),
                normalize_minutes(record.time_spent.as_ref()),
                csv_field(record.date.as_deref().unwrap_or("")),
            ));
        }

        std::fs::write(&filename, out)?;
        info!(file = %filename, rows = records.len(), "Exported CSV");
        Ok(filename)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Today.next(), Tab::History);
        assert_eq!(Tab::History.next(), Tab::Chart);
        assert_eq!(Tab::Chart.next(), Tab::Today); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Today.prev(), Tab::Chart); // Wraps around
        assert_eq!(Tab::History.prev(), Tab::Today);
        assert_eq!(Tab::Chart.prev(), Tab::History);
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(63, '@'));
        // Exceeds max length
        assert!(!can_add_email_char(64, 'a'));
        // Control characters rejected
        assert!(!can_add_email_char(0, '\x00'));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
