//! Application state management for the passkeep TUI.
//!
//! This module contains the `App` struct that owns all client-side state:
//! the current view, form contents, the in-memory credential collection,
//! and the channel carrying results of spawned vault calls back into the
//! render loop.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use passkeep_core::{
    CredentialCollection, CredentialEntry, CredentialStore, CredentialUpdate, FailureClass,
    SessionData, SessionStore, VaultClient, VaultError,
};

use crate::config::Config;
use crate::route::{self, Notice, View};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the vault event channel.
/// A handful of calls can be in flight at once; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input
const MAX_EMAIL_LENGTH: usize = 64;

/// Maximum length for username input, mirroring the server constraint
const MAX_USERNAME_LENGTH: usize = 32;

/// Maximum length for password input, mirroring the server constraint
const MAX_PASSWORD_LENGTH: usize = 64;

/// Maximum length for a credential entry name, mirroring the server constraint
const MAX_ENTRY_NAME_LENGTH: usize = 64;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state (overlays layered over the current view)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    CreatingEntry,
    ConfirmingDelete,
    Quitting,
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFocus {
    Email,
    Password,
    Button,
    Link,
}

/// Sign-up form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpFocus {
    Email,
    Username,
    Password,
    Button,
    Link,
}

/// Focus within the create-entry overlay and the per-entry edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFocus {
    Name,
    Password,
    Button,
}

/// Mutating call in flight for one entry.
/// At most one per entry id; the triggering controls stay disabled until
/// the result event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Saving,
    Deleting,
}

/// In-progress edit of one entry.
///
/// The draft name and password live here, separate from the committed
/// values in the collection; they are merged into the collection only when
/// the server confirms the save.
#[derive(Debug, Clone)]
pub struct EditDraft {
    pub id: String,
    pub name: String,
    pub password: String,
    pub focus: FieldFocus,
}

// ============================================================================
// Vault Call Results
// ============================================================================

/// Result of a spawned vault call.
///
/// Each spawned task sends exactly one of these through the event channel;
/// the render loop drains the channel between frames.
enum VaultEvent {
    SignedUp { email: String },
    SignUpFailed(VaultError),
    SignedIn(SessionData),
    SignInFailed(VaultError),
    /// Entry list for the dashboard activation identified by `epoch`
    Listed {
        epoch: u64,
        entries: Vec<CredentialEntry>,
    },
    ListFailed {
        epoch: u64,
        error: VaultError,
    },
    Created(CredentialEntry),
    CreateFailed(VaultError),
    Updated {
        id: String,
        update: CredentialUpdate,
    },
    UpdateFailed {
        id: String,
        error: VaultError,
    },
    Deleted {
        id: String,
    },
    DeleteFailed {
        id: String,
        error: VaultError,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub client: VaultClient,

    // Navigation
    pub view: View,
    pub state: AppState,
    pub notice: Option<Notice>,

    // Sign-in form state
    pub signin_email: String,
    pub signin_password: String,
    pub signin_focus: SignInFocus,
    pub signin_busy: bool,
    pub signin_messages: Vec<String>,
    /// True while the password field holds a value auto-filled from the
    /// keychain; a validation rejection then drops the keychain entry
    signin_password_from_keychain: bool,

    // Sign-up form state
    pub signup_email: String,
    pub signup_username: String,
    pub signup_password: String,
    pub signup_focus: SignUpFocus,
    pub signup_busy: bool,
    pub signup_messages: Vec<String>,

    // Dashboard state
    pub collection: CredentialCollection,
    pub selection: usize,
    pub loading: bool,
    pub edit: Option<EditDraft>,
    pub pending: HashMap<String, PendingOp>,
    pub entry_messages: HashMap<String, Vec<String>>,
    pub dash_messages: Vec<String>,
    pub revealed: HashSet<String>,
    pub last_sync: Option<DateTime<Local>>,
    /// Signed-in username for the status bar, cached at sign-in so the
    /// render loop never re-reads the sealed session file
    pub username: Option<String>,
    /// Bumped on every dashboard activation; list results carrying an older
    /// epoch are dropped
    dashboard_epoch: u64,

    // Create-entry overlay state
    pub create_name: String,
    pub create_password: String,
    pub create_focus: FieldFocus,
    pub create_busy: bool,
    pub create_messages: Vec<String>,

    // Delete confirmation target
    pub delete_target: Option<String>,

    // Vault event channel
    events_rx: Option<mpsc::Receiver<VaultEvent>>,
    events_tx: mpsc::Sender<VaultEvent>,

    // Session change subscription
    session_rx: watch::Receiver<Option<SessionData>>,
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

        let data_dir = Config::data_dir()?;
        let session = SessionStore::open(&data_dir)?;
        let client = VaultClient::new(config.endpoint(), session.clone())?;
        let mut session_rx = session.subscribe();
        // The seeded value is not a change
        let _ = session_rx.borrow_and_update();

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Pre-fill the sign-in form from env vars, config and keychain
        let signin_email = std::env::var("PASSKEEP_EMAIL")
            .ok()
            .filter(|e| !e.is_empty())
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        let mut signin_password_from_keychain = false;
        let signin_password = match std::env::var("PASSKEEP_PASSWORD") {
            Ok(p) if !p.is_empty() => p,
            _ => {
                if !signin_email.is_empty() {
                    match CredentialStore::get_password(&signin_email) {
                        Ok(p) => {
                            signin_password_from_keychain = true;
                            p
                        }
                        Err(_) => String::new(),
                    }
                } else {
                    String::new()
                }
            }
        };

        // One startup read restores a prior sign-in and its identity
        let restored = session.restore();
        let signed_in = restored.is_some();
        let view = route::resolve(View::Dashboard, signed_in);
        debug!(signed_in, ?view, "Initial view resolved");

        Ok(Self {
            config,
            session,
            client,

            view,
            state: AppState::Normal,
            notice: None,

            signin_focus: if signin_email.is_empty() {
                SignInFocus::Email
            } else {
                SignInFocus::Password
            },
            signin_email,
            signin_password,
            signin_busy: false,
            signin_messages: Vec::new(),
            signin_password_from_keychain,

            signup_email: String::new(),
            signup_username: String::new(),
            signup_password: String::new(),
            signup_focus: SignUpFocus::Email,
            signup_busy: false,
            signup_messages: Vec::new(),

            collection: CredentialCollection::new(),
            selection: 0,
            loading: false,
            edit: None,
            pending: HashMap::new(),
            entry_messages: HashMap::new(),
            dash_messages: Vec::new(),
            revealed: HashSet::new(),
            last_sync: None,
            username: restored.map(|d| d.username),
            dashboard_epoch: 0,

            create_name: String::new(),
            create_password: String::new(),
            create_focus: FieldFocus::Name,
            create_busy: false,
            create_messages: Vec::new(),

            delete_target: None,

            events_rx: Some(rx),
            events_tx: tx,

            session_rx,
        })
    }

    /// Helper to send vault events, logging any channel errors
    async fn send_event(tx: &mpsc::Sender<VaultEvent>, event: VaultEvent) {
        if let Err(e) = tx.send(event).await {
            error!(error = %e, "Failed to deliver vault event - channel closed");
        }
    }

    /// Acknowledge a session change this app routed itself, so the watch
    /// subscription only fires for changes from outside the event flow
    fn ack_session_change(&mut self) {
        let _ = self.session_rx.borrow_and_update();
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Issue the sign-in call with the form contents
    pub fn attempt_sign_in(&mut self) {
        if self.signin_busy {
            return;
        }

        let email = self.signin_email.trim().to_string();
        let password = self.signin_password.clone();
        if email.is_empty() || password.is_empty() {
            self.signin_messages
                .push("Email and password are required".to_string());
            return;
        }

        self.signin_busy = true;
        self.notice = None;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.sign_in(&email, &password).await {
                Ok(data) => Self::send_event(&tx, VaultEvent::SignedIn(data)).await,
                Err(e) => Self::send_event(&tx, VaultEvent::SignInFailed(e)).await,
            }
        });
    }

    fn on_signed_in(&mut self, data: SessionData) {
        self.signin_busy = false;

        if let Err(e) = self.session.establish(&data) {
            error!(error = %e, "Failed to persist session");
            self.signin_messages
                .push("Could not save the session to disk".to_string());
            return;
        }
        self.ack_session_change();

        let email = self.signin_email.trim().to_string();
        if let Err(e) = CredentialStore::store(&email, &self.signin_password) {
            warn!(error = %e, "Failed to store password in keychain");
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.signin_password.clear();
        self.signin_password_from_keychain = false;
        self.signin_messages.clear();
        self.notice = None;
        self.username = Some(data.username.clone());

        info!(user = %data.username, "Signed in");
        self.view = route::resolve(View::Dashboard, true);
        self.activate_dashboard();
    }

    fn on_sign_in_failed(&mut self, error: VaultError) {
        self.signin_busy = false;
        warn!(error = %error, "Sign-in failed");

        match error.classify() {
            FailureClass::Validation(messages) => {
                if self.signin_password_from_keychain {
                    // The remembered password was rejected, forget it
                    let email = self.signin_email.trim().to_string();
                    if let Err(e) = CredentialStore::delete(&email) {
                        warn!(error = %e, "Failed to drop keychain entry");
                    }
                    self.signin_password_from_keychain = false;
                }
                self.signin_messages.extend(messages);
            }
            FailureClass::SessionExpired => self.force_sign_out(),
        }
    }

    // =========================================================================
    // Sign-up
    // =========================================================================

    /// Issue the sign-up call with the form contents
    pub fn attempt_sign_up(&mut self) {
        if self.signup_busy {
            return;
        }

        let email = self.signup_email.trim().to_string();
        let username = self.signup_username.trim().to_string();
        let password = self.signup_password.clone();
        if email.is_empty() || username.is_empty() || password.is_empty() {
            self.signup_messages
                .push("Email, username and password are required".to_string());
            return;
        }

        self.signup_busy = true;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.sign_up(&email, &username, &password).await {
                Ok(email) => Self::send_event(&tx, VaultEvent::SignedUp { email }).await,
                Err(e) => Self::send_event(&tx, VaultEvent::SignUpFailed(e)).await,
            }
        });
    }

    fn on_signed_up(&mut self, email: String) {
        self.signup_busy = false;
        self.signup_email.clear();
        self.signup_username.clear();
        self.signup_password.clear();
        self.signup_messages.clear();

        info!("Account registered");

        // Carry the registered email forward into the sign-in form
        self.signin_email = email.clone();
        self.signin_password.clear();
        self.signin_password_from_keychain = false;
        self.signin_focus = SignInFocus::Password;
        self.view = route::resolve(View::SignIn, self.session.is_signed_in());
        self.notice = Some(Notice::Registered { email });
    }

    fn on_sign_up_failed(&mut self, error: VaultError) {
        self.signup_busy = false;
        warn!(error = %error, "Sign-up failed");

        match error.classify() {
            FailureClass::Validation(messages) => self.signup_messages.extend(messages),
            FailureClass::SessionExpired => self.force_sign_out(),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch to the sign-up view. Drops any pending notice.
    pub fn show_sign_up(&mut self) {
        self.view = route::resolve(View::SignUp, self.session.is_signed_in());
        self.notice = None;
        self.signup_focus = SignUpFocus::Email;
    }

    /// Switch to the sign-in view. Drops any pending notice.
    pub fn show_sign_in(&mut self) {
        self.view = route::resolve(View::SignIn, self.session.is_signed_in());
        self.notice = None;
    }

    /// Clear the session and force the sign-in view.
    ///
    /// `notice` rides along for the sign-in banner; user-initiated sign-out
    /// passes `None`, a session-expiry classification passes
    /// `Notice::SessionExpired`.
    pub fn sign_out(&mut self, notice: Option<Notice>) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.ack_session_change();

        // The collection and all per-entry state are discarded wholesale
        self.collection = CredentialCollection::new();
        self.selection = 0;
        self.loading = false;
        self.edit = None;
        self.pending.clear();
        self.entry_messages.clear();
        self.dash_messages.clear();
        self.revealed.clear();
        self.last_sync = None;
        self.username = None;
        self.delete_target = None;

        self.signin_busy = false;
        self.signup_busy = false;
        self.create_busy = false;
        self.create_name.clear();
        self.create_password.clear();
        self.create_messages.clear();

        if self.state != AppState::Quitting {
            self.state = AppState::Normal;
        }

        self.view = route::resolve(View::SignIn, false);
        self.notice = notice;
        self.signin_focus = if self.signin_email.is_empty() {
            SignInFocus::Email
        } else {
            SignInFocus::Password
        };
    }

    /// The forced sign-out sequence for a session-expiry classification
    fn force_sign_out(&mut self) {
        info!("Session no longer valid, forcing sign-out");
        self.sign_out(Some(Notice::SessionExpired));
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Activate the dashboard: discard the current collection and populate
    /// it with one `list_credentials` call.
    ///
    /// Manual reload goes through here too; the epoch bump makes any list
    /// result still in flight from a prior activation a no-op.
    pub fn activate_dashboard(&mut self) {
        let data = match self.session.restore() {
            Some(data) => data,
            None => {
                self.force_sign_out();
                return;
            }
        };

        self.dashboard_epoch += 1;
        self.loading = true;
        self.collection = CredentialCollection::new();
        self.selection = 0;
        self.edit = None;
        self.pending.clear();
        self.entry_messages.clear();
        self.revealed.clear();

        let epoch = self.dashboard_epoch;
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.list_credentials(&data.user_id).await {
                Ok(entries) => {
                    Self::send_event(&tx, VaultEvent::Listed { epoch, entries }).await
                }
                Err(e) => {
                    Self::send_event(&tx, VaultEvent::ListFailed { epoch, error: e }).await
                }
            }
        });
    }

    /// Open the create-entry overlay
    pub fn open_create(&mut self) {
        self.state = AppState::CreatingEntry;
        self.create_name.clear();
        self.create_password.clear();
        self.create_focus = FieldFocus::Name;
        self.create_messages.clear();
    }

    /// Issue the create call with the overlay contents
    pub fn attempt_create(&mut self) {
        if self.create_busy {
            return;
        }

        let name = self.create_name.trim().to_string();
        let password = self.create_password.clone();
        if name.is_empty() || password.is_empty() {
            self.create_messages
                .push("Name and password are required".to_string());
            return;
        }

        let data = match self.session.restore() {
            Some(data) => data,
            None => {
                self.force_sign_out();
                return;
            }
        };

        self.create_busy = true;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.create_credential(&data.user_id, &name, &password).await {
                Ok(entry) => Self::send_event(&tx, VaultEvent::Created(entry)).await,
                Err(e) => Self::send_event(&tx, VaultEvent::CreateFailed(e)).await,
            }
        });
    }

    /// Begin editing the selected entry, staging its committed values as
    /// the draft
    pub fn start_edit(&mut self) {
        let entry = match self.selected_entry() {
            Some(entry) => entry.clone(),
            None => return,
        };
        if self.pending.contains_key(&entry.id) {
            return;
        }

        self.edit = Some(EditDraft {
            id: entry.id,
            name: entry.name,
            password: entry.password,
            focus: FieldFocus::Name,
        });
    }

    /// Abandon the in-progress edit. The committed entry is untouched.
    pub fn cancel_edit(&mut self) {
        if let Some(ref draft) = self.edit {
            // A save already in flight keeps its draft until the result lands
            if self.pending.contains_key(&draft.id) {
                return;
            }
        }
        self.edit = None;
    }

    /// Issue the update call for the in-progress edit.
    ///
    /// The draft stays staged until the server confirms; only then is the
    /// collection entry overwritten with the confirmed values.
    pub fn save_edit(&mut self) {
        let draft = match self.edit {
            Some(ref draft) => draft.clone(),
            None => return,
        };
        if self.pending.contains_key(&draft.id) {
            return;
        }

        let name = draft.name.trim().to_string();
        if name.is_empty() || draft.password.is_empty() {
            self.entry_messages
                .entry(draft.id)
                .or_default()
                .push("Name and password are required".to_string());
            return;
        }

        self.pending.insert(draft.id.clone(), PendingOp::Saving);

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let id = draft.id;
        let password = draft.password;
        tokio::spawn(async move {
            match client.update_credential(&id, &name, &password).await {
                Ok(update) => {
                    Self::send_event(&tx, VaultEvent::Updated { id, update }).await
                }
                Err(e) => {
                    Self::send_event(&tx, VaultEvent::UpdateFailed { id, error: e }).await
                }
            }
        });
    }

    /// Ask for confirmation before deleting the selected entry
    pub fn request_delete(&mut self) {
        let id = match self.selected_entry() {
            Some(entry) => entry.id.clone(),
            None => return,
        };
        if self.pending.contains_key(&id) {
            return;
        }

        self.delete_target = Some(id);
        self.state = AppState::ConfirmingDelete;
    }

    /// Issue the delete call after the user confirmed
    pub fn confirm_delete(&mut self) {
        let id = match self.delete_target.take() {
            Some(id) => id,
            None => return,
        };
        self.state = AppState::Normal;

        self.pending.insert(id.clone(), PendingOp::Deleting);

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match client.delete_credential(&id).await {
                Ok(()) => Self::send_event(&tx, VaultEvent::Deleted { id }).await,
                Err(e) => {
                    Self::send_event(&tx, VaultEvent::DeleteFailed { id, error: e }).await
                }
            }
        });
    }

    // =========================================================================
    // Event Processing
    // =========================================================================

    /// Drain completed vault calls and apply their results.
    /// Called once per render loop iteration.
    pub fn drain_events(&mut self) {
        // Collect all pending events first to avoid borrow conflicts
        let events: Vec<VaultEvent> = {
            if let Some(ref mut rx) = self.events_rx {
                let mut events = Vec::new();
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
                events
            } else {
                Vec::new()
            }
        };

        for event in events {
            self.process_event(event);
        }

        self.check_session_watch();
    }

    /// Process a single vault call result.
    ///
    /// Results that arrive after the originating context was left (view
    /// change, dashboard re-activation, entry already gone) are dropped as
    /// no-ops rather than errors.
    fn process_event(&mut self, event: VaultEvent) {
        match event {
            VaultEvent::SignedIn(data) => self.on_signed_in(data),
            VaultEvent::SignInFailed(error) => self.on_sign_in_failed(error),
            VaultEvent::SignedUp { email } => self.on_signed_up(email),
            VaultEvent::SignUpFailed(error) => self.on_sign_up_failed(error),

            VaultEvent::Listed { epoch, entries } => {
                if self.view != View::Dashboard || epoch != self.dashboard_epoch {
                    debug!(epoch, "Stale entry list dropped");
                    return;
                }
                self.loading = false;
                self.collection.load(entries);
                self.selection = 0;
                self.last_sync = Some(Local::now());
            }
            VaultEvent::ListFailed { epoch, error } => {
                if self.view != View::Dashboard || epoch != self.dashboard_epoch {
                    debug!(epoch, "Stale list failure dropped");
                    return;
                }
                self.loading = false;
                warn!(error = %error, "Entry list failed");
                match error.classify() {
                    FailureClass::Validation(messages) => self.dash_messages.extend(messages),
                    FailureClass::SessionExpired => self.force_sign_out(),
                }
            }

            VaultEvent::Created(entry) => {
                self.create_busy = false;
                if self.view != View::Dashboard {
                    debug!(id = %entry.id, "Created entry arrived after leaving the dashboard");
                    return;
                }
                // The server-assigned entry is appended; never a local insert
                self.collection.apply_created(entry);
                if self.state == AppState::CreatingEntry {
                    self.state = AppState::Normal;
                }
                self.create_name.clear();
                self.create_password.clear();
                self.create_messages.clear();
            }
            VaultEvent::CreateFailed(error) => {
                self.create_busy = false;
                warn!(error = %error, "Entry create failed");
                match error.classify() {
                    FailureClass::Validation(messages) => self.create_messages.extend(messages),
                    FailureClass::SessionExpired => self.force_sign_out(),
                }
            }

            VaultEvent::Updated { id, update } => {
                self.pending.remove(&id);
                if self.view != View::Dashboard {
                    return;
                }
                self.collection
                    .apply_updated(&id, update.name, update.password);
                self.entry_messages.remove(&id);
                if self.edit.as_ref().is_some_and(|d| d.id == id) {
                    self.edit = None;
                }
            }
            VaultEvent::UpdateFailed { id, error } => {
                self.pending.remove(&id);
                warn!(error = %error, id, "Entry update failed");
                match error.classify() {
                    FailureClass::Validation(messages) => {
                        // The draft stays staged; the user corrects and retries
                        self.entry_messages.entry(id).or_default().extend(messages);
                    }
                    FailureClass::SessionExpired => self.force_sign_out(),
                }
            }

            VaultEvent::Deleted { id } => {
                self.pending.remove(&id);
                if self.view != View::Dashboard {
                    return;
                }
                self.collection.apply_deleted(&id);
                self.entry_messages.remove(&id);
                self.revealed.remove(&id);
                if self.edit.as_ref().is_some_and(|d| d.id == id) {
                    self.edit = None;
                }
                self.clamp_selection();
            }
            VaultEvent::DeleteFailed { id, error } => {
                self.pending.remove(&id);
                warn!(error = %error, id, "Entry delete failed");
                match error.classify() {
                    FailureClass::Validation(messages) => {
                        self.entry_messages.entry(id).or_default().extend(messages);
                    }
                    FailureClass::SessionExpired => self.force_sign_out(),
                }
            }
        }
    }

    /// React to session changes that did not come through this app's own
    /// handlers (which acknowledge their writes before the next drain)
    fn check_session_watch(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let data = self.session_rx.borrow_and_update().clone();
        let signed_in = data.is_some();
        let resolved = route::resolve(self.view, signed_in);
        if resolved == self.view {
            return;
        }

        debug!(signed_in, "Session changed outside the event flow");
        if signed_in {
            self.username = data.map(|d| d.username);
            self.view = resolved;
            self.activate_dashboard();
        } else {
            self.force_sign_out();
        }
    }

    // =========================================================================
    // Selection and Display Helpers
    // =========================================================================

    pub fn selected_entry(&self) -> Option<&CredentialEntry> {
        self.collection.entries().get(self.selection)
    }

    pub fn select_next(&mut self) {
        if self.selection + 1 < self.collection.len() {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.selection >= self.collection.len() {
            self.selection = self.collection.len().saturating_sub(1);
        }
    }

    /// Toggle the password reveal for the selected entry
    pub fn toggle_reveal(&mut self) {
        let id = match self.selected_entry() {
            Some(entry) => entry.id.clone(),
            None => return,
        };
        if !self.revealed.remove(&id) {
            self.revealed.insert(id);
        }
    }

    /// Pending operation for an entry, if one is in flight
    pub fn pending_for(&self, id: &str) -> Option<PendingOp> {
        self.pending.get(id).copied()
    }

    /// The user touched the sign-in password field; it no longer mirrors
    /// the keychain entry
    pub fn note_signin_password_edited(&mut self) {
        self.signin_password_from_keychain = false;
    }

    /// Dismiss the oldest validation message in the given list.
    /// Messages never auto-expire; each is acknowledged individually.
    pub fn dismiss_first(messages: &mut Vec<String>) {
        if !messages.is_empty() {
            messages.remove(0);
        }
    }

    /// Dismiss the oldest message shown on the dashboard: the dashboard
    /// list first, then the selected entry's list
    pub fn dismiss_dashboard_message(&mut self) {
        if !self.dash_messages.is_empty() {
            self.dash_messages.remove(0);
            return;
        }
        let id = match self.selected_entry() {
            Some(entry) => entry.id.clone(),
            None => return,
        };
        if let Some(messages) = self.entry_messages.get_mut(&id) {
            Self::dismiss_first(messages);
            if messages.is_empty() {
                self.entry_messages.remove(&id);
            }
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted.
/// The caps mirror server constraints counted in characters, not bytes.
pub fn can_add_email_char(current: &str, c: char) -> bool {
    current.chars().count() < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current: &str, c: char) -> bool {
    current.chars().count() < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current: &str, c: char) -> bool {
    current.chars().count() < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if an entry name character should be accepted
pub fn can_add_entry_name_char(current: &str, c: char) -> bool {
    current.chars().count() < MAX_ENTRY_NAME_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
