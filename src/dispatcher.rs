// Client-side refresh policy for the dashboard.
//
// The browser script in static/app.js drives its WebSocket and re-fetches with exactly these
// rules. This module is the reference model: a clock-injected state machine with no I/O,
// so the timing rules can be exercised without a browser.

use bollard::models::EventMessage;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Minimum gap between two event-triggered refreshes.
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(5);
/// Delay before the single reconnect attempt after the socket drops on the events tab.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// Visible event log length on the events tab.
pub const EVENT_LOG_CAPACITY: usize = 100;
/// Full refresh of the active tab, independent of events.
pub const FALLBACK_REFRESH_INTERVAL: Duration = Duration::from_secs(120);
/// Host metrics refresh while the dashboard is shown.
pub const HOST_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Containers,
    Images,
    Networks,
    Volumes,
    Services,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Something the UI should fetch again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Containers,
    DashboardStats,
    Images,
    Networks,
    Volumes,
    HostMetrics,
    ActiveTab(Tab),
}

/// Socket side effects requested by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketCommand {
    Open,
    /// Detach handlers, then close.
    Close,
    ReconnectAfter(Duration),
}

/// The parts of a Docker event the policy looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNotice {
    pub kind: String,
    pub action: String,
    pub actor_id: String,
    pub time: i64,
}

impl From<&EventMessage> for EventNotice {
    fn from(e: &EventMessage) -> Self {
        Self {
            kind: e.typ.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            action: e.action.clone().unwrap_or_default(),
            actor_id: e
                .actor
                .as_ref()
                .and_then(|a| a.id.clone())
                .unwrap_or_default(),
            time: e.time.unwrap_or_default(),
        }
    }
}

const CONTAINER_STATS_ACTIONS: [&str; 5] = ["start", "stop", "die", "destroy", "create"];
const IMAGE_STATS_ACTIONS: [&str; 2] = ["delete", "untag"];

#[derive(Debug)]
pub struct EventDispatcher {
    tab: Tab,
    connection: ConnectionState,
    listeners_attached: bool,
    reconnect_pending: bool,
    event_count: u64,
    log: VecDeque<EventNotice>,
    last_refresh: Option<Instant>,
}

impl EventDispatcher {
    pub fn new(tab: Tab) -> Self {
        let mut d = Self {
            tab: Tab::Dashboard,
            connection: ConnectionState::Disconnected,
            listeners_attached: false,
            reconnect_pending: false,
            event_count: 0,
            log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
            last_refresh: None,
        };
        d.switch_tab(tab);
        d
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Newest first.
    pub fn event_log(&self) -> impl Iterator<Item = &EventNotice> {
        self.log.iter()
    }

    /// Entering the events tab opens a socket unless one is already open or opening.
    /// Leaving it detaches handlers before closing, so the close never triggers a reconnect.
    pub fn switch_tab(&mut self, tab: Tab) -> Option<SocketCommand> {
        let was_events = self.tab == Tab::Events;
        self.tab = tab;
        match (was_events, tab == Tab::Events) {
            (true, false) => {
                self.listeners_attached = false;
                self.reconnect_pending = false;
                let open = self.connection != ConnectionState::Disconnected;
                self.connection = ConnectionState::Disconnected;
                open.then_some(SocketCommand::Close)
            }
            (_, true) => self.open(),
            (false, false) => None,
        }
    }

    fn open(&mut self) -> Option<SocketCommand> {
        if self.connection != ConnectionState::Disconnected {
            return None;
        }
        self.connection = ConnectionState::Connecting;
        self.listeners_attached = true;
        Some(SocketCommand::Open)
    }

    /// Handshake completed.
    pub fn on_open(&mut self) {
        if self.listeners_attached && self.connection == ConnectionState::Connecting {
            self.connection = ConnectionState::Connected;
        }
    }

    /// The socket closed or errored. Only a drop seen by attached handlers while the events
    /// tab is active schedules a reconnect, and only one at a time.
    pub fn on_close(&mut self) -> Option<SocketCommand> {
        if !self.listeners_attached {
            return None;
        }
        self.connection = ConnectionState::Disconnected;
        if self.tab == Tab::Events && !self.reconnect_pending {
            self.reconnect_pending = true;
            return Some(SocketCommand::ReconnectAfter(RECONNECT_DELAY));
        }
        None
    }

    /// The reconnect timer fired.
    pub fn on_reconnect_timer(&mut self) -> Option<SocketCommand> {
        self.reconnect_pending = false;
        if self.tab != Tab::Events {
            return None;
        }
        self.open()
    }

    /// Count the event, log it when the events tab is shown, otherwise decide what to
    /// re-fetch. Event-driven refreshes are gated by `REFRESH_COOLDOWN`; an event inside the
    /// window is counted and otherwise dropped.
    pub fn on_event(&mut self, event: EventNotice, now: Instant) -> Vec<Refresh> {
        self.event_count += 1;

        if self.tab == Tab::Events {
            if self.log.len() == EVENT_LOG_CAPACITY {
                self.log.pop_back();
            }
            self.log.push_front(event);
            return Vec::new();
        }

        if !matches!(
            event.kind.as_str(),
            "container" | "image" | "network" | "volume"
        ) {
            return Vec::new();
        }
        if self
            .last_refresh
            .is_some_and(|last| now.saturating_duration_since(last) < REFRESH_COOLDOWN)
        {
            return Vec::new();
        }
        self.last_refresh = Some(now);

        let action = event.action.as_str();
        let mut out = Vec::new();
        match event.kind.as_str() {
            "container" => {
                if self.tab == Tab::Containers {
                    out.push(Refresh::Containers);
                }
                if CONTAINER_STATS_ACTIONS.contains(&action) {
                    out.push(Refresh::DashboardStats);
                }
            }
            "image" => {
                if IMAGE_STATS_ACTIONS.contains(&action) {
                    out.push(Refresh::DashboardStats);
                }
                if self.tab == Tab::Images {
                    out.push(Refresh::Images);
                }
            }
            "network" if self.tab == Tab::Networks => out.push(Refresh::Networks),
            "volume" if self.tab == Tab::Volumes => out.push(Refresh::Volumes),
            _ => {}
        }
        out
    }

    /// Every `FALLBACK_REFRESH_INTERVAL`.
    pub fn on_fallback_tick(&self) -> Refresh {
        Refresh::ActiveTab(self.tab)
    }

    /// Every `HOST_REFRESH_INTERVAL`.
    pub fn on_host_tick(&self) -> Option<Refresh> {
        (self.tab == Tab::Dashboard).then_some(Refresh::HostMetrics)
    }
}
