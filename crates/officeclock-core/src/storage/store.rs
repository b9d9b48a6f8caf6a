use super::database::Database;
use crate::error::Result;
use crate::timer::PomodoroState;
use crate::widget::{Tab, WidgetState};

/// Key of the persisted state blob.
pub const STATE_KEY: &str = "office-time-tracker-v1";
/// Key of the selected tab.
pub const TAB_KEY: &str = "office-time-tracker-tab";

/// Loads and saves the widget state on top of the kv store.
///
/// Reads never fail because of bad data: anything missing or malformed
/// comes back as defaults. Only the database itself can error.
pub struct StateStore {
    db: Database,
    default_pomodoro: PomodoroState,
}

impl StateStore {
    pub fn new(db: Database, default_pomodoro: PomodoroState) -> Self {
        Self {
            db,
            default_pomodoro,
        }
    }

    pub fn load(&self) -> Result<WidgetState> {
        Ok(match self.db.kv_get(STATE_KEY)? {
            Some(raw) => WidgetState::from_json_lenient(&raw, &self.default_pomodoro),
            None => WidgetState::with_pomodoro(self.default_pomodoro.clone()),
        })
    }

    pub fn save(&self, state: &WidgetState) -> Result<()> {
        self.db.kv_set(STATE_KEY, &state.to_json()?)
    }

    pub fn load_tab(&self) -> Result<Tab> {
        let raw = self.db.kv_get(TAB_KEY)?;
        Ok(Tab::from_stored(raw.as_deref()))
    }

    pub fn save_tab(&self, tab: Tab) -> Result<()> {
        self.db.kv_set(TAB_KEY, tab.as_str())
    }
}
