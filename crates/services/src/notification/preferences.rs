use bson::{DateTime, oid::ObjectId};
use chrono::{NaiveTime, Timelike};
use kanflow_db::models::{NotificationPreference, NotificationType};
use serde::{Deserialize, Deserializer};

use crate::dao::base::{DaoError, DaoResult};

/// Effective preferences for `user_id`: the stored row, or the enabled
/// defaults when the user never saved any. Nothing is written.
pub fn resolve_preferences(
    user_id: ObjectId,
    stored: Option<NotificationPreference>,
) -> NotificationPreference {
    stored.unwrap_or_else(|| NotificationPreference::defaults_for(user_id))
}

/// Whether the user wants notifications of this kind at all.
/// Kinds without a dedicated flag are always on.
pub fn is_type_enabled(preferences: &NotificationPreference, kind: NotificationType) -> bool {
    match kind {
        NotificationType::WhatsappMessage => preferences.whatsapp_message,
        NotificationType::KanbanMove => preferences.kanban_move,
        NotificationType::ContactCreated | NotificationType::ContactUpdated => {
            preferences.contact_update
        }
        NotificationType::DealCreated | NotificationType::DealUpdated => true,
    }
}

/// Parses `HH:MM` into minutes since midnight.
pub fn parse_time_of_day(value: &str) -> Option<u16> {
    let (hours, minutes) = value.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Daily quiet-hours range, bounds inclusive, in minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuteWindow {
    from: u16,
    to: u16,
}

impl MuteWindow {
    /// `None` when either bound is missing or unparsable.
    pub fn from_bounds(from: Option<&str>, to: Option<&str>) -> Option<Self> {
        Some(Self {
            from: parse_time_of_day(from?)?,
            to: parse_time_of_day(to?)?,
        })
    }

    pub fn from_preferences(preferences: &NotificationPreference) -> Option<Self> {
        Self::from_bounds(
            preferences.mute_from.as_deref(),
            preferences.mute_to.as_deref(),
        )
    }

    pub fn contains_minute(&self, minute: u16) -> bool {
        if self.from < self.to {
            self.from <= minute && minute <= self.to
        } else {
            // Spans midnight, e.g. 22:00 -> 07:00.
            minute >= self.from || minute <= self.to
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        let minute = (time.hour() * 60 + time.minute()) as u16;
        self.contains_minute(minute)
    }
}

pub fn is_muted(preferences: &NotificationPreference, now: NaiveTime) -> bool {
    MuteWindow::from_preferences(preferences).is_some_and(|window| window.contains(now))
}

/// Partial preference update. Omitted fields keep their stored value; a mute
/// bound sent as explicit `null` is cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub enable_sound: Option<bool>,
    pub whatsapp_message: Option<bool>,
    pub kanban_move: Option<bool>,
    pub contact_update: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub mute_from: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub mute_to: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PreferencesUpdate {
    pub fn validate(&self) -> DaoResult<()> {
        for (field, value) in [("mute_from", &self.mute_from), ("mute_to", &self.mute_to)] {
            if let Some(Some(time)) = value {
                if parse_time_of_day(time).is_none() {
                    return Err(DaoError::Validation(format!(
                        "{field} must be a HH:MM time of day, got '{time}'"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn apply(
        &self,
        mut preferences: NotificationPreference,
        at: DateTime,
    ) -> NotificationPreference {
        if let Some(v) = self.enable_sound {
            preferences.enable_sound = v;
        }
        if let Some(v) = self.whatsapp_message {
            preferences.whatsapp_message = v;
        }
        if let Some(v) = self.kanban_move {
            preferences.kanban_move = v;
        }
        if let Some(v) = self.contact_update {
            preferences.contact_update = v;
        }
        if let Some(v) = &self.mute_from {
            preferences.mute_from = v.clone();
        }
        if let Some(v) = &self.mute_to {
            preferences.mute_to = v.clone();
        }
        preferences.updated_at = at;
        preferences
    }
}
