//! Settings Manager for Orbitmarks.
//!
//! One settings row per user, created on first write and replaced on every
//! later write. Users without a row read the defaults.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::errors::SettingsError;
use crate::types::settings::DisplaySettings;

/// Trait defining the settings store interface.
pub trait SettingsManagerTrait {
    fn get_settings(&self) -> Result<DisplaySettings, SettingsError>;
    fn upsert_settings(&mut self, settings: &DisplaySettings) -> Result<DisplaySettings, SettingsError>;
    fn has_stored_settings(&self) -> Result<bool, SettingsError>;
}

/// Settings manager scoped to one owner.
pub struct SettingsManager<'a> {
    conn: &'a Connection,
    owner_id: &'a str,
}

impl<'a> SettingsManager<'a> {
    pub fn for_user(conn: &'a Connection, owner_id: &'a str) -> Self {
        Self { conn, owner_id }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl<'a> SettingsManagerTrait for SettingsManager<'a> {
    fn get_settings(&self) -> Result<DisplaySettings, SettingsError> {
        let stored = self
            .conn
            .query_row(
                "SELECT glow_intensity, rotation_speed, zoom_sensitivity, particle_density, \
                 performance_mode, reduced_motion, high_contrast \
                 FROM settings WHERE user_id = ?1",
                params![self.owner_id],
                |row| {
                    Ok(DisplaySettings {
                        glow_intensity: row.get(0)?,
                        rotation_speed: row.get(1)?,
                        zoom_sensitivity: row.get(2)?,
                        particle_density: row.get(3)?,
                        performance_mode: row.get(4)?,
                        reduced_motion: row.get(5)?,
                        high_contrast: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?;

        Ok(stored.unwrap_or_default())
    }

    /// Validates and writes the full settings record, inserting it if absent.
    fn upsert_settings(&mut self, settings: &DisplaySettings) -> Result<DisplaySettings, SettingsError> {
        settings.validate().map_err(SettingsError::InvalidValue)?;

        self.conn
            .execute(
                "INSERT INTO settings (user_id, glow_intensity, rotation_speed, zoom_sensitivity, \
                 particle_density, performance_mode, reduced_motion, high_contrast, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 ON CONFLICT(user_id) DO UPDATE SET \
                 glow_intensity = excluded.glow_intensity, \
                 rotation_speed = excluded.rotation_speed, \
                 zoom_sensitivity = excluded.zoom_sensitivity, \
                 particle_density = excluded.particle_density, \
                 performance_mode = excluded.performance_mode, \
                 reduced_motion = excluded.reduced_motion, \
                 high_contrast = excluded.high_contrast, \
                 updated_at = excluded.updated_at",
                params![
                    self.owner_id,
                    settings.glow_intensity,
                    settings.rotation_speed,
                    settings.zoom_sensitivity,
                    settings.particle_density,
                    settings.performance_mode,
                    settings.reduced_motion,
                    settings.high_contrast,
                    Self::now()
                ],
            )
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?;

        self.get_settings()
    }

    fn has_stored_settings(&self) -> Result<bool, SettingsError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM settings WHERE user_id = ?1",
                params![self.owner_id],
                |row| row.get(0),
            )
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }
}
