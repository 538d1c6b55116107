//! Operator-facing notices

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

pub const NOTHING_TO_SAVE: &str = "Aucune modification à enregistrer.";
pub const SAVE_FAILED: &str = "Impossible d'enregistrer les modifications.";
pub const CREATE_FAILED: &str = "Impossible de créer l'élément.";
pub const DELETE_FAILED: &str = "Impossible de supprimer l'élément.";
pub const LOAD_FAILED: &str = "Impossible de charger les données.";
pub const SAVED: &str = "Modifications enregistrées.";
pub const CREATED: &str = "Élément créé.";
pub const DELETED: &str = "Élément supprimé.";
pub const SAVE_IN_PROGRESS: &str = "Enregistrement déjà en cours.";
pub const UNLOCK_COST_EXISTS: &str = "Un coût de déblocage existe déjà pour ce royaume et cette ressource.";
pub const ENTRY_EXISTS: &str = "Un élément avec ce code existe déjà.";
pub const MISSING_FIELDS: &str = "Champs obligatoires manquants";

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message surfaced to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
