//! Interface strings in French and English.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::view::Bucket;

/// Display language of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::Fr => &FR,
            Language::En => &EN,
        }
    }

    /// Short date in the language's usual order.
    pub fn format_date(&self, date: NaiveDate) -> String {
        match self {
            Language::Fr => date.format("%d/%m/%Y").to_string(),
            Language::En => date.format("%m/%d/%Y").to_string(),
        }
    }

    pub fn bucket_title(&self, bucket: Bucket) -> &'static str {
        let s = self.strings();
        match bucket {
            Bucket::Semester1 => s.semester_1,
            Bucket::Semester2 => s.semester_2,
            Bucket::Unassigned => s.others,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s).ok_or_else(|| format!("unknown language '{}' (expected fr or en)", s))
    }
}

/// Translated strings for one language.
#[derive(Debug)]
pub struct Strings {
    pub semester_1: &'static str,
    pub semester_2: &'static str,
    /// Title of the unassigned bucket, also the label of the reserved sub-group
    pub others: &'static str,
    pub no_courses: &'static str,
    pub no_pages: &'static str,
    pub ends: &'static str,
    pub all_tasks_done: &'static str,
    pub starts_in: &'static str,
    pub starts_in_mini: &'static str,
    pub days: &'static str,
    pub done: &'static str,
    pub weeks_left: &'static str,
    pub weeks_mini: &'static str,
}

static FR: Strings = Strings {
    semester_1: "Semestre 1",
    semester_2: "Semestre 2",
    others: "Autres / Indéfini",
    no_courses: "Aucun cours trouvé pour ce semestre.",
    no_pages: "Aucune page trouvée pour cette année académique.",
    ends: "Fin le",
    all_tasks_done: "Toutes les tâches sont terminées",
    starts_in: "Commence dans",
    starts_in_mini: "Dans ",
    days: "j",
    done: "Terminé",
    weeks_left: "semaine(s) restante(s)",
    weeks_mini: "sem",
};

static EN: Strings = Strings {
    semester_1: "Semester 1",
    semester_2: "Semester 2",
    others: "Others / Undefined",
    no_courses: "No courses found for this semester.",
    no_pages: "No pages found for this academic year.",
    ends: "Ends",
    all_tasks_done: "All tasks are completed",
    starts_in: "Start in",
    starts_in_mini: "In ",
    days: "d",
    done: "Done",
    weeks_left: "week(s) left",
    weeks_mini: "w",
};
