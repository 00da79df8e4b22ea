//! KDL schema for `config.kdl` and the resolved dashboard configuration.
//!
//! This module provides:
//! - `ConfigFile`, one configuration layer with every value optional
//! - `DashboardConfig`, the fully resolved configuration passed to every
//!   filter/extract/group call
//! - Serialization to and from KDL, validation and defaults

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::lang::Language;
use crate::progress::TimeWindow;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// Frontmatter keys read by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyNames {
    pub year: String,
    pub semester: String,
    pub unit: String,
    pub volume: String,
    pub evaluation_type: String,
    pub session_1: String,
    pub session_2: String,
    pub supervision_start: String,
    pub supervision_end: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            year: "ied_ec_academic_year".to_string(),
            semester: "ied_ec_semestre".to_string(),
            unit: "ied_ue".to_string(),
            volume: "ied_ec_volume".to_string(),
            evaluation_type: "ied_ec_evaluation_type".to_string(),
            session_1: "ied_ec_session_1".to_string(),
            session_2: "ied_ec_session_2".to_string(),
            supervision_start: "ied_ec_supervision_start".to_string(),
            supervision_end: "ied_ec_supervision_end".to_string(),
        }
    }
}

/// Start and end dates of a semester, kept as written in the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start: String,
    pub end: String,
}

impl WindowSpec {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::parse(&self.start, &self.end)
    }
}

/// Badge color for one evaluation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationColor {
    pub evaluation_type: String,
    pub color: String,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub language: Language,
    pub dashboard_title: String,

    /// Academic year selected documents must declare
    pub academic_year: String,

    pub properties: PropertyNames,

    /// Vault-relative path prefixes never selected
    pub excluded_folders: Vec<String>,

    /// Size of one effort unit, in minutes
    pub pomodoro_minutes: u32,

    /// Semester values mapped to the first and second bucket
    pub semester_labels: [String; 2],

    pub semester_1: WindowSpec,
    pub semester_2: WindowSpec,

    pub evaluation_colors: Vec<EvaluationColor>,

    /// Quiet period before a refresh pass starts after a change
    pub refresh_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            language: Language::Fr,
            dashboard_title: "IED Dashboard".to_string(),
            academic_year: "2025-2026".to_string(),
            properties: PropertyNames::default(),
            excluded_folders: vec!["templates".to_string()],
            pomodoro_minutes: 40,
            semester_labels: ["S1".to_string(), "S2".to_string()],
            semester_1: WindowSpec::new("2025-09-22", "2025-12-19"),
            semester_2: WindowSpec::new("2026-01-19", "2026-04-11"),
            evaluation_colors: vec![
                EvaluationColor {
                    evaluation_type: "Examen sur table".to_string(),
                    color: "#ff5555".to_string(),
                },
                EvaluationColor {
                    evaluation_type: "Dossier Moodle".to_string(),
                    color: "#55aaff".to_string(),
                },
            ],
            refresh_delay_ms: 1000,
        }
    }
}

impl DashboardConfig {
    /// Color configured for an evaluation type. The last matching entry wins.
    pub fn evaluation_color(&self, evaluation_type: &str) -> Option<&str> {
        self.evaluation_colors
            .iter()
            .rev()
            .find(|c| c.evaluation_type == evaluation_type)
            .map(|c| c.color.as_str())
    }

    /// Applies every value set in `layer`.
    pub fn apply(&mut self, layer: &ConfigFile) {
        if let Some(language) = layer.language {
            self.language = language;
        }
        if let Some(ref title) = layer.dashboard_title {
            self.dashboard_title = title.clone();
        }
        if let Some(ref year) = layer.academic_year {
            self.academic_year = year.clone();
        }
        let props = &mut self.properties;
        for (target, value) in [
            (&mut props.year, &layer.year_property),
            (&mut props.semester, &layer.semester_property),
            (&mut props.unit, &layer.unit_property),
            (&mut props.volume, &layer.volume_property),
            (&mut props.evaluation_type, &layer.evaluation_type_property),
            (&mut props.session_1, &layer.session_1_property),
            (&mut props.session_2, &layer.session_2_property),
            (&mut props.supervision_start, &layer.supervision_start_property),
            (&mut props.supervision_end, &layer.supervision_end_property),
        ] {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        if let Some(ref folders) = layer.excluded_folders {
            self.excluded_folders = folders.clone();
        }
        if let Some(minutes) = layer.pomodoro_minutes {
            self.pomodoro_minutes = minutes;
        }
        if let Some(ref labels) = layer.semester_labels {
            self.semester_labels = labels.clone();
        }
        if let Some(ref window) = layer.semester_1 {
            self.semester_1 = window.clone();
        }
        if let Some(ref window) = layer.semester_2 {
            self.semester_2 = window.clone();
        }
        if let Some(ref colors) = layer.evaluation_colors {
            self.evaluation_colors = colors.clone();
        }
        if let Some(delay) = layer.refresh_delay_ms {
            self.refresh_delay_ms = delay;
        }
    }
}

/// One configuration layer, as stored in a `config.kdl` file.
///
/// # KDL Schema
///
/// ```kdl
/// language "fr"
/// academic-year "2025-2026"
/// excluded-folders "templates" "archive"
/// pomodoro-minutes 40
/// semester-1 start="2025-09-22" end="2025-12-19"
/// evaluation-colors {
///     color "Examen sur table" "#ff5555"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub language: Option<Language>,
    pub dashboard_title: Option<String>,
    pub academic_year: Option<String>,
    pub year_property: Option<String>,
    pub semester_property: Option<String>,
    pub unit_property: Option<String>,
    pub volume_property: Option<String>,
    pub evaluation_type_property: Option<String>,
    pub session_1_property: Option<String>,
    pub session_2_property: Option<String>,
    pub supervision_start_property: Option<String>,
    pub supervision_end_property: Option<String>,
    pub excluded_folders: Option<Vec<String>>,
    pub pomodoro_minutes: Option<u32>,
    pub semester_labels: Option<[String; 2]>,
    pub semester_1: Option<WindowSpec>,
    pub semester_2: Option<WindowSpec>,
    pub evaluation_colors: Option<Vec<EvaluationColor>>,
    pub refresh_delay_ms: Option<u64>,

    /// Problems found while parsing; the offending values were skipped
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Node names of the plain string settings.
const STRING_NODES: &[&str] = &[
    "dashboard-title",
    "academic-year",
    "year-property",
    "semester-property",
    "unit-property",
    "volume-property",
    "evaluation-type-property",
    "session-1-property",
    "session-2-property",
    "supervision-start-property",
    "supervision-end-property",
];

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    fn string_slot(&mut self, node: &str) -> Option<&mut Option<String>> {
        Some(match node {
            "dashboard-title" => &mut self.dashboard_title,
            "academic-year" => &mut self.academic_year,
            "year-property" => &mut self.year_property,
            "semester-property" => &mut self.semester_property,
            "unit-property" => &mut self.unit_property,
            "volume-property" => &mut self.volume_property,
            "evaluation-type-property" => &mut self.evaluation_type_property,
            "session-1-property" => &mut self.session_1_property,
            "session-2-property" => &mut self.session_2_property,
            "supervision-start-property" => &mut self.supervision_start_property,
            "supervision-end-property" => &mut self.supervision_end_property,
            _ => return None,
        })
    }

    fn string_value(&self, node: &str) -> Option<&String> {
        match node {
            "dashboard-title" => self.dashboard_title.as_ref(),
            "academic-year" => self.academic_year.as_ref(),
            "year-property" => self.year_property.as_ref(),
            "semester-property" => self.semester_property.as_ref(),
            "unit-property" => self.unit_property.as_ref(),
            "volume-property" => self.volume_property.as_ref(),
            "evaluation-type-property" => self.evaluation_type_property.as_ref(),
            "session-1-property" => self.session_1_property.as_ref(),
            "session-2-property" => self.session_2_property.as_ref(),
            "supervision-start-property" => self.supervision_start_property.as_ref(),
            "supervision-end-property" => self.supervision_end_property.as_ref(),
            _ => None,
        }
    }

    /// Parse a layer from KDL text.
    pub fn parse(kdl_str: &str) -> crate::Result<Self> {
        let doc: KdlDocument = kdl_str
            .parse()
            .map_err(|e| crate::Error::Config(format!("Failed to parse KDL: {}", e)))?;
        Ok(Self::from_kdl(&doc))
    }

    /// Parse a layer from a KDL document.
    ///
    /// Invalid values are skipped and recorded in `warnings`.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "language") {
            match Language::parse(&s) {
                Some(language) => config.language = Some(language),
                None => config
                    .warnings
                    .push(format!("language must be \"fr\" or \"en\", got {:?}", s)),
            }
        }

        for name in STRING_NODES {
            if let Some(s) = first_string(doc, name)
                && let Some(slot) = config.string_slot(name)
            {
                *slot = Some(s);
            }
        }

        if let Some(node) = doc.get("excluded-folders") {
            let folders = positional_strings(node)
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            config.excluded_folders = Some(folders);
        }

        if let Some(node) = doc.get("pomodoro-minutes")
            && let Some(entry) = node.entries().first()
        {
            match entry.value().as_integer() {
                Some(i) if i > 0 && i <= u32::MAX as i128 => {
                    config.pomodoro_minutes = Some(i as u32)
                }
                _ => config.warnings.push(format!(
                    "pomodoro-minutes must be a positive integer, got {}",
                    entry.value()
                )),
            }
        }

        if let Some(node) = doc.get("semester-labels") {
            let labels = positional_strings(node);
            if labels.len() == 2 && labels[0] != labels[1] {
                config.semester_labels = Some([labels[0].clone(), labels[1].clone()]);
            } else {
                config
                    .warnings
                    .push("semester-labels needs two distinct values".to_string());
            }
        }

        for (name, slot) in [
            ("semester-1", &mut config.semester_1),
            ("semester-2", &mut config.semester_2),
        ] {
            if let Some(node) = doc.get(name) {
                *slot = Some(WindowSpec::new(
                    property_string(node, "start").unwrap_or_default(),
                    property_string(node, "end").unwrap_or_default(),
                ));
            }
        }

        if let Some(node) = doc.get("evaluation-colors") {
            let mut colors = Vec::new();
            if let Some(children) = node.children() {
                for child in children.nodes() {
                    if child.name().value() != "color" {
                        continue;
                    }
                    let args = positional_strings(child);
                    match args.as_slice() {
                        [evaluation_type, color] if HEX_COLOR.is_match(color) => {
                            colors.push(EvaluationColor {
                                evaluation_type: evaluation_type.trim().to_string(),
                                color: color.clone(),
                            })
                        }
                        _ => config
                            .warnings
                            .push(format!("ignoring invalid color entry: {}", child)),
                    }
                }
            }
            config.evaluation_colors = Some(colors);
        }

        if let Some(node) = doc.get("refresh-delay-ms")
            && let Some(entry) = node.entries().first()
        {
            match entry.value().as_integer() {
                Some(i) if (0..=60_000).contains(&i) => config.refresh_delay_ms = Some(i as u64),
                _ => config.warnings.push(format!(
                    "refresh-delay-ms must be between 0 and 60000, got {}",
                    entry.value()
                )),
            }
        }

        config
    }

    /// Convert the layer to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(language) = self.language {
            doc.nodes_mut()
                .push(string_node("language", language.as_str()));
        }

        for name in STRING_NODES {
            if let Some(value) = self.string_value(name) {
                doc.nodes_mut().push(string_node(name, value));
            }
        }

        if let Some(ref folders) = self.excluded_folders {
            let mut node = KdlNode::new("excluded-folders");
            for folder in folders {
                node.push(KdlEntry::new(KdlValue::String(folder.clone())));
            }
            doc.nodes_mut().push(node);
        }

        if let Some(minutes) = self.pomodoro_minutes {
            let mut node = KdlNode::new("pomodoro-minutes");
            node.push(KdlEntry::new(KdlValue::Integer(minutes as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref labels) = self.semester_labels {
            let mut node = KdlNode::new("semester-labels");
            for label in labels {
                node.push(KdlEntry::new(KdlValue::String(label.clone())));
            }
            doc.nodes_mut().push(node);
        }

        for (name, window) in [("semester-1", &self.semester_1), ("semester-2", &self.semester_2)] {
            if let Some(window) = window {
                let mut node = KdlNode::new(name);
                node.push(KdlEntry::new_prop(
                    "start",
                    KdlValue::String(window.start.clone()),
                ));
                node.push(KdlEntry::new_prop("end", KdlValue::String(window.end.clone())));
                doc.nodes_mut().push(node);
            }
        }

        if let Some(ref colors) = self.evaluation_colors {
            let mut children = KdlDocument::new();
            for color in colors {
                let mut child = KdlNode::new("color");
                child.push(KdlEntry::new(KdlValue::String(
                    color.evaluation_type.clone(),
                )));
                child.push(KdlEntry::new(KdlValue::String(color.color.clone())));
                children.nodes_mut().push(child);
            }
            let mut node = KdlNode::new("evaluation-colors");
            *node.children_mut() = Some(children);
            doc.nodes_mut().push(node);
        }

        if let Some(delay) = self.refresh_delay_ms {
            let mut node = KdlNode::new("refresh-delay-ms");
            node.push(KdlEntry::new(KdlValue::Integer(delay as i128)));
            doc.nodes_mut().push(node);
        }

        doc.autoformat();
        doc
    }

    /// A layer that sets every value to the built-in default.
    pub fn from_dashboard(config: &DashboardConfig) -> Self {
        let p = &config.properties;
        Self {
            language: Some(config.language),
            dashboard_title: Some(config.dashboard_title.clone()),
            academic_year: Some(config.academic_year.clone()),
            year_property: Some(p.year.clone()),
            semester_property: Some(p.semester.clone()),
            unit_property: Some(p.unit.clone()),
            volume_property: Some(p.volume.clone()),
            evaluation_type_property: Some(p.evaluation_type.clone()),
            session_1_property: Some(p.session_1.clone()),
            session_2_property: Some(p.session_2.clone()),
            supervision_start_property: Some(p.supervision_start.clone()),
            supervision_end_property: Some(p.supervision_end.clone()),
            excluded_folders: Some(config.excluded_folders.clone()),
            pomodoro_minutes: Some(config.pomodoro_minutes),
            semester_labels: Some(config.semester_labels.clone()),
            semester_1: Some(config.semester_1.clone()),
            semester_2: Some(config.semester_2.clone()),
            evaluation_colors: Some(config.evaluation_colors.clone()),
            refresh_delay_ms: Some(config.refresh_delay_ms),
            warnings: Vec::new(),
        }
    }
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)?
        .entries()
        .first()?
        .value()
        .as_string()
        .map(str::to_string)
}

fn positional_strings(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string().map(str::to_string))
        .collect()
}

fn property_string(node: &KdlNode, key: &str) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_some_and(|n| n.value() == key))
        .and_then(|e| e.value().as_string().map(str::to_string))
}
