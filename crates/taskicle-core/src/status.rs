use serde::Serialize;
use strum::{Display, EnumString};

/// Display metadata for a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StatusDescriptor {
    /// Label shown on the badge
    pub text: &'static str,
    /// Badge background color
    pub background: &'static str,
    /// Badge foreground color
    pub color: &'static str,
    /// CSS class applied to the badge
    #[serde(rename = "class")]
    pub style_class: &'static str,
}

impl StatusDescriptor {
    /// Descriptor returned for any kind or value outside the known tables
    pub const UNKNOWN: Self = Self::new("未知", "#f3f4f6", "#666", "");

    const fn new(text: &'static str, background: &'static str, color: &'static str, style_class: &'static str) -> Self {
        Self {
            text,
            background,
            color,
            style_class,
        }
    }

    /// Whether this is the unknown sentinel
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// Which status table a lookup consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    Priority,
    State,
}

/// Task priority, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityLevel {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
}

impl PriorityLevel {
    pub const ALL: [Self; 5] = [Self::Lowest, Self::Low, Self::Normal, Self::High, Self::Highest];

    /// Map a wire value to a priority, `None` when out of range
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Lowest),
            1 => Some(Self::Low),
            2 => Some(Self::Normal),
            3 => Some(Self::High),
            4 => Some(Self::Highest),
            _ => None,
        }
    }

    /// Wire value of this priority
    pub const fn value(self) -> i64 {
        match self {
            Self::Lowest => 0,
            Self::Low => 1,
            Self::Normal => 2,
            Self::High => 3,
            Self::Highest => 4,
        }
    }

    pub const fn descriptor(self) -> StatusDescriptor {
        match self {
            Self::Lowest => StatusDescriptor::new("最低", "#f6faff", "#9bbcf5", "p-0"),
            Self::Low => StatusDescriptor::new("较低", "#e9f3ff", "#5e9bf2", "p-1"),
            Self::Normal => StatusDescriptor::new("普通", "#dcecff", "#1677ff", "p-2"),
            Self::High => StatusDescriptor::new("较高", "#fff4e5", "#d48806", "p-3"),
            Self::Highest => StatusDescriptor::new("最高", "#ffe8e8", "#cf1322", "p-4"),
        }
    }
}

/// Lifecycle stage of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    NotStarted,
    InProgress,
    Completed,
    Closed,
    Suspended,
    PendingVerification,
}

impl TaskState {
    pub const ALL: [Self; 6] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Closed,
        Self::Suspended,
        Self::PendingVerification,
    ];

    /// Map a wire value to a state, `None` when out of range
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NotStarted),
            1 => Some(Self::InProgress),
            2 => Some(Self::Completed),
            3 => Some(Self::Closed),
            4 => Some(Self::Suspended),
            5 => Some(Self::PendingVerification),
            _ => None,
        }
    }

    /// Wire value of this state
    pub const fn value(self) -> i64 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Closed => 3,
            Self::Suspended => 4,
            Self::PendingVerification => 5,
        }
    }

    // Completed and Closed share colors in the shipped UI.
    pub const fn descriptor(self) -> StatusDescriptor {
        match self {
            Self::NotStarted => StatusDescriptor::new("未开始", "#f0f0f0", "#666", "s-0"),
            Self::InProgress => StatusDescriptor::new("进行中", "#e6f4ff", "#095cb5", "s-1"),
            Self::Completed => StatusDescriptor::new("已完成", "#e7f9ef", "#2a8a43", "s-2"),
            Self::Closed => StatusDescriptor::new("关闭", "#e7f9ef", "#2a8a43", "s-3"),
            Self::Suspended => StatusDescriptor::new("挂起", "#fff5d6", "#ad7a00", "s-4"),
            Self::PendingVerification => StatusDescriptor::new("待验证", "#f1e6ff", "#6a32c9", "s-5"),
        }
    }
}

/// Look up the badge for a priority or task state value
///
/// Values outside the table for `kind` yield [`StatusDescriptor::UNKNOWN`]
pub const fn lookup(kind: StatusKind, value: i64) -> StatusDescriptor {
    let found = match kind {
        StatusKind::Priority => match PriorityLevel::from_value(value) {
            Some(priority) => Some(priority.descriptor()),
            None => None,
        },
        StatusKind::State => match TaskState::from_value(value) {
            Some(state) => Some(state.descriptor()),
            None => None,
        },
    };

    match found {
        Some(descriptor) => descriptor,
        None => StatusDescriptor::UNKNOWN,
    }
}

/// Like [`lookup`], taking the kind as a string (`"priority"` or `"state"`)
///
/// Unrecognized kinds yield [`StatusDescriptor::UNKNOWN`]
pub fn lookup_str(kind: &str, value: i64) -> StatusDescriptor {
    kind.parse::<StatusKind>()
        .map_or(StatusDescriptor::UNKNOWN, |kind| lookup(kind, value))
}
