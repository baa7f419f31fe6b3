//! Handlers and the command builder.
//!
//! A handler is a fixed rule that turns a target into the argument vector of
//! one external scanner. Arguments stay discrete tokens all the way to the
//! process launcher; nothing is ever joined into a shell command line.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::VolleyError;

/// The statically known command-building rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    /// `TxPortMap -i <target> -t1000`
    #[serde(rename = "txportmap")]
    PortMap,

    /// `FastjsonScan -u <target> -o <YYYYMMDDHHMMSS>.txt`
    #[serde(rename = "fastjsonscan")]
    FastjsonScan,

    /// `f403 -u <target>`
    #[serde(rename = "f403")]
    F403,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 3] = [
        HandlerKind::PortMap,
        HandlerKind::FastjsonScan,
        HandlerKind::F403,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::PortMap => "txportmap",
            HandlerKind::FastjsonScan => "fastjsonscan",
            HandlerKind::F403 => "f403",
        }
    }

    pub fn default_binary(self) -> &'static str {
        match self {
            HandlerKind::PortMap => "./TxPortMap_linux_x64",
            HandlerKind::FastjsonScan => "./FastjsonScan_linux_amd64",
            HandlerKind::F403 => "./f403_linux_amd64",
        }
    }

    /// Flags that follow the binary. `now` only matters for handlers that
    /// name an artifact file after the current time.
    fn arguments(self, target: &str, now: DateTime<Utc>) -> Vec<String> {
        match self {
            HandlerKind::PortMap => vec!["-i".into(), target.into(), "-t1000".into()],
            HandlerKind::FastjsonScan => vec![
                "-u".into(),
                target.into(),
                "-o".into(),
                artifact_file_name(now),
            ],
            HandlerKind::F403 => vec!["-u".into(), target.into()],
        }
    }
}

/// `YYYYMMDDHHMMSS.txt`
pub fn artifact_file_name(now: DateTime<Utc>) -> String {
    format!("{}.txt", now.format("%Y%m%d%H%M%S"))
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HandlerKind {
    type Err = VolleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HandlerKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| VolleyError::UnsupportedHandler(wanted.to_string()))
    }
}

/// A configured handler: which rule, and which executable to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    pub kind: HandlerKind,
    pub binary: PathBuf,
}

impl HandlerSpec {
    pub fn new(kind: HandlerKind, binary: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            binary: binary.into(),
        }
    }

    /// Handler with its conventional binary name, resolved relative to the
    /// child's working directory.
    pub fn with_default_binary(kind: HandlerKind) -> Self {
        Self::new(kind, kind.default_binary())
    }

    /// Build the argument vector for `target`. `argv[0]` is the binary.
    pub fn build_command(&self, target: &str, now: DateTime<Utc>) -> Vec<String> {
        let mut argv = vec![self.binary.to_string_lossy().into_owned()];
        argv.extend(self.kind.arguments(target, now));
        argv
    }
}
