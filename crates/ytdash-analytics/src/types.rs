//! Pipeline output types.

use serde::Serialize;
use ytdash_core::{ChannelSummary, DateWindow, ResultsTable};

/// A requested channel that contributed nothing, with the reason shown to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidChannel {
    pub channel_id: String,
    pub reason: String,
}

/// Why a fetch cycle ended in the "no data" terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    /// Every requested channel was invalid.
    NoValidChannels,
    /// At least one channel was valid but none returned a video.
    NoVideos,
    /// Videos were found but none fall inside the date window.
    EmptyDateWindow,
}

impl NoDataReason {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NoValidChannels => "none of the requested channels could be loaded",
            Self::NoVideos => "the requested channels returned no videos",
            Self::EmptyDateWindow => "no videos were published in the selected date range",
        }
    }
}

/// Everything one fetch action produced.
///
/// A cycle either carries rows or names a [`NoDataReason`]; both states
/// replace the previous cycle wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct FetchCycle {
    pub window: DateWindow,
    pub table: ResultsTable,
    /// Valid channels in request order.
    pub channels: Vec<ChannelSummary>,
    pub invalid_channels: Vec<InvalidChannel>,
    pub no_data: Option<NoDataReason>,
    /// Provider requests issued by this action.
    pub provider_calls: u32,
}

impl FetchCycle {
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.no_data.is_some()
    }
}
