//! Animated value channels
//!
//! A sheet exposes exactly two animated values: the vertical offset of its
//! top edge and the opacity of the backdrop behind it.

use serde::{Deserialize, Serialize};

/// A named animated value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Distance from the container's top edge to the sheet's top edge (px)
    Offset,
    /// Backdrop opacity (0.0 to 1.0)
    Opacity,
}

impl Channel {
    pub const COUNT: usize = 2;
    pub const ALL: [Channel; Channel::COUNT] = [Channel::Offset, Channel::Opacity];

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Channel::Offset => 0,
            Channel::Opacity => 1,
        }
    }
}

/// Current values of every channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelValues {
    pub offset: f32,
    pub opacity: f32,
}

impl ChannelValues {
    pub fn new(offset: f32, opacity: f32) -> Self {
        Self { offset, opacity }
    }

    /// Values of a sheet fully hidden below a container of `extent`
    pub fn hidden(extent: f32) -> Self {
        Self::new(extent, 0.0)
    }

    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Offset => self.offset,
            Channel::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::Offset => self.offset = value,
            Channel::Opacity => self.opacity = value,
        }
    }
}
