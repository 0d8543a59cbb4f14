//! This module handles the [`GroupKind`] enum, which contains an entry for each particle group in
//! the scene.

use serde::{Deserialize, Serialize};

/// An enum to list all the particle groups. The scene builds one of each, in this order, and
/// draws them in this order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::EnumIter, Serialize, Deserialize)]
pub enum GroupKind {
    /// See [`Foliage`](crate::groups::Foliage).
    Foliage,

    /// See [`Ornaments`](crate::groups::Ornaments).
    Ornaments,

    /// See [`Gifts`](crate::groups::Gifts).
    Gifts,

    /// See [`Ribbon`](crate::groups::Ribbon).
    Ribbon,

    /// See [`Star`](crate::groups::Star).
    Star,

    /// See [`Snow`](crate::groups::Snow).
    Snow,
}

impl GroupKind {
    /// The name of the group, as it appears in logs and in [`ct_frame::GroupFrame::name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Foliage => "foliage",
            Self::Ornaments => "ornaments",
            Self::Gifts => "gifts",
            Self::Ribbon => "ribbon",
            Self::Star => "star",
            Self::Snow => "snow",
        }
    }

    /// Whether this group bobs up and down with the rest of the tree. Snow falls in world space.
    pub fn floats(&self) -> bool {
        !matches!(self, Self::Snow)
    }

    /// Whether this group writes per-instance colours.
    pub fn has_colours(&self) -> bool {
        matches!(self, Self::Foliage | Self::Ornaments | Self::Star)
    }
}
