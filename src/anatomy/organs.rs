use crate::anatomy::error::AnatomyError;
use bevy::math::Vec3;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrganId {
    Brain,
    Heart,
    KidneyL,
    KidneyR,
}

pub const ORGAN_ORDER: [OrganId; 4] = [
    OrganId::Brain,
    OrganId::Heart,
    OrganId::KidneyL,
    OrganId::KidneyR,
];

impl OrganId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brain => "brain",
            Self::Heart => "heart",
            Self::KidneyL => "kidneyL",
            Self::KidneyR => "kidneyR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Brain => "Brain",
            Self::Heart => "Heart",
            Self::KidneyL => "Left kidney",
            Self::KidneyR => "Right kidney",
        }
    }

    pub fn spec(self) -> &'static OrganSpec {
        match self {
            Self::Brain => &ORGAN_MANIFEST[0],
            Self::Heart => &ORGAN_MANIFEST[1],
            Self::KidneyL => &ORGAN_MANIFEST[2],
            Self::KidneyR => &ORGAN_MANIFEST[3],
        }
    }
}

impl fmt::Display for OrganId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ORGAN_ORDER
            .into_iter()
            .find(|organ| organ.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("unknown organ '{raw}'"))
    }
}

/// Where an organ's asset lives and how it is fitted into the rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganSpec {
    pub id: OrganId,
    pub asset_path: &'static str,
    pub target_size: f32,
    /// Rig-local translation of the organ pivot.
    pub placement: Vec3,
}

pub const ORGAN_MANIFEST: [OrganSpec; 4] = [
    OrganSpec {
        id: OrganId::Brain,
        asset_path: "models/brain human.glb",
        target_size: 2.0,
        placement: Vec3::new(0.0, 5.0, 0.0),
    },
    OrganSpec {
        id: OrganId::Heart,
        asset_path: "models/heart.glb",
        target_size: 1.5,
        placement: Vec3::new(0.2, 1.8, 0.3),
    },
    OrganSpec {
        id: OrganId::KidneyL,
        asset_path: "models/VH_M_Kidney_L.glb",
        target_size: 1.2,
        placement: Vec3::new(-0.6, -0.5, -0.4),
    },
    OrganSpec {
        id: OrganId::KidneyR,
        asset_path: "models/VH_M_Kidney_R.glb",
        target_size: 1.2,
        placement: Vec3::new(0.6, -0.5, -0.4),
    },
];

/// One organ the session wants the loader to fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganLoadRequest {
    pub spec: &'static OrganSpec,
}

impl OrganLoadRequest {
    pub fn id(&self) -> OrganId {
        self.spec.id
    }
}

pub fn manifest_load_requests() -> Vec<OrganLoadRequest> {
    ORGAN_MANIFEST
        .iter()
        .map(|spec| OrganLoadRequest { spec })
        .collect()
}

pub fn load_failure(organ: OrganId, reason: impl Into<String>) -> AnatomyError {
    AnatomyError::AssetLoadFailure {
        organ,
        reason: reason.into(),
    }
}
